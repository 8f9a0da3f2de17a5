// ── Supporting domain types ──

use serde::{Deserialize, Serialize};

/// A customer record from `GET /customers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
}

/// Backend liveness as shown in the status bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    /// No probe has completed yet.
    #[default]
    Checking,
    Online,
    Offline,
}

impl HealthStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Checking => "Checking system...",
            Self::Online => "System Online",
            Self::Offline => "System Offline",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A country numbers can be searched in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Country {
    /// ISO 3166-1 alpha-2.
    pub code: &'static str,
    pub name: &'static str,
    pub flag: &'static str,
}

const COUNTRIES: &[Country] = &[
    Country {
        code: "US",
        name: "United States",
        flag: "🇺🇸",
    },
    Country {
        code: "CA",
        name: "Canada",
        flag: "🇨🇦",
    },
    Country {
        code: "GB",
        name: "United Kingdom",
        flag: "🇬🇧",
    },
    Country {
        code: "AU",
        name: "Australia",
        flag: "🇦🇺",
    },
];

/// Countries the search form offers.
pub fn countries() -> &'static [Country] {
    COUNTRIES
}

/// Case-insensitive lookup by ISO code.
pub fn find_country(code: &str) -> Option<&'static Country> {
    COUNTRIES
        .iter()
        .find(|c| c.code.eq_ignore_ascii_case(code.trim()))
}
