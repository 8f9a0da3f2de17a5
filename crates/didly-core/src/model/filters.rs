// ── Search filters ──

use serde::{Deserialize, Serialize};

use super::number::{NumberType, PhoneNumber};
use super::supporting::find_country;
use crate::error::CoreError;

/// Criteria for finding available numbers. Every field is optional and an
/// empty filter set matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub country: Option<String>,
    /// Substring of the area code.
    pub area_code: Option<String>,
    /// Case-insensitive substring of the city.
    pub city: Option<String>,
    /// Wildcard pattern; `*` stands for any run of characters.
    pub pattern: Option<String>,
    pub number_type: Option<NumberType>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        present(self.country.as_deref()).is_none()
            && present(self.area_code.as_deref()).is_none()
            && present(self.city.as_deref()).is_none()
            && present(self.pattern.as_deref()).is_none()
            && self.number_type.is_none()
    }

    /// Check the filters locally and return a cleaned copy.
    ///
    /// Blank strings become `None` and the country code is upper-cased.
    pub fn validated(&self) -> Result<Self, CoreError> {
        let country = match present(self.country.as_deref()) {
            Some(code) => {
                let country = find_country(code).ok_or_else(|| {
                    CoreError::validation("country", format!("unsupported country code `{code}`"))
                })?;
                Some(country.code.to_owned())
            }
            None => None,
        };

        let area_code = present(self.area_code.as_deref()).map(str::to_owned);
        if let Some(ref ac) = area_code {
            if ac.len() > 4 || !ac.chars().all(|c| c.is_ascii_digit()) {
                return Err(CoreError::validation(
                    "area code",
                    "expected up to 4 digits",
                ));
            }
        }

        let pattern = present(self.pattern.as_deref()).map(str::to_owned);
        if let Some(ref p) = pattern {
            if !p
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '*' | '+' | '-'))
            {
                return Err(CoreError::validation(
                    "pattern",
                    "only digits, `*`, `+` and `-` are allowed",
                ));
            }
        }

        Ok(Self {
            country,
            area_code,
            city: present(self.city.as_deref()).map(str::to_owned),
            pattern,
            number_type: self.number_type,
        })
    }

    /// Whether a listing satisfies every present criterion.
    pub fn matches(&self, number: &PhoneNumber) -> bool {
        if let Some(country) = present(self.country.as_deref()) {
            if !number.country.eq_ignore_ascii_case(country) {
                return false;
            }
        }
        if let Some(ac) = present(self.area_code.as_deref()) {
            if !number.area_code.contains(ac) {
                return false;
            }
        }
        if let Some(city) = present(self.city.as_deref()) {
            if !number.city.to_lowercase().contains(&city.to_lowercase()) {
                return false;
            }
        }
        if let Some(pattern) = present(self.pattern.as_deref()) {
            if !wildcard_match(pattern, &number.friendly_number) {
                return false;
            }
        }
        if let Some(kind) = self.number_type {
            if number.number_type != kind {
                return false;
            }
        }
        true
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Unanchored, case-insensitive wildcard match.
///
/// `*` matches any run of characters (including none). Without anchors, the
/// literal pieces between stars just have to appear in order somewhere in
/// `text`: `*555*` and `555` both match `415-555-1234`.
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    let text = text.to_lowercase();
    let mut rest = text.as_str();
    for piece in pattern.to_lowercase().split('*').filter(|p| !p.is_empty()) {
        match rest.find(piece) {
            Some(at) => rest = &rest[at + piece.len()..],
            None => return false,
        }
    }
    true
}
