// ── Runtime session configuration ──
//
// Describes *how* to reach the provisioning backend and which
// deployment-fixed defaults to apply. Never touches disk: the CLI/TUI
// build a `SessionConfig` from didly-config and hand it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed lab backends).
    DangerAcceptInvalid,
}

/// Defaults attached to every purchase request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningDefaults {
    /// Routing target the backend points a freshly bought number at.
    pub routing: String,
    /// Description stored alongside the number.
    pub description: String,
}

impl Default for ProvisioningDefaults {
    fn default() -> Self {
        Self {
            routing: "default".into(),
            description: "Provisioned via didly".into(),
        }
    }
}

/// Where the session's data comes from.
#[derive(Debug, Clone)]
pub enum BackendTarget {
    /// The real provisioning backend over HTTP.
    Remote {
        url: Url,
        /// Bearer token. `None` for backends that sit behind an auth proxy.
        token: Option<SecretString>,
    },
    /// Seeded in-memory backend (demos, offline tests).
    InMemory,
}

/// Configuration for a single session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub backend: BackendTarget,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// ISO 4217 code applied to every listing's price.
    pub currency: String,
    pub provisioning: ProvisioningDefaults,
    /// Health probe period. Zero disables the probe.
    pub health_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: BackendTarget::InMemory,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            currency: "USD".into(),
            provisioning: ProvisioningDefaults::default(),
            health_interval: Duration::from_secs(30),
        }
    }
}

impl SessionConfig {
    pub fn remote(url: Url, token: Option<SecretString>) -> Self {
        Self {
            backend: BackendTarget::Remote { url, token },
            ..Self::default()
        }
    }

    pub fn in_memory() -> Self {
        Self::default()
    }
}
