//! Shared configuration for the didly CLI and TUI.
//!
//! TOML profiles, token resolution (env + keyring + plaintext), and
//! translation to `didly_core::SessionConfig`. Both binaries depend on
//! this crate; the CLI layers its global flags on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use didly_core::{BackendTarget, ProvisioningDefaults, SessionConfig, TlsVerification};

/// Service name under which tokens live in the OS keyring.
pub const KEYRING_SERVICE: &str = "didly";

/// Fallback env var consulted for every profile.
pub const TOKEN_ENV: &str = "DIDLY_TOKEN";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("no API token configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use: the explicit one, else the configured
    /// default, else `"default"`.
    pub fn active_profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// ISO 4217 code applied to listing prices.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Seconds between health probes.
    #[serde(default = "default_health_interval")]
    pub health_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
            currency: default_currency(),
            health_interval: default_health_interval(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_currency() -> String {
    "USD".into()
}
fn default_health_interval() -> u64 {
    30
}

/// A named backend profile.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Backend base URL (e.g., "https://api.example.com/v1").
    pub api_url: String,

    /// API token (plaintext, prefer keyring or env var).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Environment variable name containing the token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    /// Path to custom CA certificate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Routing target sent with every purchase.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_route: Option<String>,

    /// Description sent with every purchase.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_description: Option<String>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "didly", "didly").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("didly");
    p
}

/// Directory for log files written by the TUI.
pub fn data_dir() -> PathBuf {
    ProjectDirs::from("com", "didly", "didly").map_or_else(
        || dirs_fallback().join("data"),
        |dirs| dirs.data_local_dir().to_path_buf(),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path`, layered under `DIDLY_`-prefixed env vars.
///
/// Nested keys use a double underscore: `DIDLY_DEFAULTS__TIMEOUT=10`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("DIDLY_").ignore(&["TOKEN"]).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(&path, cfg)?;
    Ok(path)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Token resolution ────────────────────────────────────────────────

/// Resolve the API token from the credential chain (no CLI flag step).
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_token_with(
        profile,
        profile_name,
        |name| std::env::var(name).ok(),
        keyring_token,
    )
}

/// Same chain as [`resolve_token`] with injectable lookups:
///
/// 1. the profile's `token_env` variable
/// 2. `DIDLY_TOKEN`
/// 3. the OS keyring entry `<profile>/token`
/// 4. plaintext `token` in the profile
pub fn resolve_token_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    let non_empty = |v: String| (!v.trim().is_empty()).then_some(v);

    if let Some(val) = profile
        .token_env
        .as_deref()
        .and_then(&env)
        .and_then(non_empty)
    {
        return Ok(SecretString::from(val));
    }
    if let Some(val) = env(TOKEN_ENV).and_then(non_empty) {
        return Ok(SecretString::from(val));
    }
    if let Some(val) = keyring(profile_name).and_then(non_empty) {
        return Ok(SecretString::from(val));
    }
    if let Some(val) = profile.token.clone().and_then(non_empty) {
        return Ok(SecretString::from(val));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/token"))
}

fn keyring_token(profile_name: &str) -> Option<String> {
    keyring_entry(profile_name)
        .and_then(|entry| entry.get_password())
        .ok()
}

/// Store a profile's token in the OS keyring.
pub fn store_token(profile_name: &str, token: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(token.expose_secret())?;
    Ok(())
}

// ── SessionConfig translation ───────────────────────────────────────

/// Build a `SessionConfig` from a profile, no CLI flag overrides.
pub fn profile_to_session_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<SessionConfig, ConfigError> {
    let url = parse_api_url(&profile.api_url)?;
    let token = resolve_token(profile, profile_name)?;
    build_session_config(profile, defaults, url, token)
}

/// Shared tail of session config construction once URL and token are known.
pub fn build_session_config(
    profile: &Profile,
    defaults: &Defaults,
    url: url::Url,
    token: SecretString,
) -> Result<SessionConfig, ConfigError> {
    let tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let currency = validate_currency(profile.currency.as_deref().unwrap_or(&defaults.currency))?;

    let fallback = ProvisioningDefaults::default();
    let provisioning = ProvisioningDefaults {
        routing: profile.default_route.clone().unwrap_or(fallback.routing),
        description: profile
            .default_description
            .clone()
            .unwrap_or(fallback.description),
    };

    Ok(SessionConfig {
        backend: BackendTarget::Remote {
            url,
            token: Some(token),
        },
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        currency,
        provisioning,
        health_interval: Duration::from_secs(defaults.health_interval),
    })
}

/// Session config for the seeded in-memory backend.
pub fn demo_session_config(defaults: &Defaults) -> Result<SessionConfig, ConfigError> {
    Ok(SessionConfig {
        currency: validate_currency(&defaults.currency)?,
        health_interval: Duration::from_secs(defaults.health_interval),
        ..SessionConfig::in_memory()
    })
}

/// Parse a backend URL; only http(s) is accepted.
pub fn parse_api_url(raw: &str) -> Result<url::Url, ConfigError> {
    let invalid = || ConfigError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL: {raw}"),
    };
    let url: url::Url = raw.trim().parse().map_err(|_| invalid())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(invalid()),
    }
}

fn validate_currency(raw: &str) -> Result<String, ConfigError> {
    let code = raw.trim().to_ascii_uppercase();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code)
    } else {
        Err(ConfigError::Validation {
            field: "currency".into(),
            reason: format!("expected a 3-letter ISO 4217 code, got '{raw}'"),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn profile() -> Profile {
        Profile {
            api_url: "https://api.example.com/v1".into(),
            token: Some("plain".into()),
            token_env: Some("MY_DID_TOKEN".into()),
            ..Profile::default()
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.defaults, Defaults::default());
        assert!(cfg.profiles.is_empty());
        assert_eq!(cfg.active_profile_name(None), "default");
    }

    #[test]
    fn save_then_load_preserves_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let cfg = Config {
            default_profile: Some("prod".into()),
            defaults: Defaults {
                currency: "GBP".into(),
                ..Defaults::default()
            },
            profiles: HashMap::from([("prod".to_owned(), profile())]),
        };
        save_config_to(&path, &cfg).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded, cfg);
        assert_eq!(loaded.active_profile_name(None), "prod");
        assert_eq!(loaded.active_profile_name(Some("dev")), "dev");
    }

    #[test]
    fn hand_written_toml_is_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "lab"

[defaults]
timeout = 5

[profiles.lab]
api_url = "http://localhost:8080"
insecure = true
default_route = "sip-trunk-1"
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.defaults.timeout, 5);
        assert_eq!(cfg.defaults.output, "table");
        let lab = cfg.profile("lab").unwrap();
        assert_eq!(lab.insecure, Some(true));
        assert!(matches!(
            cfg.profile("prod"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn token_chain_prefers_profile_env_then_global_env() {
        let p = profile();
        let env = |name: &str| match name {
            "MY_DID_TOKEN" => Some("from-profile-env".to_owned()),
            TOKEN_ENV => Some("from-global-env".to_owned()),
            _ => None,
        };
        let token = resolve_token_with(&p, "prod", env, |_| Some("from-keyring".into())).unwrap();
        assert_eq!(token.expose_secret(), "from-profile-env");

        let global_only = |name: &str| (name == TOKEN_ENV).then(|| "from-global-env".to_owned());
        let token =
            resolve_token_with(&p, "prod", global_only, |_| Some("from-keyring".into())).unwrap();
        assert_eq!(token.expose_secret(), "from-global-env");
    }

    #[test]
    fn token_chain_falls_back_to_keyring_then_plaintext() {
        let p = profile();
        let token = resolve_token_with(&p, "prod", no_env, |_| Some("from-keyring".into())).unwrap();
        assert_eq!(token.expose_secret(), "from-keyring");

        let token = resolve_token_with(&p, "prod", no_env, |_| None).unwrap();
        assert_eq!(token.expose_secret(), "plain");
    }

    #[test]
    fn blank_tokens_are_skipped_and_none_is_an_error() {
        let p = Profile {
            token: Some("   ".into()),
            ..profile()
        };
        let err = resolve_token_with(&p, "prod", |_| Some(String::new()), |_| None).unwrap_err();
        assert!(matches!(err, ConfigError::NoCredentials { profile: ref name } if name == "prod"));
    }

    #[test]
    fn session_config_applies_profile_overrides() {
        let p = Profile {
            insecure: Some(true),
            timeout: Some(7),
            currency: Some("cad".into()),
            default_route: Some("trunk-2".into()),
            ..profile()
        };
        let url = parse_api_url(&p.api_url).unwrap();
        let cfg =
            build_session_config(&p, &Defaults::default(), url, SecretString::from("t")).unwrap();

        assert_eq!(cfg.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(cfg.timeout, Duration::from_secs(7));
        assert_eq!(cfg.currency, "CAD");
        assert_eq!(cfg.provisioning.routing, "trunk-2");
        assert_eq!(cfg.provisioning.description, "Provisioned via didly");
        assert!(matches!(cfg.backend, BackendTarget::Remote { .. }));
    }

    #[test]
    fn bad_url_and_currency_are_rejected() {
        assert!(parse_api_url("ftp://example.com").is_err());
        assert!(parse_api_url("not a url").is_err());

        let p = Profile {
            currency: Some("dollars".into()),
            ..profile()
        };
        let url = parse_api_url(&p.api_url).unwrap();
        let err = build_session_config(&p, &Defaults::default(), url, SecretString::from("t"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "currency"));
    }

    #[test]
    fn demo_config_uses_in_memory_backend() {
        let cfg = demo_session_config(&Defaults::default()).unwrap();
        assert!(matches!(cfg.backend, BackendTarget::InMemory));
        assert_eq!(cfg.currency, "USD");
    }
}
