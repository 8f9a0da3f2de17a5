//! CLI-side configuration: layers global flags over didly-config profiles
//! to produce the `SessionConfig` a command runs with.

use std::time::Duration;

use secrecy::SecretString;

use didly_config::{Config, Profile};
use didly_core::{SessionConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Profile name selected by `--profile`, the config's default, or "default".
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    cfg.active_profile_name(global.profile.as_deref())
}

/// Build a `SessionConfig` from the config file, profile, and CLI overrides.
///
/// Precedence: `--demo`, then the selected profile with `--api-url` and
/// `--token` overriding it, then flags alone when no profile exists.
pub fn resolve_session_config(global: &GlobalOpts) -> Result<SessionConfig, CliError> {
    let cfg = didly_config::load_config_or_default();
    resolve_with(global, &cfg)
}

pub fn resolve_with(global: &GlobalOpts, cfg: &Config) -> Result<SessionConfig, CliError> {
    let mut session = if global.demo {
        didly_config::demo_session_config(&cfg.defaults)?
    } else {
        let profile_name = active_profile_name(global, cfg);
        match cfg.profiles.get(&profile_name) {
            Some(profile) => {
                let url = didly_config::parse_api_url(
                    global.api_url.as_deref().unwrap_or(&profile.api_url),
                )?;
                let token = match flag_token(global) {
                    Some(token) => token,
                    None => didly_config::resolve_token(profile, &profile_name)?,
                };
                didly_config::build_session_config(profile, &cfg.defaults, url, token)?
            }
            None if global.profile.is_some() => {
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: available_profiles(cfg),
                });
            }
            None => {
                let raw = global.api_url.as_deref().ok_or_else(|| CliError::NoConfig {
                    path: didly_config::config_path().display().to_string(),
                })?;
                let url = didly_config::parse_api_url(raw)?;
                let token = flag_token(global).ok_or(CliError::NoCredentials {
                    profile: profile_name,
                })?;
                didly_config::build_session_config(&Profile::default(), &cfg.defaults, url, token)?
            }
        }
    };

    if global.insecure {
        session.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        session.timeout = Duration::from_secs(secs);
    }
    Ok(session)
}

fn flag_token(global: &GlobalOpts) -> Option<SecretString> {
    global
        .token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| SecretString::from(t.to_owned()))
}

pub fn available_profiles(cfg: &Config) -> String {
    let mut names: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
    names.sort_unstable();
    if names.is_empty() {
        "(none)".into()
    } else {
        names.join(", ")
    }
}
