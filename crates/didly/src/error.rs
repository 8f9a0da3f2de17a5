//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a stable process exit code.

use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

use didly_config::ConfigError;
use didly_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    #[allow(dead_code)]
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONNECTION: i32 = 3;
    pub const AUTH: i32 = 4;
    pub const NOT_FOUND: i32 = 5;
    pub const VALIDATION: i32 = 6;
    pub const REMOTE: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the provisioning backend")]
    #[diagnostic(
        code(didly::connection_failed),
        help(
            "{reason}\n\
             Check the api_url in your profile, or try: didly health"
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Request timed out after {timeout:?}")]
    #[diagnostic(
        code(didly::timeout),
        help("Increase the timeout with --timeout or check backend responsiveness.")
    )]
    Timeout { timeout: Duration },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(didly::auth_failed),
        help(
            "Verify your API token.\n\
             Store a new one with: didly config set-token"
        )
    )]
    AuthFailed { message: String },

    #[error("No API token configured for profile '{profile}'")]
    #[diagnostic(
        code(didly::no_credentials),
        help(
            "Configure one with: didly config init\n\
             Or set the DIDLY_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(didly::not_found),
        help("Run: didly numbers list (owned) or didly search (available)")
    )]
    NotFound { message: String },

    #[error("A change to number {id} is already in progress")]
    #[diagnostic(code(didly::busy), help("Wait for it to finish and try again."))]
    Busy { id: String },

    // ── Backend ──────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(didly::remote), help("The backend rejected the request (HTTP {status})."))]
    Remote { status: u16, message: String },

    #[error("Backend returned an unexpected response: {message}")]
    #[diagnostic(code(didly::malformed_response))]
    MalformedResponse { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(didly::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(didly::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: didly config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No backend configured")]
    #[diagnostic(
        code(didly::no_config),
        help(
            "Create a profile with: didly config init\n\
             Expected at: {path}\n\
             Or pass --api-url, or try --demo."
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(didly::config))]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(didly::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Internal / IO ────────────────────────────────────────────────
    #[error("Internal error: {message}")]
    #[diagnostic(code(didly::internal))]
    Internal { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Timeout { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } => exit_code::VALIDATION,
            Self::Remote { .. } | Self::MalformedResponse { .. } => exit_code::REMOTE,
            Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::Busy { .. }
            | Self::ProfileNotFound { .. }
            | Self::NoConfig { .. }
            | Self::Config { .. }
            | Self::Internal { .. }
            | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { field, reason } => CliError::Validation { field, reason },
            CoreError::Transport { reason } => CliError::ConnectionFailed { reason },
            CoreError::Timeout { timeout } => CliError::Timeout { timeout },
            CoreError::Unauthorized { message } => CliError::AuthFailed { message },
            CoreError::Remote { status, message } => CliError::Remote {
                status,
                message: if message.is_empty() {
                    format!("backend returned HTTP {status}")
                } else {
                    message
                },
            },
            CoreError::NotFound { message } => CliError::NotFound {
                message: if message.is_empty() {
                    "Number not found".into()
                } else {
                    message
                },
            },
            CoreError::Normalization(e) => CliError::MalformedResponse {
                message: e.to_string(),
            },
            CoreError::Busy { id } => CliError::Busy { id },
            CoreError::Config { message } => CliError::Config { message },
            CoreError::Internal(message) => CliError::Internal { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: String::new(),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_kind() {
        let cases = [
            (CoreError::Transport { reason: "refused".into() }, exit_code::CONNECTION),
            (
                CoreError::Timeout {
                    timeout: Duration::from_secs(3),
                },
                exit_code::CONNECTION,
            ),
            (CoreError::Unauthorized { message: "nope".into() }, exit_code::AUTH),
            (CoreError::NotFound { message: String::new() }, exit_code::NOT_FOUND),
            (
                CoreError::Validation {
                    field: "area_code".into(),
                    reason: "digits only".into(),
                },
                exit_code::VALIDATION,
            ),
            (
                CoreError::Remote {
                    status: 409,
                    message: "Number already owned".into(),
                },
                exit_code::REMOTE,
            ),
            (CoreError::Busy { id: "1".into() }, exit_code::GENERAL),
        ];
        for (core, code) in cases {
            let label = core.to_string();
            assert_eq!(CliError::from(core).exit_code(), code, "{label}");
        }
    }

    #[test]
    fn empty_backend_messages_get_a_fallback() {
        let err = CliError::from(CoreError::NotFound {
            message: String::new(),
        });
        assert_eq!(err.to_string(), "Number not found");

        let err = CliError::from(CoreError::Remote {
            status: 502,
            message: String::new(),
        });
        assert_eq!(err.to_string(), "backend returned HTTP 502");
    }

    #[test]
    fn missing_token_is_an_auth_failure() {
        let err = CliError::from(ConfigError::NoCredentials {
            profile: "prod".into(),
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }
}
