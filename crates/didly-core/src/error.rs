// ── Core error types ──
//
// User-facing errors from didly-core. Consumers never see reqwest errors
// or JSON parse failures directly: the `From<didly_api::Error>` impl folds
// transport-layer failures into this taxonomy.

use std::time::Duration;

use thiserror::Error;

use crate::normalize::NormalizationError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Local ────────────────────────────────────────────────────────
    /// Malformed filter or configuration input. No remote call was made.
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    // ── Connectivity ─────────────────────────────────────────────────
    #[error("Cannot reach backend: {reason}")]
    Transport { reason: String },

    #[error("Backend request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("Authentication failed: {message}")]
    Unauthorized { message: String },

    // ── Backend ──────────────────────────────────────────────────────
    #[error("Backend error (HTTP {status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error(transparent)]
    Normalization(#[from] NormalizationError),

    // ── Orchestration ────────────────────────────────────────────────
    /// Another mutation for the same number hasn't finished yet.
    #[error("A change to number {id} is already in progress")]
    Busy { id: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Message suitable for showing verbatim to the user, when there is one.
    ///
    /// Backend-reported messages and local validation failures qualify.
    /// Connectivity and internal failures return `None` so callers fall back
    /// to a generic message.
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::Remote { message, .. } | Self::NotFound { message } if !message.is_empty() => {
                Some(message.clone())
            }
            Self::Validation { .. } => Some(self.to_string()),
            _ => None,
        }
    }

    /// `true` when the backend could not be reached at all.
    pub fn is_offline(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Timeout { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<didly_api::Error> for CoreError {
    fn from(err: didly_api::Error) -> Self {
        match err {
            didly_api::Error::InvalidToken => CoreError::Unauthorized {
                message: "backend rejected the API token".into(),
            },
            didly_api::Error::MalformedToken(reason) => CoreError::Config {
                message: format!("API token is not a valid header value: {reason}"),
            },
            didly_api::Error::Transport(ref e) => {
                if let Some(status) = e.status() {
                    CoreError::Remote {
                        status: status.as_u16(),
                        message: e.to_string(),
                    }
                } else {
                    CoreError::Transport {
                        reason: e.to_string(),
                    }
                }
            }
            didly_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            didly_api::Error::Timeout { timeout } => CoreError::Timeout { timeout },
            didly_api::Error::Tls(reason) => CoreError::Transport {
                reason: format!("TLS error: {reason}"),
            },
            didly_api::Error::Remote {
                status: 404,
                message,
                ..
            } => CoreError::NotFound { message },
            didly_api::Error::Remote {
                status, message, ..
            } => CoreError::Remote { status, message },
            didly_api::Error::Deserialization { message, body: _ } => {
                CoreError::Normalization(NormalizationError::Malformed { message })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_message_is_shown_verbatim() {
        let err = CoreError::from(didly_api::Error::Remote {
            status: 409,
            message: "Number already owned".into(),
            code: None,
        });
        assert_eq!(err.user_message().as_deref(), Some("Number already owned"));
    }

    #[test]
    fn backend_404_becomes_not_found() {
        let err = CoreError::from(didly_api::Error::Remote {
            status: 404,
            message: "Number not found".into(),
            code: None,
        });
        assert!(err.is_not_found());
    }

    #[test]
    fn offline_errors_have_no_user_message() {
        let err = CoreError::Transport {
            reason: "connection refused".into(),
        };
        assert!(err.is_offline());
        assert!(err.user_message().is_none());
    }
}
