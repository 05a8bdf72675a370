// ── Core error types ──
//
// User-facing errors from labinv-core. These are NOT API-specific;
// consumers never see HTTP status codes or JSON parse failures directly.
// The `From<labinv_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    #[error("Cannot reach {service}: {reason}")]
    ConnectionFailed { service: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Lab session closed")]
    Disconnected,

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Capability errors ────────────────────────────────────────────
    #[error("{capability} is not supported on this device")]
    CapabilityMissing { capability: String },

    #[error("Camera unavailable: {reason}")]
    CameraUnavailable { reason: String },

    #[error("Operation not supported: {operation}")]
    Unsupported { operation: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// Service error code (e.g. `PERMISSION_DENIED`).
        code: Option<String>,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }

    pub(crate) fn not_found(entity_type: &str, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            identifier: identifier.into(),
        }
    }

    /// True for errors that mean the identity is gone or rejected.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. } | Self::NotSignedIn)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<labinv_api::Error> for CoreError {
    fn from(err: labinv_api::Error) -> Self {
        use labinv_api::Error as Api;

        match err {
            Api::Authentication { message } => CoreError::AuthenticationFailed { message },
            Api::SessionExpired => CoreError::AuthenticationFailed {
                message: "Session expired -- sign in again".into(),
            },
            Api::InvalidApiKey => CoreError::AuthenticationFailed {
                message: "Invalid API key".into(),
            },
            Api::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        service: e
                            .url()
                            .and_then(|u| u.host_str().map(str::to_owned))
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            Api::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            Api::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            Api::Service {
                status: 404,
                message,
                ..
            } => CoreError::NotFound {
                entity_type: "Resource".into(),
                identifier: message,
            },
            Api::Service {
                status,
                code,
                message,
            } => CoreError::Api {
                message,
                code,
                status: Some(status),
            },
            Api::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            Api::Schema(message) => CoreError::Internal(format!("Unexpected response: {message}")),
            Api::NotConfigured(message) => CoreError::Config { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_expired_session_to_auth_failure() {
        let err = CoreError::from(labinv_api::Error::SessionExpired);
        assert!(err.is_auth());
    }

    #[test]
    fn maps_service_404_to_not_found() {
        let err = CoreError::from(labinv_api::Error::Service {
            status: 404,
            code: Some("NOT_FOUND".into()),
            message: "no such document".into(),
        });
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn keeps_service_code() {
        let err = CoreError::from(labinv_api::Error::Service {
            status: 403,
            code: Some("PERMISSION_DENIED".into()),
            message: "Missing or insufficient permissions.".into(),
        });
        match err {
            CoreError::Api { code, status, .. } => {
                assert_eq!(code.as_deref(), Some("PERMISSION_DENIED"));
                assert_eq!(status, Some(403));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn not_configured_is_config_error() {
        let err = CoreError::from(labinv_api::Error::NotConfigured(
            "Image host API key is not configured.".into(),
        ));
        assert_eq!(
            err.to_string(),
            "Configuration error: Image host API key is not configured."
        );
    }
}
