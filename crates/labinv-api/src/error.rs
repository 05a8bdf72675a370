use thiserror::Error;

/// Top-level error type for the `labinv-api` crate.
///
/// Covers every failure mode across the hosted services: identity,
/// document store, generative model, and image host.
/// `labinv-core` maps these into domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Sign-in or sign-up rejected (wrong password, unknown email, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// ID token expired or revoked; a refresh or fresh sign-in is needed.
    #[error("Session expired -- sign in again")]
    SessionExpired,

    /// API key rejected by the service.
    #[error("Invalid API key")]
    InvalidApiKey,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Service ─────────────────────────────────────────────────────
    /// Structured error returned by one of the hosted services
    /// (`{"error": {"code", "message", "status"}}` envelope).
    #[error("Service error (HTTP {status}): {message}")]
    Service {
        status: u16,
        code: Option<String>,
        message: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// A payload parsed as JSON but did not have the expected shape.
    #[error("Unexpected response shape: {0}")]
    Schema(String),

    // ── Configuration ───────────────────────────────────────────────
    /// A required key or endpoint was never configured.
    #[error("{0}")]
    NotConfigured(String),
}

impl Error {
    /// Returns `true` if this error indicates auth has expired
    /// and re-authentication might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
            || matches!(self, Self::Service { status: 401, .. })
    }

    /// Returns `true` if this is a transient error worth retrying by hand.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Service { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Service { status: 404, .. } => true,
            _ => false,
        }
    }

    /// Extract the service error code (e.g. `EMAIL_EXISTS`, `NOT_FOUND`).
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Service { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

// ── Shared error envelope ───────────────────────────────────────────

/// `{"error": {"code": 400, "message": "...", "status": "..."}}`, the
/// error shape shared by the identity, document, and generative services.
#[derive(serde::Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(serde::Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Build an [`Error::Service`] from a non-success status and raw body.
pub(crate) fn service_error(status: reqwest::StatusCode, raw: String) -> Error {
    if let Ok(env) = serde_json::from_str::<ErrorEnvelope>(&raw) {
        Error::Service {
            status: status.as_u16(),
            message: env.error.message.unwrap_or_else(|| status.to_string()),
            code: env.error.status,
        }
    } else {
        Error::Service {
            status: status.as_u16(),
            message: if raw.is_empty() {
                status.to_string()
            } else {
                raw
            },
            code: None,
        }
    }
}

/// Parse a success body, keeping a 200-char preview in the error message.
pub(crate) fn decode_body<T: serde::de::DeserializeOwned>(body: String) -> Result<T, Error> {
    serde_json::from_str(&body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}
