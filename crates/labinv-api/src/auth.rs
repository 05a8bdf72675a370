use std::sync::Arc;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};

/// Email/password pair for the identity service.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

/// A signed-in identity as issued by the identity service.
///
/// `id_token` authorizes document-store requests; `refresh_token` trades
/// for a new `id_token` once `expires_at` passes.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub uid: String,
    pub email: Option<String>,
    pub id_token: SecretString,
    pub refresh_token: SecretString,
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    /// True once `now` is within 60 seconds of expiry.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now + chrono::Duration::seconds(60) >= self.expires_at
    }
}

/// Shared, lock-free slot holding the current bearer token.
///
/// The document client reads it on every request; the session owner
/// swaps it on sign-in, refresh, and sign-out.
#[derive(Debug, Clone, Default)]
pub struct TokenSlot {
    inner: Arc<ArcSwapOption<SecretString>>,
}

impl TokenSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, token: SecretString) {
        self.inner.store(Some(Arc::new(token)));
    }

    pub fn clear(&self) {
        self.inner.store(None);
    }

    pub fn is_set(&self) -> bool {
        self.inner.load().is_some()
    }

    /// `Authorization` header value, if a token is present.
    pub(crate) fn bearer(&self) -> Option<String> {
        self.inner
            .load()
            .as_ref()
            .map(|t| format!("Bearer {}", t.expose_secret()))
    }
}
