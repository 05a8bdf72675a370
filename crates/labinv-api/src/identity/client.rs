// Async client for the hosted identity service.
//
// Endpoints: accounts:signUp, accounts:signInWithPassword, accounts:lookup
// on the identity base, and `token` on the secure-token base.
// Auth: `key` query parameter.

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::types::{
    LookupRequest, LookupResponse, PasswordRequest, PasswordResponse, RefreshResponse, UserRecord,
};
use crate::auth::{AuthSession, Credentials};
use crate::error::{self, Error};
use crate::transport::{self, TransportConfig};

pub const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1/";
pub const DEFAULT_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1/";

/// Async client for email/password identity flows.
pub struct IdentityClient {
    http: reqwest::Client,
    identity_url: Url,
    token_url: Url,
    api_key: SecretString,
    transport: TransportConfig,
}

impl IdentityClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Client against the public identity endpoints.
    pub fn new(api_key: SecretString, transport: &TransportConfig) -> Result<Self, Error> {
        Self::with_endpoints(DEFAULT_IDENTITY_URL, DEFAULT_TOKEN_URL, api_key, transport)
    }

    /// Client against explicit endpoints (emulators, tests).
    pub fn with_endpoints(
        identity_url: &str,
        token_url: &str,
        api_key: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::NotConfigured(
                "Identity API key is not configured.".into(),
            ));
        }
        Ok(Self {
            http: transport.build_client()?,
            identity_url: transport::normalize_base(identity_url)?,
            token_url: transport::normalize_base(token_url)?,
            api_key,
            transport: transport.clone(),
        })
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        debug!("POST {}", url.path());

        let resp = self
            .http
            .post(url)
            .query(&[("key", self.api_key.expose_secret())])
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport.classify(e))?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;
        if status.is_success() {
            error::decode_body(body)
        } else {
            Err(map_identity_error(error::service_error(status, body)))
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Create a new account and sign it in.
    pub async fn sign_up(&self, credentials: &Credentials) -> Result<AuthSession, Error> {
        let url = transport::append_path(&self.identity_url, "accounts:signUp")?;
        let resp: PasswordResponse = self
            .post(url, &password_body(credentials))
            .await?;
        session_from_password(resp)
    }

    /// Sign in with email and password.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession, Error> {
        let url = transport::append_path(&self.identity_url, "accounts:signInWithPassword")?;
        let resp: PasswordResponse = self
            .post(url, &password_body(credentials))
            .await?;
        session_from_password(resp)
    }

    /// Trade a refresh token for a fresh ID token.
    pub async fn refresh(&self, session: &AuthSession) -> Result<AuthSession, Error> {
        let url = transport::append_path(&self.token_url, "token")?;
        debug!("POST {}", url.path());

        let resp = self
            .http
            .post(url)
            .query(&[("key", self.api_key.expose_secret())])
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", session.refresh_token.expose_secret()),
            ])
            .send()
            .await
            .map_err(|e| self.transport.classify(e))?;
        let resp: RefreshResponse = self.handle_response(resp).await?;

        Ok(AuthSession {
            uid: resp.user_id,
            email: session.email.clone(),
            id_token: resp.id_token.into(),
            refresh_token: resp.refresh_token.into(),
            expires_at: expiry(&resp.expires_in)?,
        })
    }

    /// Look up the account behind an ID token.
    pub async fn lookup(&self, session: &AuthSession) -> Result<UserRecord, Error> {
        let url = transport::append_path(&self.identity_url, "accounts:lookup")?;
        let resp: LookupResponse = self
            .post(
                url,
                &LookupRequest {
                    id_token: session.id_token.expose_secret(),
                },
            )
            .await?;
        resp.users
            .into_iter()
            .next()
            .ok_or_else(|| Error::Schema("lookup returned no users".into()))
    }
}

fn password_body(credentials: &Credentials) -> PasswordRequest<'_> {
    PasswordRequest {
        email: &credentials.email,
        password: credentials.password.expose_secret(),
        return_secure_token: true,
    }
}

fn session_from_password(resp: PasswordResponse) -> Result<AuthSession, Error> {
    Ok(AuthSession {
        expires_at: expiry(&resp.expires_in)?,
        uid: resp.local_id,
        email: resp.email,
        id_token: resp.id_token.into(),
        refresh_token: resp.refresh_token.into(),
    })
}

fn expiry(expires_in: &str) -> Result<chrono::DateTime<Utc>, Error> {
    let secs: i64 = expires_in
        .parse()
        .map_err(|_| Error::Schema(format!("invalid expiresIn: {expires_in:?}")))?;
    Ok(Utc::now() + chrono::Duration::seconds(secs))
}

/// Translate identity error codes into the auth variants of [`Error`].
///
/// The service reports failures as HTTP 400 with a code in `message`
/// (e.g. `EMAIL_EXISTS`, `WEAK_PASSWORD : Password should be ...`).
fn map_identity_error(err: Error) -> Error {
    let (code, bad_key) = match &err {
        Error::Service {
            status: 400 | 401 | 403,
            message,
            ..
        } => (
            message.split(':').next().unwrap_or_default().trim().to_owned(),
            message.starts_with("API key not valid"),
        ),
        _ => return err,
    };

    let friendly = match code.as_str() {
        "EMAIL_EXISTS" => "An account with this email already exists.",
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            "Invalid email or password."
        }
        "USER_DISABLED" => "This account has been disabled.",
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "Too many attempts. Try again later.",
        "WEAK_PASSWORD" => "Password should be at least 6 characters.",
        "INVALID_EMAIL" => "The email address is badly formatted.",
        "TOKEN_EXPIRED" | "INVALID_ID_TOKEN" | "INVALID_REFRESH_TOKEN" | "USER_NOT_FOUND" => {
            return Error::SessionExpired;
        }
        _ if bad_key => return Error::InvalidApiKey,
        _ => return err,
    };
    Error::Authentication {
        message: friendly.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(status: u16, message: &str) -> Error {
        Error::Service {
            status,
            code: Some("INVALID_ARGUMENT".into()),
            message: message.into(),
        }
    }

    #[test]
    fn maps_credential_codes() {
        let err = map_identity_error(service(400, "INVALID_LOGIN_CREDENTIALS"));
        assert!(
            matches!(err, Error::Authentication { ref message } if message == "Invalid email or password.")
        );
    }

    #[test]
    fn maps_weak_password_with_detail_suffix() {
        let err = map_identity_error(service(
            400,
            "WEAK_PASSWORD : Password should be at least 6 characters",
        ));
        assert!(matches!(err, Error::Authentication { .. }));
    }

    #[test]
    fn maps_expired_tokens() {
        assert!(map_identity_error(service(400, "TOKEN_EXPIRED")).is_auth_expired());
    }

    #[test]
    fn leaves_server_errors_alone() {
        let err = map_identity_error(service(503, "backend unavailable"));
        assert!(err.is_transient());
    }

    #[test]
    fn rejects_empty_api_key() {
        let result = IdentityClient::new(String::new().into(), &TransportConfig::default());
        assert!(matches!(result, Err(Error::NotConfigured(_))));
    }
}
