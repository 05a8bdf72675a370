// Shared transport configuration for building reqwest::Client instances.
//
// Every service client shares timeout and user-agent settings through
// this module, avoiding duplicated builder logic.

use std::time::Duration;

use reqwest::header::HeaderMap;

use crate::error::Error;

const USER_AGENT: &str = concat!("labinv/", env!("CARGO_PKG_VERSION"));

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl TransportConfig {
    /// Config with an overall request timeout in seconds.
    pub fn with_timeout_secs(secs: u64) -> Self {
        Self {
            timeout: Duration::from_secs(secs),
            ..Self::default()
        }
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        self.build_client_with_headers(HeaderMap::new())
    }

    /// Build a `reqwest::Client` with additional default headers.
    ///
    /// Used by the generative client to inject the `x-goog-api-key` header.
    pub fn build_client_with_headers(&self, headers: HeaderMap) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(Error::Transport)
    }

    /// Map a reqwest timeout into [`Error::Timeout`] so callers see the budget.
    pub(crate) fn classify(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }
}

/// Parse `raw` as a base URL, forcing a trailing slash so that
/// relative joins append instead of replacing the last segment.
pub(crate) fn normalize_base(raw: &str) -> Result<url::Url, Error> {
    let mut url = url::Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Append a path that may contain `:` (e.g. `accounts:signUp`) onto a base.
///
/// `Url::join` would read the colon as a scheme separator, so the path is
/// concatenated textually and reparsed.
pub(crate) fn append_path(base: &url::Url, path: &str) -> Result<url::Url, Error> {
    Ok(url::Url::parse(&format!("{base}{path}"))?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn normalize_adds_trailing_slash() {
        let url = normalize_base("https://example.test/v1").unwrap();
        assert_eq!(url.as_str(), "https://example.test/v1/");
    }

    #[test]
    fn append_keeps_colon_segments() {
        let base = normalize_base("https://example.test/v1").unwrap();
        let url = append_path(&base, "accounts:signUp").unwrap();
        assert_eq!(url.as_str(), "https://example.test/v1/accounts:signUp");
    }
}
