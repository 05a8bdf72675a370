// Image host client (imgbb upload shape).
//
// POST {base}upload?key=<key> with a multipart `image` field holding the
// base64-encoded picture. Answers with `{success, data: {display_url}}`
// or `{success: false, error: {message}}`.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::{self, Error};
use crate::transport::{self, TransportConfig};

pub const DEFAULT_IMAGE_URL: &str = "https://api.imgbb.com/1/";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<UploadData>,
    #[serde(default)]
    error: Option<UploadError>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    display_url: String,
}

#[derive(Debug, Deserialize)]
struct UploadError {
    #[serde(default)]
    message: Option<String>,
}

pub struct ImageHostClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
    transport: TransportConfig,
}

impl ImageHostClient {
    pub fn new(api_key: SecretString, transport: &TransportConfig) -> Result<Self, Error> {
        Self::with_endpoint(DEFAULT_IMAGE_URL, api_key, transport)
    }

    pub fn with_endpoint(
        base_url: &str,
        api_key: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::NotConfigured(
                "Image host API key is not configured.".into(),
            ));
        }
        Ok(Self {
            http: transport.build_client()?,
            base_url: transport::normalize_base(base_url)?,
            api_key,
            transport: transport.clone(),
        })
    }

    /// Upload raw image bytes; returns the public display URL.
    pub async fn upload(&self, image: &[u8]) -> Result<String, Error> {
        self.upload_base64(STANDARD.encode(image)).await
    }

    /// Upload an already base64-encoded image (data-URL prefix stripped).
    pub async fn upload_base64(&self, encoded: String) -> Result<String, Error> {
        let url = self.base_url.join("upload")?;
        debug!("POST {}", url.path());

        let form = reqwest::multipart::Form::new().text("image", strip_data_url(encoded));
        let resp = self
            .http
            .post(url)
            .query(&[("key", self.api_key.expose_secret())])
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.transport.classify(e))?;

        let status = resp.status();
        let raw = resp.text().await.map_err(Error::Transport)?;
        let parsed: UploadResponse = match error::decode_body(raw) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(Error::Service {
                    status: status.as_u16(),
                    code: None,
                    message: "Failed to upload image.".into(),
                });
            }
            Err(e) => return Err(e),
        };

        match parsed {
            UploadResponse {
                success: true,
                data: Some(data),
                ..
            } => Ok(data.display_url),
            UploadResponse { error, .. } => Err(Error::Service {
                status: status.as_u16(),
                code: None,
                message: error
                    .and_then(|e| e.message)
                    .unwrap_or_else(|| "Failed to upload image.".into()),
            }),
        }
    }
}

/// Drop a leading `data:image/...;base64,` prefix if present.
fn strip_data_url(encoded: String) -> String {
    if encoded.starts_with("data:") {
        if let Some((_, payload)) = encoded.split_once(',') {
            return payload.to_owned();
        }
    }
    encoded
}
