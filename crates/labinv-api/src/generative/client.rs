// Async client for the hosted generative model.
//
// Endpoint: models/{model}:generateContent
// Auth: x-goog-api-key header
//
// Every call asks for `application/json` output constrained by a response
// schema, then validates the returned text against the expected shape.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::prompts;
use super::types::{
    Content, DescriptionRequest, EnhancedDescription, GenerateRequest, GenerateResponse,
    GenerationConfig, PaperSummary, Part,
};
use crate::error::{self, Error};
use crate::transport::{self, TransportConfig};

pub const DEFAULT_GENERATIVE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

pub struct GenerativeClient {
    http: reqwest::Client,
    base_url: Url,
    model: String,
    transport: TransportConfig,
}

impl GenerativeClient {
    pub fn new(
        api_key: &SecretString,
        model: Option<&str>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        Self::with_endpoint(DEFAULT_GENERATIVE_URL, api_key, model, transport)
    }

    pub fn with_endpoint(
        base_url: &str,
        api_key: &SecretString,
        model: Option<&str>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::NotConfigured(
                "Generative model API key is not configured.".into(),
            ));
        }

        let mut headers = HeaderMap::new();
        let mut key_value =
            HeaderValue::from_str(api_key.expose_secret()).map_err(|e| Error::Authentication {
                message: format!("invalid API key header value: {e}"),
            })?;
        key_value.set_sensitive(true);
        headers.insert("x-goog-api-key", key_value);

        Ok(Self {
            http: transport.build_client_with_headers(headers)?,
            base_url: transport::normalize_base(base_url)?,
            model: model.unwrap_or(DEFAULT_MODEL).to_owned(),
            transport: transport.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    // ── Core call ────────────────────────────────────────────────────

    /// Run one prompt and decode the JSON answer as `T`.
    async fn generate_json<T: DeserializeOwned>(
        &self,
        prompt: String,
        schema: Value,
    ) -> Result<T, Error> {
        let url = transport::append_path(
            &self.base_url,
            &format!("models/{}:generateContent", self.model),
        )?;
        debug!("POST {}", url.path());

        let body = GenerateRequest {
            contents: vec![Content {
                role: Some("user".into()),
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
            },
        };

        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport.classify(e))?;
        let status = resp.status();
        let raw = resp.text().await.map_err(Error::Transport)?;
        if !status.is_success() {
            return Err(match status {
                reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                    Error::InvalidApiKey
                }
                _ => error::service_error(status, raw),
            });
        }

        let response: GenerateResponse = error::decode_body(raw)?;
        let text = answer_text(response)?;
        error::decode_body(text)
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Summarize the text of a scientific paper.
    pub async fn summarize(&self, paper_text: &str) -> Result<PaperSummary, Error> {
        self.generate_json(prompts::summarize_prompt(paper_text), prompts::summary_schema())
            .await
    }

    /// Write an inventory description from an item's identifying fields.
    pub async fn enhance_description(
        &self,
        req: &DescriptionRequest,
    ) -> Result<EnhancedDescription, Error> {
        self.generate_json(prompts::enhance_prompt(req), prompts::description_schema())
            .await
    }
}

/// Concatenate the text parts of the first candidate.
fn answer_text(response: GenerateResponse) -> Result<String, Error> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(Error::Schema(format!("prompt blocked: {reason}")));
    }
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| Error::Schema("model returned no candidates".into()))?;
    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "UNKNOWN".into());
        return Err(Error::Schema(format!("empty answer (finish reason {reason})")));
    }
    Ok(text)
}
