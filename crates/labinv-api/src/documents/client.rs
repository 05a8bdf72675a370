// Async client for the hosted document store (Firestore REST shape).
//
// Base path: v1/projects/{project}/databases/(default)/documents/
// Auth: `Authorization: Bearer <id token>` from the shared TokenSlot.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use super::types::{self, Document, ListResponse, QueryResult, RawDocument, WriteBody};
use super::value;
use crate::auth::TokenSlot;
use crate::error::{self, Error};
use crate::transport::{self, TransportConfig};

pub const DEFAULT_DOCUMENTS_URL: &str = "https://firestore.googleapis.com/";

const PAGE_SIZE: u32 = 300;

/// Raw CRUD client over one project's default database.
///
/// Documents go in and come out as plain JSON objects; the typed-value
/// encoding is handled internally.
pub struct DocumentClient {
    http: reqwest::Client,
    base_url: Url,
    token: TokenSlot,
    transport: TransportConfig,
}

impl DocumentClient {
    // ── Constructors ─────────────────────────────────────────────────

    pub fn new(
        project_id: &str,
        token: TokenSlot,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        Self::with_endpoint(DEFAULT_DOCUMENTS_URL, project_id, token, transport)
    }

    /// Client against an explicit service root (emulators, tests).
    pub fn with_endpoint(
        root: &str,
        project_id: &str,
        token: TokenSlot,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        if project_id.is_empty() {
            return Err(Error::NotConfigured("Project id is not configured.".into()));
        }
        let root = transport::normalize_base(root)?;
        let base_url = root.join(&format!(
            "v1/projects/{project_id}/databases/(default)/documents/"
        ))?;
        Ok(Self {
            http: transport.build_client()?,
            base_url,
            token,
            transport: transport.clone(),
        })
    }

    // ── URL builders ─────────────────────────────────────────────────

    fn collection_url(&self, collection: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(collection)?)
    }

    fn document_url(&self, collection: &str, id: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(&format!("{collection}/{id}"))?)
    }

    fn query_url(&self) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}:runQuery"))?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token.bearer() {
            Some(bearer) => builder.header(reqwest::header::AUTHORIZATION, bearer),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: reqwest::RequestBuilder) -> Result<T, Error> {
        let resp = self
            .authorized(builder)
            .send()
            .await
            .map_err(|e| self.transport.classify(e))?;
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;
        if status.is_success() {
            error::decode_body(body)
        } else if status == reqwest::StatusCode::UNAUTHORIZED {
            Err(Error::SessionExpired)
        } else {
            Err(error::service_error(status, body))
        }
    }

    async fn get_raw<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        debug!("GET {} params={params:?}", url.path());
        self.send(self.http.get(url).query(params)).await
    }

    async fn post_raw<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        params: &[(&str, String)],
        body: &B,
    ) -> Result<T, Error> {
        debug!("POST {}", url.path());
        self.send(self.http.post(url).query(params).json(body))
            .await
    }

    async fn patch_raw<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        params: &[(&str, String)],
        body: &B,
    ) -> Result<T, Error> {
        debug!("PATCH {} params={params:?}", url.path());
        self.send(self.http.patch(url).query(params).json(body))
            .await
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Fetch one document; `Ok(None)` when it does not exist.
    pub async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, Error> {
        let url = self.document_url(collection, id)?;
        match self.get_raw::<RawDocument>(url, &[]).await {
            Ok(raw) => Document::from_raw(raw).map(Some),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// List a whole collection, optionally ordered by one field ascending.
    ///
    /// Follows `nextPageToken` until the collection is exhausted.
    pub async fn list(
        &self,
        collection: &str,
        order_by: Option<&str>,
    ) -> Result<Vec<Document>, Error> {
        let url = self.collection_url(collection)?;
        let mut all = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params = vec![("pageSize", PAGE_SIZE.to_string())];
            if let Some(field) = order_by {
                params.push(("orderBy", field.to_owned()));
            }
            if let Some(token) = page_token.take() {
                params.push(("pageToken", token));
            }

            let page: ListResponse = self.get_raw(url.clone(), &params).await?;
            for raw in page.documents {
                all.push(Document::from_raw(raw)?);
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        Ok(all)
    }

    /// Documents whose `field` equals `value`, at most `limit` of them.
    pub async fn query_equal(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
        limit: u32,
    ) -> Result<Vec<Document>, Error> {
        let url = self.query_url()?;
        let body = types::equality_query(collection, field, value, limit);
        let results: Vec<QueryResult> = self.post_raw(url, &[], &body).await?;
        results
            .into_iter()
            .filter_map(|r| r.document)
            .map(Document::from_raw)
            .collect()
    }

    /// Create a document. With `id: None` the server assigns one.
    pub async fn create(
        &self,
        collection: &str,
        id: Option<&str>,
        data: &Map<String, Value>,
    ) -> Result<Document, Error> {
        let url = self.collection_url(collection)?;
        let params: Vec<(&str, String)> = id
            .map(|id| vec![("documentId", id.to_owned())])
            .unwrap_or_default();
        let body = WriteBody {
            fields: value::encode_fields(data),
        };
        let raw: RawDocument = self.post_raw(url, &params, &body).await?;
        Document::from_raw(raw)
    }

    /// Write the whole document, creating it if absent.
    pub async fn set(
        &self,
        collection: &str,
        id: &str,
        data: &Map<String, Value>,
    ) -> Result<Document, Error> {
        let url = self.document_url(collection, id)?;
        let body = WriteBody {
            fields: value::encode_fields(data),
        };
        let raw: RawDocument = self.patch_raw(url, &[], &body).await?;
        Document::from_raw(raw)
    }

    /// Merge `data` into an existing document.
    ///
    /// Only the keys present in `data` are touched. Fails with a 404
    /// service error when the document does not exist.
    pub async fn update(
        &self,
        collection: &str,
        id: &str,
        data: &Map<String, Value>,
    ) -> Result<Document, Error> {
        let url = self.document_url(collection, id)?;
        let mut params: Vec<(&str, String)> = data
            .keys()
            .map(|k| ("updateMask.fieldPaths", k.clone()))
            .collect();
        params.push(("currentDocument.exists", "true".into()));
        let body = WriteBody {
            fields: value::encode_fields(data),
        };
        let raw: RawDocument = self.patch_raw(url, &params, &body).await?;
        Document::from_raw(raw)
    }

    /// Delete a document. Deleting a missing document succeeds.
    pub async fn delete(&self, collection: &str, id: &str) -> Result<(), Error> {
        let url = self.document_url(collection, id)?;
        debug!("DELETE {}", url.path());
        let _: Value = self.send(self.http.delete(url)).await?;
        Ok(())
    }
}
