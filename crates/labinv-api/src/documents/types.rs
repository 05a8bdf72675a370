// Wire and public types for the document store.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::value;
use crate::error::Error;

// ── Wire shapes ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawDocument {
    pub name: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
    #[serde(default)]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub update_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListResponse {
    #[serde(default)]
    pub documents: Vec<RawDocument>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// One element of the `runQuery` response stream (sent as a JSON array).
#[derive(Debug, Deserialize)]
pub(crate) struct QueryResult {
    #[serde(default)]
    pub document: Option<RawDocument>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WriteBody {
    pub fields: Map<String, Value>,
}

/// Body for `:runQuery` with a single equality filter.
pub(crate) fn equality_query(collection: &str, field: &str, value: &Value, limit: u32) -> Value {
    json!({
        "structuredQuery": {
            "from": [ { "collectionId": collection } ],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": field },
                    "op": "EQUAL",
                    "value": value::encode_value(value),
                }
            },
            "limit": limit,
        }
    })
}

// ── Public document ─────────────────────────────────────────────────

/// A decoded document: its id (last path segment), plain JSON fields,
/// and server timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub name: String,
    pub fields: Map<String, Value>,
    pub create_time: Option<DateTime<Utc>>,
    pub update_time: Option<DateTime<Utc>>,
}

impl Document {
    pub(crate) fn from_raw(raw: RawDocument) -> Result<Self, Error> {
        let id = raw
            .name
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_owned();
        Ok(Self {
            id,
            fields: value::decode_fields(&raw.fields)?,
            name: raw.name,
            create_time: raw.create_time,
            update_time: raw.update_time,
        })
    }

    /// Fields as one JSON object with `id` injected.
    pub fn to_json(&self) -> Value {
        let mut obj = self.fields.clone();
        obj.insert("id".into(), Value::String(self.id.clone()));
        Value::Object(obj)
    }

    /// Deserialize into a model type; `id` is available to the model.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_value(self.to_json()).map_err(|e| Error::Deserialization {
            message: format!("document {}: {e}", self.name),
            body: self.to_json().to_string(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn id_is_last_path_segment() {
        let raw: RawDocument = serde_json::from_value(json!({
            "name": "projects/p/databases/(default)/documents/vendors/v42",
            "fields": { "name": { "stringValue": "Mouser" } },
            "createTime": "2024-05-01T10:00:00Z"
        }))
        .unwrap();
        let doc = Document::from_raw(raw).unwrap();
        assert_eq!(doc.id, "v42");
        assert_eq!(doc.to_json(), json!({ "id": "v42", "name": "Mouser" }));
        assert!(doc.create_time.is_some());
    }
}
