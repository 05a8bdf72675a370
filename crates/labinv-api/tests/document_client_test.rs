#![allow(clippy::unwrap_used)]
// Integration tests for `DocumentClient` using wiremock.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use labinv_api::{DocumentClient, Error, TokenSlot, TransportConfig};

const DOCS: &str = "/v1/projects/demo/databases/(default)/documents";

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, DocumentClient, TokenSlot) {
    let server = MockServer::start().await;
    let token = TokenSlot::new();
    token.set("id-token".to_string().into());
    let client = DocumentClient::with_endpoint(
        &server.uri(),
        "demo",
        token.clone(),
        &TransportConfig::default(),
    )
    .unwrap();
    (server, client, token)
}

fn item_doc(id: &str, name: &str, barcode: &str) -> serde_json::Value {
    json!({
        "name": format!("projects/demo/databases/(default)/documents/inventory/{id}"),
        "fields": {
            "name": { "stringValue": name },
            "type": { "stringValue": "Resistor" },
            "value": { "stringValue": "10k" },
            "quantity": { "integerValue": "100" },
            "barcode": { "stringValue": barcode }
        },
        "createTime": "2024-05-01T10:00:00.000000Z",
        "updateTime": "2024-05-01T10:00:00.000000Z"
    })
}

// ── Reads ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_sends_bearer_and_decodes() {
    let (server, client, _token) = setup().await;

    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/inventory/i1")))
        .and(header("authorization", "Bearer id-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(item_doc("i1", "Resistor 10k", "B-1")))
        .mount(&server)
        .await;

    let doc = client.get("inventory", "i1").await.unwrap().unwrap();

    assert_eq!(doc.id, "i1");
    assert_eq!(doc.fields["quantity"], json!(100));
    assert_eq!(doc.to_json()["barcode"], json!("B-1"));
}

#[tokio::test]
async fn test_get_missing_returns_none() {
    let (server, client, _token) = setup().await;

    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/users/ghost")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": 404, "message": "Document not found", "status": "NOT_FOUND" }
        })))
        .mount(&server)
        .await;

    assert!(client.get("users", "ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_follows_page_tokens() {
    let (server, client, _token) = setup().await;

    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/inventory")))
        .and(query_param("orderBy", "name"))
        .and(query_param("pageToken", "p2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [ item_doc("i2", "Zener", "B-2") ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/inventory")))
        .and(query_param("orderBy", "name"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [ item_doc("i1", "Arduino", "B-1") ],
            "nextPageToken": "p2"
        })))
        .mount(&server)
        .await;

    let docs = client.list("inventory", Some("name")).await.unwrap();

    let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["i1", "i2"]);
}

#[tokio::test]
async fn test_query_equal_builds_field_filter() {
    let (server, client, _token) = setup().await;

    Mock::given(method("POST"))
        .and(path(format!("{DOCS}:runQuery")))
        .and(body_json(json!({
            "structuredQuery": {
                "from": [ { "collectionId": "inventory" } ],
                "where": { "fieldFilter": {
                    "field": { "fieldPath": "barcode" },
                    "op": "EQUAL",
                    "value": { "stringValue": "B-1" }
                }},
                "limit": 1
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "document": item_doc("i1", "Resistor 10k", "B-1"), "readTime": "2024-05-01T10:00:00Z" }
        ])))
        .mount(&server)
        .await;

    let docs = client
        .query_equal("inventory", "barcode", &json!("B-1"), 1)
        .await
        .unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, "i1");
}

#[tokio::test]
async fn test_query_equal_no_match() {
    let (server, client, _token) = setup().await;

    Mock::given(method("POST"))
        .and(path(format!("{DOCS}:runQuery")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([ { "readTime": "2024-05-01T10:00:00Z" } ])),
        )
        .mount(&server)
        .await;

    let docs = client
        .query_equal("inventory", "barcode", &json!("nope"), 1)
        .await
        .unwrap();
    assert!(docs.is_empty());
}

// ── Writes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_update_sends_field_mask() {
    let (server, client, _token) = setup().await;

    Mock::given(method("PATCH"))
        .and(path(format!("{DOCS}/vendors/v1")))
        .and(query_param("updateMask.fieldPaths", "phone"))
        .and(query_param("currentDocument.exists", "true"))
        .and(body_json(json!({ "fields": { "phone": { "stringValue": "555-0100" } } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/demo/databases/(default)/documents/vendors/v1",
            "fields": {
                "name": { "stringValue": "Mouser" },
                "phone": { "stringValue": "555-0100" }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let data = json!({ "phone": "555-0100" });
    let doc = client
        .update("vendors", "v1", data.as_object().unwrap())
        .await
        .unwrap();
    assert_eq!(doc.fields["name"], json!("Mouser"));
}

#[tokio::test]
async fn test_create_with_explicit_id() {
    let (server, client, _token) = setup().await;

    Mock::given(method("POST"))
        .and(path(format!("{DOCS}/users")))
        .and(query_param("documentId", "u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/demo/databases/(default)/documents/users/u1",
            "fields": { "uid": { "stringValue": "u1" } }
        })))
        .mount(&server)
        .await;

    let data = json!({ "uid": "u1" });
    let doc = client
        .create("users", Some("u1"), data.as_object().unwrap())
        .await
        .unwrap();
    assert_eq!(doc.id, "u1");
}

#[tokio::test]
async fn test_expired_token_maps_to_session_expired() {
    let (server, client, _token) = setup().await;

    Mock::given(method("DELETE"))
        .and(path(format!("{DOCS}/inventory/i1")))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "code": 401, "message": "Missing or invalid authentication.", "status": "UNAUTHENTICATED" }
        })))
        .mount(&server)
        .await;

    let result = client.delete("inventory", "i1").await;
    assert!(matches!(result, Err(Error::SessionExpired)));
}

#[tokio::test]
async fn test_permission_denied_is_service_error() {
    let (server, client, token) = setup().await;
    token.clear();

    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/vendors")))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": 403, "message": "Missing or insufficient permissions.", "status": "PERMISSION_DENIED" }
        })))
        .mount(&server)
        .await;

    let err = client.list("vendors", None).await.unwrap_err();
    assert_eq!(err.api_error_code(), Some("PERMISSION_DENIED"));
}
