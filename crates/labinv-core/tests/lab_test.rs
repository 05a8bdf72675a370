#![allow(clippy::unwrap_used)]
// Integration tests for `Lab` against mocked identity and document services.

use std::time::Duration;

use serde_json::json;
use tokio::sync::watch;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use labinv_core::{
    AuthCredentials, Command, CommandResult, CoreError, DeviceClass, Endpoints, EntityId,
    ItemLookup, Lab, LabConfig, NewItem, RouteDecision, SessionState, SessionStatus,
    TextGenerator,
};

const DOCS: &str = "/v1/projects/demo/databases/(default)/documents";
const DOC_NAME: &str = "projects/demo/databases/(default)/documents";

// ── Helpers ─────────────────────────────────────────────────────────

fn config(server: &MockServer) -> LabConfig {
    LabConfig {
        project_id: "demo".into(),
        api_key: "test-key".to_string().into(),
        endpoints: Endpoints {
            identity: Some(format!("{}/v1", server.uri())),
            token: Some(format!("{}/token-v1", server.uri())),
            documents: Some(server.uri()),
            generative: None,
            image: None,
        },
        timeout: Duration::from_secs(5),
        profile_poll_interval: Duration::ZERO,
        ..LabConfig::default()
    }
}

async fn setup() -> (MockServer, Lab) {
    let server = MockServer::start().await;
    let lab = Lab::new(config(&server)).unwrap();
    (server, lab)
}

fn creds() -> AuthCredentials {
    AuthCredentials {
        email: "ada@lab.test".into(),
        password: "hunter22".to_string().into(),
    }
}

fn password_ok(uid: &str) -> serde_json::Value {
    json!({
        "localId": uid,
        "email": "ada@lab.test",
        "idToken": "id-token-1",
        "refreshToken": "refresh-1",
        "expiresIn": "3600"
    })
}

async fn mount_sign_in(server: &MockServer, uid: &str) {
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(password_ok(uid)))
        .mount(server)
        .await;
}

fn item_doc(id: &str, name: &str, barcode: &str) -> serde_json::Value {
    json!({
        "name": format!("{DOC_NAME}/inventory/{id}"),
        "fields": {
            "name": { "stringValue": name },
            "type": { "stringValue": "Resistor" },
            "value": { "stringValue": "10k" },
            "quantity": { "integerValue": "100" },
            "unit": { "stringValue": "pcs" },
            "barcode": { "stringValue": barcode }
        }
    })
}

fn vendor_doc(id: &str, name: &str) -> serde_json::Value {
    json!({
        "name": format!("{DOC_NAME}/vendors/{id}"),
        "fields": { "name": { "stringValue": name } }
    })
}

fn type_doc(id: &str, name: &str) -> serde_json::Value {
    json!({
        "name": format!("{DOC_NAME}/inventoryItemTypes/{id}"),
        "fields": {
            "name": { "stringValue": name },
            "color": { "stringValue": "170 65% 65%" }
        }
    })
}

fn profile_doc(uid: &str, first: &str) -> serde_json::Value {
    json!({
        "name": format!("{DOC_NAME}/users/{uid}"),
        "fields": {
            "uid": { "stringValue": uid },
            "email": { "stringValue": "ada@lab.test" },
            "firstName": { "stringValue": first },
            "lastName": { "stringValue": "Lovelace" }
        }
    })
}

async fn mount_list(server: &MockServer, collection: &str, docs: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/{collection}")))
        .and(query_param("orderBy", "name"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "documents": docs })))
        .mount(server)
        .await;
}

async fn settle<T: Clone>(rx: &mut watch::Receiver<T>, f: impl FnMut(&T) -> bool) -> T {
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(f))
        .await
        .unwrap()
        .unwrap()
        .clone()
}

// ── Session lifecycle ───────────────────────────────────────────────

#[tokio::test]
async fn test_sign_in_publishes_identity() {
    let (server, lab) = setup().await;
    mount_sign_in(&server, "u1").await;

    let user = lab.sign_in(creds()).await.unwrap();

    assert_eq!(user.uid, "u1");
    assert_eq!(lab.identity().current().unwrap().uid, "u1");
    assert_eq!(lab.current_user().await.unwrap().email.as_deref(), Some("ada@lab.test"));
    lab.sign_out().await;
}

#[tokio::test]
async fn test_failed_sign_in_resolves_unauthenticated() {
    let (server, lab) = setup().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "INVALID_LOGIN_CREDENTIALS" }
        })))
        .mount(&server)
        .await;

    let resolver = lab.session_resolver();
    let err = lab.sign_in(creds()).await.unwrap_err();
    assert!(err.is_auth(), "unexpected: {err:?}");

    let mut rx = resolver.observe();
    let state = settle(&mut rx, |s| !s.is_loading()).await;
    assert_eq!(state.status(), SessionStatus::Unauthenticated);
    assert!(state.error().is_some());
    resolver.shutdown().await;
}

#[tokio::test]
async fn test_resolver_waits_for_profile_then_authenticates() {
    let (server, lab) = setup().await;
    mount_sign_in(&server, "u1").await;
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/users/u1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_doc("u1", "Ada")))
        .mount(&server)
        .await;

    let resolver = lab.session_resolver();
    lab.sign_in(creds()).await.unwrap();

    let mut rx = resolver.observe();
    let state = settle(&mut rx, SessionState::is_authenticated).await;
    assert_eq!(state.user().unwrap().uid, "u1");
    assert_eq!(state.profile().unwrap().first_name.as_deref(), Some("Ada"));

    lab.sign_out().await;
    let state = settle(&mut rx, |s| s.status() == SessionStatus::Unauthenticated).await;
    assert!(state.user().is_none());
    resolver.shutdown().await;
}

#[tokio::test]
async fn test_missing_profile_still_authenticates() {
    let (server, lab) = setup().await;
    mount_sign_in(&server, "u2").await;
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/users/u2")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": 404, "message": "Document not found", "status": "NOT_FOUND" }
        })))
        .mount(&server)
        .await;

    let resolver = lab.session_resolver();
    lab.sign_in(creds()).await.unwrap();

    let mut rx = resolver.observe();
    let state = settle(&mut rx, SessionState::is_authenticated).await;
    assert!(state.profile().is_none());
    resolver.shutdown().await;
    lab.sign_out().await;
}

#[tokio::test]
async fn test_sign_up_writes_profile_before_publishing() {
    let (server, lab) = setup().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signUp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(password_ok("u9")))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(format!("{DOCS}/users/u9")))
        .and(body_string_contains("ada@lab.test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_doc("u9", "")))
        .expect(1)
        .mount(&server)
        .await;

    let user = lab.sign_up(creds()).await.unwrap();

    assert_eq!(user.uid, "u9");
    assert_eq!(lab.identity().current().unwrap().uid, "u9");
    lab.sign_out().await;
}

// ── Data refresh ────────────────────────────────────────────────────

#[tokio::test]
async fn test_full_refresh_fills_store_sorted() {
    let (server, lab) = setup().await;
    mount_sign_in(&server, "u1").await;
    mount_list(
        &server,
        "inventory",
        json!([item_doc("i2", "zener diode", "B-2"), item_doc("i1", "Arduino", "B-1")]),
    )
    .await;
    mount_list(&server, "vendors", json!([vendor_doc("v1", "Mouser")])).await;
    mount_list(&server, "inventoryItemTypes", json!([type_doc("t1", "Sensor")])).await;

    lab.sign_in(creds()).await.unwrap();
    lab.full_refresh().await.unwrap();

    let names: Vec<String> = lab.items_snapshot().iter().map(|i| i.name.clone()).collect();
    assert_eq!(names, vec!["Arduino", "zener diode"]);
    assert_eq!(lab.vendors_snapshot().len(), 1);
    assert!(lab.store().item_type_names().contains(&"Sensor".to_string()));
    assert!(lab.store().last_full_refresh().is_some());

    lab.sign_out().await;
    assert!(lab.items_snapshot().is_empty());
}

#[tokio::test]
async fn test_refresh_requires_sign_in() {
    let (_server, lab) = setup().await;
    assert!(matches!(lab.full_refresh().await, Err(CoreError::NotSignedIn)));
}

#[tokio::test]
async fn test_lookup_by_barcode() {
    let (server, lab) = setup().await;
    mount_sign_in(&server, "u1").await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCS}:runQuery")))
        .and(body_string_contains("B-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "document": item_doc("i1", "Resistor 10k", "B-1") }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCS}:runQuery")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "readTime": "2024-05-01T10:00:00Z" }])))
        .mount(&server)
        .await;

    lab.sign_in(creds()).await.unwrap();

    let found = lab.find_by_barcode("B-1").await.unwrap().unwrap();
    assert_eq!(found.id, EntityId::from("i1"));
    assert!(lab.store().item_by_barcode("B-1").is_some());

    assert!(lab.find_by_barcode("NOPE").await.unwrap().is_none());
    lab.sign_out().await;
}

// ── Commands ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_execute_requires_sign_in() {
    let (_server, lab) = setup().await;
    let result = lab
        .execute(Command::DeleteItem {
            id: EntityId::from("i1"),
        })
        .await;
    assert!(matches!(result, Err(CoreError::NotSignedIn)));
}

#[tokio::test]
async fn test_create_item_generates_barcode() {
    let (server, lab) = setup().await;
    mount_sign_in(&server, "u1").await;
    Mock::given(method("POST"))
        .and(path(format!("{DOCS}/inventory")))
        .and(body_string_contains("createdAt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(item_doc(
            "new1",
            "Resistor 10k",
            "0b4e6f1a-2c3d-4e5f-8a9b-0c1d2e3f4a5b",
        )))
        .expect(1)
        .mount(&server)
        .await;

    lab.sign_in(creds()).await.unwrap();
    let result = lab
        .execute(Command::CreateItem(NewItem {
            name: "Resistor 10k".into(),
            item_type: "Resistor".into(),
            quantity: 100,
            ..NewItem::default()
        }))
        .await
        .unwrap();

    let CommandResult::Item(item) = result else {
        panic!("expected item, got {result:?}");
    };
    assert!(EntityId::from(item.barcode.unwrap()).as_uuid().is_some());
    assert_eq!(lab.store().item_count(), 1);
    lab.sign_out().await;
}

#[tokio::test]
async fn test_invalid_command_is_rejected_locally() {
    let (server, lab) = setup().await;
    mount_sign_in(&server, "u1").await;
    lab.sign_in(creds()).await.unwrap();

    let result = lab
        .execute(Command::CreateItem(NewItem {
            name: "R".into(),
            item_type: "Resistor".into(),
            ..NewItem::default()
        }))
        .await;
    assert!(matches!(result, Err(CoreError::ValidationFailed { .. })));

    let result = lab
        .execute(Command::CreateItemType {
            name: "resistor".into(),
        })
        .await;
    assert!(matches!(result, Err(CoreError::ValidationFailed { .. })));
    lab.sign_out().await;
}

#[tokio::test]
async fn test_submit_reports_failures() {
    let (server, lab) = setup().await;
    mount_sign_in(&server, "u1").await;
    Mock::given(method("DELETE"))
        .and(path(format!("{DOCS}/vendors/v1")))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": 403, "message": "Missing or insufficient permissions.", "status": "PERMISSION_DENIED" }
        })))
        .mount(&server)
        .await;

    lab.sign_in(creds()).await.unwrap();
    let mut failures = lab.write_failures();

    let pending = lab.submit(Command::DeleteVendor {
        id: EntityId::from("v1"),
    });
    assert!(pending.await.is_err());

    let failure = failures.recv().await.unwrap();
    assert_eq!(failure.action, "delete vendor");
    assert!(failure.to_string().starts_with("could not delete vendor"));
    lab.sign_out().await;
}

#[tokio::test]
async fn test_commands_fail_after_sign_out() {
    let (server, lab) = setup().await;
    mount_sign_in(&server, "u1").await;
    lab.sign_in(creds()).await.unwrap();
    lab.sign_out().await;

    let result = lab
        .execute(Command::DeleteItem {
            id: EntityId::from("i1"),
        })
        .await;
    assert!(matches!(result, Err(CoreError::NotSignedIn)));
}

// ── Optional services ───────────────────────────────────────────────

#[tokio::test]
async fn test_ai_and_upload_disabled_without_keys() {
    let (_server, lab) = setup().await;

    assert!(!lab.ai_enabled());
    assert!(!lab.image_upload_enabled());
    assert!(matches!(
        lab.summarize("paper").await,
        Err(CoreError::Config { .. })
    ));
    assert!(matches!(
        lab.upload_image(b"png").await,
        Err(CoreError::Config { .. })
    ));
}

// ── Routing ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_route_watcher_follows_sign_in() {
    let (server, lab) = setup().await;
    mount_sign_in(&server, "u1").await;
    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/users/u1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_doc("u1", "Ada")))
        .mount(&server)
        .await;

    let resolver = lab.session_resolver();
    let (_path_tx, path_rx) = watch::channel("/dashboard".to_string());
    let watcher = lab.route_watcher(resolver.observe(), path_rx);
    let mut decisions = watcher.observe();

    assert_eq!(lab.device().measure(390), DeviceClass::Mobile);
    lab.identity().publish(None);
    let decision = settle(&mut decisions, |d| *d != RouteDecision::ShowLoader).await;
    assert_eq!(decision, RouteDecision::RedirectTo("/".into()));

    lab.sign_in(creds()).await.unwrap();
    let decision = settle(&mut decisions, |d| *d == RouteDecision::RedirectTo("/scan".into())).await;
    assert_eq!(decision, RouteDecision::RedirectTo("/scan".into()));

    watcher.shutdown().await;
    resolver.shutdown().await;
    lab.sign_out().await;
}
