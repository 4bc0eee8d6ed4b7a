use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use server::routes::build_router;
use store::DocumentStore;

const BODY_LIMIT: usize = 1024 * 1024;

fn app() -> (Router, Arc<DocumentStore>) {
    let store = Arc::new(DocumentStore::new());
    (build_router(Arc::clone(&store), BODY_LIMIT), store)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Vec<u8>) {
    let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);
    let req = Request::builder().method(method).uri(uri).body(body).unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

fn json_of(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

#[tokio::test]
async fn status_is_plain_ok() {
    let (app, _) = app();
    let (status, body) = send(&app, Method::GET, "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn version_is_semver() {
    let (app, _) = app();
    let (status, body) = send(&app, Method::GET, "/version", None).await;
    assert_eq!(status, StatusCode::OK);
    let version = String::from_utf8(body).unwrap();
    let parts: Vec<&str> = version.split('.').collect();
    assert_eq!(parts.len(), 3, "{version}");
    assert!(parts.iter().all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit())));
}

#[tokio::test]
async fn put_get_keys_delete_scenario() {
    let (app, _) = app();

    let (status, body) = send(&app, Method::PUT, "/doc/a", Some(r#"{"x":1}"#)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());

    let (status, body) = send(&app, Method::GET, "/doc/a", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&body), json!({"x": 1}));

    let (status, body) = send(&app, Method::GET, "/keys", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&body), json!(["a"]));

    let (status, body) = send(&app, Method::GET, "/count", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&body), json!(1));

    let (status, body) = send(&app, Method::DELETE, "/doc/a", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());

    let (status, body) = send(&app, Method::GET, "/doc/a", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"null");
}

#[tokio::test]
async fn batch_put_then_get_all() {
    let (app, store) = app();
    let (status, _) = send(&app, Method::PUT, "/doc", Some(r#"{"a":1,"b":2}"#)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(store.count(), 2);

    let (status, body) = send(&app, Method::GET, "/doc", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_of(&body), json!({"a": 1, "b": 2}));
}

#[tokio::test]
async fn malformed_body_is_rejected_without_mutation() {
    let (app, store) = app();
    store.set("a", json!("original"));

    let (status, body) = send(&app, Method::PUT, "/doc/a", Some("not-json")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json_of(&body)["error"].is_string());
    assert_eq!(store.get("a").as_deref(), Some(&json!("original")));
}

#[tokio::test]
async fn batch_requires_object_with_non_empty_keys() {
    let (app, store) = app();

    for body in ["[1,2]", "\"a\"", "3", "null", "{not json"] {
        let (status, _) = send(&app, Method::PUT, "/doc", Some(body)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "body {body}");
    }

    let (status, _) = send(&app, Method::PUT, "/doc", Some(r#"{"ok":1,"":2}"#)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(store.is_empty());
}

#[tokio::test]
async fn any_json_value_is_a_document() {
    let (app, _) = app();
    for (key, doc) in [
        ("null", json!(null)),
        ("bool", json!(false)),
        ("num", json!(-1.5)),
        ("str", json!("hi")),
        ("arr", json!([1, [2], {"3": null}])),
    ] {
        let (status, _) = send(&app, Method::PUT, &format!("/doc/{key}"), Some(doc.to_string().as_str())).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, body) = send(&app, Method::GET, &format!("/doc/{key}"), None).await;
        assert_eq!(json_of(&body), doc);
    }
}

#[tokio::test]
async fn delete_missing_key_succeeds() {
    let (app, _) = app();
    let (status, _) = send(&app, Method::DELETE, "/doc/ghost", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn percent_encoded_keys_are_decoded() {
    let (app, store) = app();
    let (status, _) = send(&app, Method::PUT, "/doc/hello%20world", Some("1")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(store.contains_key("hello world"));
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let store = Arc::new(DocumentStore::new());
    let app = build_router(Arc::clone(&store), 16);
    let big = format!("\"{}\"", "x".repeat(64));
    let (status, _) = send(&app, Method::PUT, "/doc/big", Some(big.as_str())).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(store.is_empty());
}

#[tokio::test]
async fn metrics_exposes_operation_counters() {
    let (app, _) = app();
    send(&app, Method::PUT, "/doc/m", Some("1")).await;
    send(&app, Method::GET, "/doc/m", None).await;
    let (status, _) = send(&app, Method::PUT, "/doc/m", Some("{broken")).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(&app, Method::GET, "/metrics", None).await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains("docstore_operations_total"));
    assert!(text.contains("docstore_documents"));
    let rejected = text
        .lines()
        .find(|l| l.starts_with("docstore_rejected_bodies_total "))
        .expect("rejected bodies counter missing");
    let value: f64 = rejected.rsplit(' ').next().unwrap().parse().unwrap();
    assert!(value >= 1.0, "{rejected}");
}
