//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint over a memory tier
//! in front of an in-memory SQLite tier.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::time::Duration;
use tiered_cache::{api::create_router, AppState, Cache, Config};
use tower::ServiceExt;

// == Helper Functions ==

fn test_config() -> Config {
    Config {
        database_path: ":memory:".to_string(),
        ..Config::default()
    }
}

async fn create_test_app() -> Router {
    let config = test_config();
    let cache = Cache::open(&config).await.unwrap();
    create_router(AppState::from_config(cache, &config))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn put_json(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

// == SET Endpoint Tests ==

#[tokio::test]
async fn test_set_endpoint_success() {
    let app = create_test_app().await;

    let response = app
        .oneshot(put_json("/set", r#"{"key":"test_key","value":"test_value"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert!(json["message"].as_str().unwrap().contains("test_key"));
    assert_eq!(json["ttl"].as_u64().unwrap(), 300);
}

#[tokio::test]
async fn test_set_endpoint_too_large() {
    let app = create_test_app().await;
    let big = "x".repeat(tiered_cache::cache::MAX_VALUE_SIZE);
    let body = serde_json::json!({ "key": "big", "value": big }).to_string();

    let response = app.clone().oneshot(put_json("/set", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    // the memory tier accepted the write before the SQLite tier refused it
    let response = app.oneshot(request("GET", "/get/big")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// == GET Endpoint Tests ==

#[tokio::test]
async fn test_get_endpoint_success() {
    let app = create_test_app().await;

    let set_response = app
        .clone()
        .oneshot(put_json(
            "/set",
            r#"{"key":"get_key","value":"get_value","ttl":60}"#,
        ))
        .await
        .unwrap();
    assert_eq!(set_response.status(), StatusCode::OK);

    let get_response = app.oneshot(request("GET", "/get/get_key")).await.unwrap();

    assert_eq!(get_response.status(), StatusCode::OK);
    let json = body_to_json(get_response.into_body()).await;
    assert_eq!(json["key"].as_str().unwrap(), "get_key");
    assert_eq!(json["value"].as_str().unwrap(), "get_value");
    assert_eq!(json["encoding"].as_str().unwrap(), "utf8");
    assert!(json["expires_at"].is_string());
}

#[tokio::test]
async fn test_binary_value_via_base64() {
    let app = create_test_app().await;

    let response = app
        .clone()
        .oneshot(put_json(
            "/set",
            r#"{"key":"bin","value":"/wBh","encoding":"base64"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(request("GET", "/get/bin")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["encoding"].as_str().unwrap(), "base64");
    assert_eq!(json["value"].as_str().unwrap(), "/wBh");
}

#[tokio::test]
async fn test_invalid_base64_rejected() {
    let app = create_test_app().await;

    let response = app
        .oneshot(put_json(
            "/set",
            r#"{"key":"bin","value":"%%%","encoding":"base64"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let app = create_test_app().await;

    let response = app
        .oneshot(request("GET", "/get/nonexistent_key"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("nonexistent_key"));
}

// == DELETE / FLUSH / PRUNE Endpoint Tests ==

#[tokio::test]
async fn test_delete_endpoint_success() {
    let app = create_test_app().await;

    app.clone()
        .oneshot(put_json("/set", r#"{"key":"delete_key","value":"v"}"#))
        .await
        .unwrap();

    let del_response = app
        .clone()
        .oneshot(request("DELETE", "/del/delete_key"))
        .await
        .unwrap();
    assert_eq!(del_response.status(), StatusCode::OK);

    let get_response = app.oneshot(request("GET", "/get/delete_key")).await.unwrap();
    assert_eq!(get_response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_missing_key_is_ok() {
    let app = create_test_app().await;

    let response = app
        .oneshot(request("DELETE", "/del/never_set"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_flush_endpoint() {
    let app = create_test_app().await;
    app.clone()
        .oneshot(put_json("/set", r#"{"key":"a","value":"1"}"#))
        .await
        .unwrap();

    let response = app.clone().oneshot(request("POST", "/flush")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(request("GET", "/get/a")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_prune_endpoint_counts_both_tiers() {
    let app = create_test_app().await;
    app.clone()
        .oneshot(put_json("/set", r#"{"key":"short","value":"v","ttl":1}"#))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(1100)).await;

    let response = app.oneshot(request("POST", "/prune")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["removed"].as_u64().unwrap(), 2);
}

// == STATS Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint() {
    let app = create_test_app().await;

    app.clone()
        .oneshot(put_json("/set", r#"{"key":"stats_key","value":"v"}"#))
        .await
        .unwrap();
    app.clone()
        .oneshot(request("GET", "/get/stats_key"))
        .await
        .unwrap();
    app.clone()
        .oneshot(request("GET", "/get/nonexistent"))
        .await
        .unwrap();

    let response = app.oneshot(request("GET", "/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["hits"].as_u64().unwrap(), 1);
    assert_eq!(json["misses"].as_u64().unwrap(), 1);
    assert_eq!(json["total_entries"].as_u64().unwrap(), 1);
    assert_eq!(json["refill"]["completed"].as_u64().unwrap(), 0);
}

// == HEALTH Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app().await;

    let response = app.oneshot(request("GET", "/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"].as_str().unwrap(), "healthy");
}

// == Error Handling Tests ==

#[tokio::test]
async fn test_invalid_json_request() {
    let app = create_test_app().await;

    let response = app.oneshot(put_json("/set", "not json")).await.unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_empty_key_request() {
    let app = create_test_app().await;

    let response = app
        .oneshot(put_json("/set", r#"{"key":"","value":"v"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ttl_expiration_via_api() {
    let app = create_test_app().await;

    app.clone()
        .oneshot(put_json("/set", r#"{"key":"ttl_key","value":"v","ttl":1}"#))
        .await
        .unwrap();

    let response = app.clone().oneshot(request("GET", "/get/ttl_key")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(1100)).await;

    let response = app.oneshot(request("GET", "/get/ttl_key")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
