//! Integration Tests for Admin API Endpoints
//!
//! Tests full request/response cycle for each control endpoint.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use proxy_cache::{api::create_router, AppState, Config};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

fn test_config() -> Config {
    Config {
        proxy_port: 0,
        ..Config::default()
    }
}

fn create_test_app() -> (Router, AppState) {
    let state = AppState::from_config(&test_config());
    (create_router(state.clone()), state)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn add(app: &Router, key: &str, value: &str) {
    let body = serde_json::json!({ "key": key, "value": value }).to_string();
    let response = app
        .clone()
        .oneshot(json_request("PUT", "/cache", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// == Cache Endpoints ==

#[tokio::test]
async fn test_add_then_list_entries() {
    let (app, _state) = create_test_app();
    add(&app, "GET /a", "RESP_A").await;
    add(&app, "GET /b", "RESP_B").await;

    let response = app
        .oneshot(empty_request("GET", "/cache/entries"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["lines"], serde_json::json!(["1. GET /a", "2. GET /b"]));
    assert_eq!(json["entries"][1]["position"], 2);
}

#[tokio::test]
async fn test_add_rejects_empty_key() {
    let (app, _state) = create_test_app();

    let response = app
        .oneshot(json_request("PUT", "/cache", r#"{"key":"","value":"v"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn test_delete_out_of_range_reports_valid_range() {
    let (app, state) = create_test_app();
    add(&app, "GET /a", "A").await;
    add(&app, "GET /b", "B").await;

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", "/cache/entries/5"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("between 1 and 2"));
    assert_eq!(state.service.stats().await.total_entries, 2);
}

#[tokio::test]
async fn test_delete_valid_position() {
    let (app, _state) = create_test_app();
    add(&app, "GET /a", "A").await;
    add(&app, "GET /b", "B").await;

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", "/cache/entries/1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["key"], "GET /a");

    let response = app
        .oneshot(empty_request("GET", "/cache/keys"))
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["keys"], serde_json::json!(["GET /b"]));
}

#[tokio::test]
async fn test_search_by_fragment() {
    let (app, _state) = create_test_app();
    add(&app, "GET /ab", "1").await;
    add(&app, "GET /cd", "2").await;

    let response = app
        .clone()
        .oneshot(empty_request("GET", "/cache/search?fragment=/a"))
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["hits"], 1);
    assert_eq!(json["matches"][0]["key"], "GET /ab");

    let response = app
        .oneshot(empty_request("GET", "/cache/search?fragment=/zz"))
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["hits"], 0);
}

#[tokio::test]
async fn test_search_requires_a_parameter() {
    let (app, _state) = create_test_app();

    let response = app
        .oneshot(empty_request("GET", "/cache/search"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_clear_endpoint() {
    let (app, _state) = create_test_app();
    add(&app, "GET /a", "A").await;

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", "/cache"))
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["removed"], 1);

    let response = app.oneshot(empty_request("GET", "/stats")).await.unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["total_entries"], 0);
    assert_eq!(json["total_bytes"], 0);
}

// == Eviction Endpoints ==

#[tokio::test]
async fn test_schedule_explicit_and_default_eviction() {
    let (app, _state) = create_test_app();
    add(&app, "GET /a", "A").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/cache/eviction",
            r#"{"delay":2,"unit":"hours"}"#,
        ))
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["armed"], true);
    assert_eq!(json["delay_secs"], 7200);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/cache/eviction", "{}"))
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["delay_secs"], 72 * 3600);
}

#[tokio::test]
async fn test_schedule_rejects_oversized_delay_and_keeps_timer() {
    let (app, state) = create_test_app();
    add(&app, "GET /a", "A").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/cache/eviction",
            r#"{"delay":18446744073709551615}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("365 days"));

    let pending = state.service.pending_eviction().await.unwrap();
    assert_eq!(pending.delay.as_secs(), 72 * 3600);
    assert_eq!(state.service.stats().await.total_entries, 1);
}

#[tokio::test]
async fn test_run_eviction_twice() {
    let (app, state) = create_test_app();
    add(&app, "GET /a", "A").await;

    let response = app
        .clone()
        .oneshot(empty_request("POST", "/cache/eviction/run"))
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert!(json["message"].as_str().unwrap().starts_with("Light cache"));

    let response = app
        .clone()
        .oneshot(empty_request("POST", "/cache/eviction/run"))
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert!(json["message"].as_str().unwrap().contains("already empty"));

    let response = app
        .oneshot(empty_request("GET", "/cache/eviction"))
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["armed"], false);
    assert_eq!(state.service.stats().await.auto_clears, 1);
}

// == Server Endpoints ==

#[tokio::test]
async fn test_server_lifecycle_endpoints() {
    let (app, _state) = create_test_app();

    let response = app
        .clone()
        .oneshot(empty_request("POST", "/server/start"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["state"], "running");

    let response = app
        .clone()
        .oneshot(empty_request("POST", "/server/stop"))
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["state"], "stopped");

    let response = app
        .oneshot(empty_request("GET", "/events"))
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    let messages: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["message"].as_str().unwrap())
        .collect();
    assert!(messages[0].starts_with("Server started on port"));
    assert_eq!(messages[1], "Server stopped.");
}

#[tokio::test]
async fn test_set_backend_endpoint() {
    let (app, _state) = create_test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/config/backend",
            r#"{"host":"10.0.0.9","port":8081}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/config/backend",
            r#"{"host":"10.0.0.9","port":0}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(empty_request("GET", "/server/status"))
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["backend"]["host"], "10.0.0.9");
    assert_eq!(json["backend"]["port"], 8081);
}

// == Live Server ==

#[tokio::test]
async fn test_live_admin_api_over_http() {
    let state = AppState::from_config(&test_config());
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::new();
    let base = format!("http://{}", addr);

    let response = client
        .put(format!("{}/cache", base))
        .json(&serde_json::json!({ "key": "GET /live", "value": "LIVE" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let json: Value = client
        .get(format!("{}/cache/search?key=GET%20/live", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(json["matches"][0]["value"], "LIVE");

    let health: Value = client
        .get(format!("{}/health", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    tokio_test::assert_ok!(chrono::DateTime::parse_from_rfc3339(
        health["timestamp"].as_str().unwrap()
    ));

    server.abort();
}
