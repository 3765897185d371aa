//! Integration tests for API routes.
//!
//! Uses `tower::ServiceExt` to drive Axum routes without a real HTTP
//! server. The whole notification stack is in-process, so these run with
//! plain `cargo test -p vigil-api`.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use vigil_api::routes::create_router;
use vigil_api::state::AppState;
use vigil_common::config::AppConfig;

// ============================================================
// Helpers
// ============================================================

/// Millisecond-scale config so dispatch settles within a test timeout.
fn test_config() -> AppConfig {
    AppConfig {
        api_port: 0,
        dispatch_cycle_ms: 15,
        dispatch_batch_size: 5,
        dispatch_retry_interval_secs: 300,
        dispatch_max_retries: 3,
        dispatch_log_capacity: 100,
        sms_delay_ms: 0,
        voice_delay_ms: 0,
        push_delay_ms: 0,
        simulator_interval_secs: 30,
    }
}

fn build_test_state() -> AppState {
    AppState::new(test_config())
}

/// Poll `predicate` every few milliseconds until it holds or `timeout`
/// elapses.
async fn wait_until<F: Fn() -> bool>(timeout: Duration, predicate: F) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if predicate() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    predicate()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

// ============================================================
// Health and channel listing
// ============================================================

#[tokio::test]
async fn test_health_endpoint() {
    let state = build_test_state();
    let app = create_router(state);

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "vigil-api");
    assert_eq!(json["dispatcher_running"], false);
}

#[tokio::test]
async fn test_channel_listing_covers_standard_senders() {
    let state = build_test_state();
    let app = create_router(state);

    let response = app.oneshot(get("/api/channels")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let names: Vec<&String> = json.as_object().unwrap().keys().collect();
    assert_eq!(names, vec!["app", "sms", "voice"]);
}

#[tokio::test]
async fn test_unknown_channel_stats_is_404() {
    let state = build_test_state();
    let app = create_router(state);

    let response = app.oneshot(get("/api/channels/pager/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("pager"));
}

// ============================================================
// Notification enqueue and validation
// ============================================================

#[tokio::test]
async fn test_enqueue_returns_id_and_lands_in_queue() {
    let state = build_test_state();

    let app = create_router(state.clone());
    let response = app
        .oneshot(post_json(
            "/api/notifications",
            &json!({
                "recipient": "13800000000",
                "message": "fall detected",
                "priority": "high",
                "channel": "sms"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["id"], 1);
    assert_eq!(json["status"], "queued");

    // Dispatcher was never started, so the notification is still pending.
    let app = create_router(state);
    let response = app.oneshot(get("/api/notifications/stats")).await.unwrap();
    let stats = body_json(response).await;
    assert_eq!(stats["pending_high"], 1);
    assert_eq!(stats["total_sent"], 0);
}

#[tokio::test]
async fn test_enqueue_rejects_empty_fields() {
    let state = build_test_state();

    let app = create_router(state.clone());
    let response = app
        .oneshot(post_json(
            "/api/notifications",
            &json!({
                "recipient": "",
                "message": "fall detected",
                "priority": "high",
                "channel": "sms"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = create_router(state);
    let response = app
        .oneshot(post_json(
            "/api/notifications",
            &json!({
                "recipient": "13800000000",
                "message": "   ",
                "priority": "low",
                "channel": "app"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_enqueue_rejects_malformed_priority() {
    let state = build_test_state();
    let app = create_router(state);

    let response = app
        .oneshot(post_json(
            "/api/notifications",
            &json!({
                "recipient": "13800000000",
                "message": "fall detected",
                "priority": "urgent",
                "channel": "sms"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_enqueue_accepts_unknown_channel_name() {
    let state = build_test_state();
    let app = create_router(state.clone());

    // "pager" has no registered sender; the core discards it at dispatch
    // time, so the API accepts the request as queued.
    let response = app
        .oneshot(post_json(
            "/api/notifications",
            &json!({
                "recipient": "13800000000",
                "message": "fall detected",
                "priority": "low",
                "channel": "pager"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// ============================================================
// Dispatcher lifecycle
// ============================================================

#[tokio::test]
async fn test_dispatcher_start_stop_roundtrip() {
    let state = build_test_state();

    let app = create_router(state.clone());
    let response = app.oneshot(post_empty("/api/dispatcher/start")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["running"], true);

    // Starting again is a no-op.
    let app = create_router(state.clone());
    let response = app.oneshot(post_empty("/api/dispatcher/start")).await.unwrap();
    assert_eq!(body_json(response).await["running"], true);

    let app = create_router(state.clone());
    let response = app.oneshot(post_empty("/api/dispatcher/stop")).await.unwrap();
    assert_eq!(body_json(response).await["running"], false);

    let app = create_router(state);
    let response = app.oneshot(post_empty("/api/dispatcher/stop")).await.unwrap();
    assert_eq!(body_json(response).await["running"], false);
}

// ============================================================
// Alert intake and assessment
// ============================================================

#[tokio::test]
async fn test_alert_report_fans_out_to_three_channels() {
    let state = build_test_state();

    // Riverbank plus rainstorm scores 3+ at any hour, so the assessed
    // level is high regardless of when the test runs.
    let app = create_router(state.clone());
    let response = app
        .oneshot(post_json(
            "/api/alerts",
            &json!({
                "user_name": "Wang Fang",
                "phone": "13800000000",
                "emergency_contact": "13911112222",
                "kind": "fall",
                "description": "fall detected by wearable",
                "lat": 39.9100,
                "lng": 116.4000,
                "weather": "rainstorm"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["risk"]["level"], "high");
    assert_eq!(json["notification_ids"].as_array().unwrap().len(), 3);
    assert!(json["alert"]["id"].as_str().is_some());

    // All three queued at high priority; nothing dispatched yet.
    let app = create_router(state);
    let response = app.oneshot(get("/api/notifications/stats")).await.unwrap();
    let stats = body_json(response).await;
    assert_eq!(stats["pending_high"], 3);
}

#[tokio::test]
async fn test_alert_report_requires_contact_details() {
    let state = build_test_state();

    let app = create_router(state.clone());
    let response = app
        .oneshot(post_json(
            "/api/alerts",
            &json!({
                "user_name": "",
                "phone": "13800000000",
                "emergency_contact": "13911112222",
                "kind": "fall",
                "description": "fall detected",
                "lat": 39.9100,
                "lng": 116.4000
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = create_router(state);
    let response = app
        .oneshot(post_json(
            "/api/alerts",
            &json!({
                "user_name": "Wang Fang",
                "phone": "13800000000",
                "emergency_contact": "",
                "kind": "fall",
                "description": "fall detected",
                "lat": 39.9100,
                "lng": 116.4000
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_assess_endpoint_scores_the_scene() {
    let state = build_test_state();

    // Calm afternoon far from any waterway.
    let app = create_router(state.clone());
    let response = app
        .oneshot(post_json(
            "/api/alerts/assess",
            &json!({
                "lat": 40.5000,
                "lng": 117.0000,
                "weather": "clear",
                "at": "2024-03-01T14:00:00Z"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["level"], "low");
    assert_eq!(json["score"], 0);

    // Night rainstorm on the riverbank.
    let app = create_router(state);
    let response = app
        .oneshot(post_json(
            "/api/alerts/assess",
            &json!({
                "lat": 39.9100,
                "lng": 116.4000,
                "weather": "rainstorm",
                "at": "2024-03-01T23:30:00Z"
            }),
        ))
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["level"], "high");
    assert_eq!(json["score"], 4);
    assert_eq!(json["factors"].as_array().unwrap().len(), 3);
}

// ============================================================
// End-to-end delivery through the HTTP surface
// ============================================================

#[tokio::test]
async fn test_alert_delivery_reaches_calls_and_inbox() {
    let state = build_test_state();

    let app = create_router(state.clone());
    let response = app.oneshot(post_empty("/api/dispatcher/start")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let app = create_router(state.clone());
    let response = app
        .oneshot(post_json(
            "/api/alerts",
            &json!({
                "user_name": "Wang Fang",
                "phone": "13800000000",
                "emergency_contact": "13911112222",
                "kind": "medical",
                "description": "chest pain reported",
                "lat": 39.9100,
                "lng": 116.4000,
                "weather": "rainstorm"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let dispatcher = state.dispatcher.clone();
    assert!(
        wait_until(Duration::from_secs(2), || {
            dispatcher.get_statistics().total_sent == 3
        })
        .await,
        "voice, sms and app deliveries should all settle"
    );

    let app = create_router(state.clone());
    let response = app.oneshot(get("/api/channels/voice/calls")).await.unwrap();
    let calls = body_json(response).await;
    let calls = calls.as_array().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0]["recipient"], "13911112222");
    assert_eq!(calls[0]["duration_secs"], 30);
    assert_eq!(calls[0]["status"], "connected");

    let app = create_router(state.clone());
    let response = app.oneshot(get("/api/channels/push/inbox")).await.unwrap();
    let inbox = body_json(response).await;
    let inbox = inbox.as_array().unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0]["read"], false);
    assert_eq!(inbox[0]["title"], "Emergency notice");

    let app = create_router(state.clone());
    let response = app
        .oneshot(get("/api/notifications/log?limit=2"))
        .await
        .unwrap();
    let log = body_json(response).await;
    assert_eq!(log.as_array().unwrap().len(), 2);

    let app = create_router(state);
    app.oneshot(post_empty("/api/dispatcher/stop")).await.unwrap();
}
