//! Notification enqueue, statistics and dispatcher lifecycle routes.

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use vigil_common::error::AppError;
use vigil_common::types::{DeliveryRecord, DispatchStats, Priority};

use crate::state::AppState;

/// Delivery records returned when no `limit` is given.
const DEFAULT_LOG_LIMIT: usize = 20;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/notifications", post(enqueue_notification))
        .route("/api/notifications/stats", get(get_stats))
        .route("/api/notifications/log", get(get_delivery_log))
        .route("/api/dispatcher/start", post(start_dispatcher))
        .route("/api/dispatcher/stop", post(stop_dispatcher))
}

#[derive(Debug, Deserialize)]
struct EnqueueRequest {
    recipient: String,
    message: String,
    priority: Priority,
    /// Channel name as registered with the dispatcher. Unrecognized names
    /// are accepted here and discarded at dispatch time.
    channel: String,
}

#[derive(Debug, Deserialize)]
struct LogQuery {
    limit: Option<usize>,
}

/// POST /api/notifications — Queue a notification for background delivery.
async fn enqueue_notification(
    State(state): State<AppState>,
    Json(payload): Json<EnqueueRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if payload.recipient.trim().is_empty() {
        return Err(AppError::Validation("recipient must not be empty".to_string()));
    }
    if payload.message.trim().is_empty() {
        return Err(AppError::Validation("message must not be empty".to_string()));
    }

    let id = state.dispatcher.enqueue(
        &payload.recipient,
        &payload.message,
        payload.priority,
        &payload.channel,
    );

    Ok(Json(json!({"id": id, "status": "queued"})))
}

/// GET /api/notifications/stats — Dispatcher counters and queue depths.
async fn get_stats(State(state): State<AppState>) -> Json<DispatchStats> {
    Json(state.dispatcher.get_statistics())
}

/// GET /api/notifications/log — Recent delivery attempts, newest first.
async fn get_delivery_log(
    State(state): State<AppState>,
    Query(query): Query<LogQuery>,
) -> Json<Vec<DeliveryRecord>> {
    let limit = query.limit.unwrap_or(DEFAULT_LOG_LIMIT);
    Json(state.dispatcher.recent_deliveries(limit))
}

/// POST /api/dispatcher/start — Launch the dispatch loop. Idempotent.
async fn start_dispatcher(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.dispatcher.start();
    Json(json!({"running": state.dispatcher.is_running()}))
}

/// POST /api/dispatcher/stop — Halt the dispatch loop, keeping queued work.
async fn stop_dispatcher(State(state): State<AppState>) -> Json<serde_json::Value> {
    state.dispatcher.stop().await;
    Json(json!({"running": state.dispatcher.is_running()}))
}
