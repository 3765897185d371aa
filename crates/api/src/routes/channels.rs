//! Channel statistics and side-data routes.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use vigil_common::error::AppError;
use vigil_common::types::{CallRecord, ChannelStats, PushRecord};

use crate::state::AppState;

const DEFAULT_LIMIT: usize = 20;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/channels", get(list_channels))
        .route("/api/channels/{name}/stats", get(channel_stats))
        .route("/api/channels/push/inbox", get(push_inbox))
        .route("/api/channels/voice/calls", get(voice_calls))
}

#[derive(Debug, Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

/// GET /api/channels — Per-channel sent/failed counters.
async fn list_channels(State(state): State<AppState>) -> Json<BTreeMap<String, ChannelStats>> {
    Json(state.dispatcher.get_statistics().channels)
}

/// GET /api/channels/:name/stats — Counters for a single channel.
async fn channel_stats(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ChannelStats>, AppError> {
    let sender = state
        .dispatcher
        .sender(&name)
        .ok_or_else(|| AppError::NotFound(format!("Channel {} not found", name)))?;
    Ok(Json(sender.stats()))
}

/// GET /api/channels/push/inbox — App push inbox, newest first.
async fn push_inbox(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Json<Vec<PushRecord>> {
    Json(state.push.inbox(query.limit.unwrap_or(DEFAULT_LIMIT)))
}

/// GET /api/channels/voice/calls — Synthetic call log, newest first.
async fn voice_calls(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Json<Vec<CallRecord>> {
    Json(state.voice.recent_calls(query.limit.unwrap_or(DEFAULT_LIMIT)))
}
