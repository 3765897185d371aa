//! Distress alert intake and risk assessment routes.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vigil_common::error::AppError;
use vigil_common::types::{
    AlertKind, DistressAlert, GeoPoint, RiskAssessment, WeatherCondition,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/alerts", post(report_alert))
        .route("/api/alerts/assess", post(assess_risk))
}

#[derive(Debug, Deserialize)]
struct ReportAlertRequest {
    user_name: String,
    phone: String,
    emergency_contact: String,
    kind: AlertKind,
    description: String,
    lat: f64,
    lng: f64,
    weather: Option<WeatherCondition>,
}

#[derive(Debug, Serialize)]
struct ReportAlertResponse {
    alert: DistressAlert,
    risk: RiskAssessment,
    notification_ids: Vec<u64>,
}

#[derive(Debug, Deserialize)]
struct AssessRequest {
    lat: f64,
    lng: f64,
    weather: WeatherCondition,
    /// Assessment time; defaults to now. Lets callers probe the night rule.
    at: Option<DateTime<Utc>>,
}

/// POST /api/alerts — Report a distress alert.
///
/// Assesses the scene, plans the escalation and queues every resulting
/// notification. The response carries the stored alert, the assessment and
/// the queued notification ids.
async fn report_alert(
    State(state): State<AppState>,
    Json(payload): Json<ReportAlertRequest>,
) -> Result<Json<ReportAlertResponse>, AppError> {
    if payload.user_name.trim().is_empty() {
        return Err(AppError::Validation("user_name must not be empty".to_string()));
    }
    if payload.emergency_contact.trim().is_empty() {
        return Err(AppError::Validation(
            "emergency_contact must not be empty".to_string(),
        ));
    }

    let alert = DistressAlert {
        id: Uuid::new_v4(),
        user_name: payload.user_name,
        phone: payload.phone,
        emergency_contact: payload.emergency_contact,
        location: GeoPoint {
            lat: payload.lat,
            lng: payload.lng,
        },
        kind: payload.kind,
        description: payload.description,
        reported_at: Utc::now(),
    };

    let weather = payload.weather.unwrap_or(WeatherCondition::Clear);
    let risk = state.assessor.assess(alert.location, Utc::now(), weather);
    let requests = state.policy.plan(&alert, &risk);

    let notification_ids: Vec<u64> = requests
        .iter()
        .map(|request| {
            state.dispatcher.enqueue(
                &request.recipient,
                &request.message,
                request.priority,
                request.channel.name(),
            )
        })
        .collect();

    tracing::info!(
        alert_id = %alert.id,
        kind = %alert.kind,
        risk = %risk.level,
        notifications = notification_ids.len(),
        "Distress alert escalated"
    );

    Ok(Json(ReportAlertResponse {
        alert,
        risk,
        notification_ids,
    }))
}

/// POST /api/alerts/assess — Standalone risk assessment, no dispatch.
async fn assess_risk(
    State(state): State<AppState>,
    Json(payload): Json<AssessRequest>,
) -> Json<RiskAssessment> {
    let at = payload.at.unwrap_or_else(Utc::now);
    let location = GeoPoint {
        lat: payload.lat,
        lng: payload.lng,
    };
    Json(state.assessor.assess(location, at, payload.weather))
}
