//! Liveness and status endpoints.
//!
//! `/status` reports uptime and the predictor's effective settings. It never
//! includes the API key or the base URL itself, only whether each is set.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use super::AdvisorState;

/// `GET /healthz`: always returns 200 OK with `{"status": "ok"}`.
///
/// No dependencies and never blocks; safe as a container liveness probe.
pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

/// `GET /status`: uptime, retained traffic and predictor settings.
///
/// Example response:
/// ```json
/// {
///   "status": "ok",
///   "uptime_secs": 3600,
///   "retained_observations": 412,
///   "config": {
///     "rate_limit_threshold": 80.0,
///     "prediction_window_ms": 60000,
///     "has_api_url": true,
///     "has_api_key": false
///   }
/// }
/// ```
pub async fn status(State(state): State<Arc<AdvisorState>>) -> impl IntoResponse {
    let monitor = state.advisor.monitor();
    let cfg = monitor.config();

    Json(json!({
        "status": "ok",
        "uptime_secs": state.started_at.elapsed().as_secs(),
        "retained_observations": monitor.retained(),
        "config": {
            "rate_limit_threshold": cfg.rate_limit_threshold,
            "prediction_window_ms": cfg.prediction_window_ms,
            "has_api_url": cfg.api_url.is_some(),
            "has_api_key": cfg.has_api_key_configured(),
        }
    }))
}
