//! HTTP surface over the [`Advisor`](crate::advisor::Advisor).
//!
//! This is intentionally a thin layer: all prediction and refactor logic
//! lives in [`crate::predict`] and [`crate::refactor`]. Handlers translate
//! HTTP concerns (status codes, JSON bodies, query strings) into calls on the
//! shared [`AdvisorState`] and back.

pub mod refactor;
pub mod request_id;
pub mod status;
pub mod traffic;

use std::{sync::Arc, time::Instant};

use axum::{
    routing::{get, post},
    Router,
};

use crate::advisor::Advisor;

/// Shared application state injected into every handler via [`axum::extract::State`].
pub struct AdvisorState {
    pub advisor: Advisor,
    /// Service start time, used to compute uptime for `/status`.
    pub started_at: Instant,
}

impl AdvisorState {
    pub fn new(advisor: Advisor) -> Self {
        Self {
            advisor,
            started_at: Instant::now(),
        }
    }
}

/// Build the axum router. Tracing and request-id layers are added by the caller.
pub fn router(state: Arc<AdvisorState>) -> Router {
    Router::new()
        .route("/healthz", get(status::healthz))
        .route("/status", get(status::status))
        .route("/traffic", post(traffic::record))
        .route("/predict", get(traffic::predict))
        .route("/stats", get(traffic::stats))
        .route("/refactor", post(refactor::refactor))
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use tower::ServiceExt; // oneshot

    use super::AdvisorState;
    use crate::{advisor::Advisor, config::Config, traffic::ManualClock};

    pub const NOW: i64 = 1_700_000_000_000;

    pub fn state_with(config: Config) -> Arc<AdvisorState> {
        let advisor = Advisor::with_clock(&config, Arc::new(ManualClock::new(NOW)));
        Arc::new(AdvisorState::new(advisor))
    }

    pub fn state() -> Arc<AdvisorState> {
        state_with(Config::default())
    }

    /// Send one request and decode the JSON response body.
    pub async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }
}
