//! Traffic endpoints: record observations, predict risk, inspect stats.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::AdvisorState;
use crate::{error::ApiError, traffic::TrafficObservation};

#[derive(Debug, Deserialize)]
pub struct EndpointQuery {
    endpoint: Option<String>,
}

impl EndpointQuery {
    fn endpoint(self) -> Result<String, ApiError> {
        self.endpoint
            .filter(|e| !e.is_empty())
            .ok_or(ApiError::MissingParameter("endpoint"))
    }
}

/// `POST /traffic`: record one observed request/response exchange.
///
/// Example body:
/// ```json
/// {
///   "endpoint": "/v1/users",
///   "method": "GET",
///   "timestamp": 1700000000000,
///   "responseTime": 120,
///   "statusCode": 200,
///   "headers": { "x-ratelimit-remaining": "42", "x-ratelimit-limit": "100" }
/// }
/// ```
pub async fn record(
    State(state): State<Arc<AdvisorState>>,
    Json(observation): Json<TrafficObservation>,
) -> impl IntoResponse {
    state.advisor.record_traffic(observation);
    (StatusCode::ACCEPTED, Json(json!({ "recorded": true })))
}

/// `GET /predict?endpoint=<e>`: risk prediction for one endpoint.
pub async fn predict(
    State(state): State<Arc<AdvisorState>>,
    Query(q): Query<EndpointQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let endpoint = q.endpoint()?;
    Ok(Json(state.advisor.predict(&endpoint).await))
}

/// `GET /stats?endpoint=<e>`: aggregate view of one endpoint's window.
pub async fn stats(
    State(state): State<Arc<AdvisorState>>,
    Query(q): Query<EndpointQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let endpoint = q.endpoint()?;
    Ok(Json(state.advisor.monitor().stats(&endpoint)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        api::{
            router,
            test_support::{get, post_json, send, state, state_with, NOW},
        },
        config::Config,
    };

    fn observation(endpoint: &str, status: u16) -> serde_json::Value {
        json!({
            "endpoint": endpoint,
            "method": "GET",
            "timestamp": NOW,
            "responseTime": 100,
            "statusCode": status,
            "headers": { "x-ratelimit-remaining": "10", "x-ratelimit-limit": "100" }
        })
    }

    // -----------------------------------------------------------------------
    // POST /traffic
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn record_accepts_observation() {
        let state = state();
        let (status, json) =
            send(router(state.clone()), post_json("/traffic", observation("/api/test", 200))).await;

        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(json["recorded"], true);
        assert_eq!(state.advisor.monitor().retained(), 1);
    }

    #[tokio::test]
    async fn record_rejects_payload_missing_fields() {
        let (status, _) = send(
            router(state()),
            post_json("/traffic", json!({ "endpoint": "/api" })),
        )
        .await;
        assert!(status.is_client_error(), "got {status}");
    }

    // -----------------------------------------------------------------------
    // GET /predict
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn predict_returns_all_fields_after_recording() {
        let state = state();
        send(router(state.clone()), post_json("/traffic", observation("/api/test", 200))).await;

        let (status, json) = send(router(state), get("/predict?endpoint=/api/test")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["endpoint"], "/api/test");
        assert_eq!(json["riskLevel"], "medium");
        assert_eq!(json["predictedFailure"], false);
        assert_eq!(json["rateLimitApproaching"], true);
        assert_eq!(json["suggestedAlternatives"][0], "/api/test?cached=true");
        assert_eq!(json["confidence"], 15);
    }

    #[tokio::test]
    async fn predict_unknown_endpoint_returns_defaults() {
        let (status, json) = send(router(state()), get("/predict?endpoint=/never")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["riskLevel"], "low");
        assert_eq!(json["confidence"], 0);
    }

    #[tokio::test]
    async fn predict_uses_configured_api_url() {
        let mut config = Config::default();
        config.monitor.api_url = Some("https://lb.example.com".into());
        let (_, json) = send(router(state_with(config)), get("/predict?endpoint=/v1/a")).await;
        assert_eq!(
            json["suggestedAlternatives"],
            json!(["/v2/a", "https://lb.example.com/v1/a", "/v1/a?cached=true"])
        );
    }

    #[tokio::test]
    async fn predict_without_endpoint_is_bad_request() {
        for uri in ["/predict", "/predict?endpoint="] {
            let (status, json) = send(router(state()), get(uri)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "uri {uri}");
            assert!(json["error"].as_str().unwrap().contains("endpoint"));
        }
    }

    // -----------------------------------------------------------------------
    // GET /stats
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn stats_counts_errors_and_reports_snapshot() {
        let state = state();
        send(router(state.clone()), post_json("/traffic", observation("/api", 200))).await;
        send(router(state.clone()), post_json("/traffic", observation("/api", 502))).await;

        let (status, json) = send(router(state), get("/stats?endpoint=/api")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["observations"], 2);
        assert_eq!(json["errors"], 1);
        assert_eq!(json["avg_latency_ms"], 100.0);
        assert_eq!(json["requests_per_minute"], 2.0);
        assert_eq!(json["rate_limit"]["remaining"], 10);
    }

    #[tokio::test]
    async fn stats_without_endpoint_is_bad_request() {
        let (status, _) = send(router(state()), get("/stats")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
