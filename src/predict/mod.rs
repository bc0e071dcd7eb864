//! Traffic risk prediction, the core of traffic-advisor.
//!
//! A [`TrafficMonitor`] owns a [`Ledger`] of recent observations. On demand it
//! filters the ledger down to one endpoint and folds three independent
//! warning signals into a [`PredictionResult`]:
//!
//! - **rate limit approaching**: the latest reported `remaining` is below
//!   `rate_limit_threshold` percent of `limit` (see [`rate_limit`]);
//! - **predicted failure**: error rates over the window or the last ten
//!   requests (see [`signals::predicts_failure`]);
//! - **latency drift**: the last five responses are twice as slow as the
//!   window average (see [`signals::latency_degraded`]).
//!
//! Predictions are heuristic point estimates, not calibrated probabilities.
//! Every operation here is total: empty history, missing headers and
//! malformed header values all degrade to defaults.

pub mod alternatives;
pub mod rate_limit;
pub mod signals;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    config::MonitorConfig,
    traffic::{Clock, Ledger, SystemClock, TrafficObservation},
};

pub use rate_limit::RateLimitSnapshot;

/// Confidence contributed by each observation, before the cap.
const CONFIDENCE_PER_OBSERVATION: usize = 10;
const CONFIDENCE_CAP: usize = 95;
/// Added after the cap when rate-limit headers back the prediction.
const RATE_LIMIT_HEADER_BONUS: u32 = 5;

const MS_PER_MINUTE: f64 = 60_000.0;

/// Ordinal risk classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Two or more raised signals is high risk, one is medium.
    pub fn from_signals(signals: &[bool]) -> Self {
        match signals.iter().filter(|&&raised| raised).count() {
            0 => Self::Low,
            1 => Self::Medium,
            _ => Self::High,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        })
    }
}

/// Outcome of a single [`TrafficMonitor::predict`] call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub endpoint: String,
    pub risk_level: RiskLevel,
    pub predicted_failure: bool,
    pub rate_limit_approaching: bool,
    /// Ordered; may contain duplicates.
    pub suggested_alternatives: Vec<String>,
    /// Heuristic 0–100 score reflecting how much data backs the prediction.
    pub confidence: u32,
}

/// Aggregate view of one endpoint's retained traffic.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointStats {
    pub endpoint: String,
    pub observations: usize,
    pub errors: usize,
    pub avg_latency_ms: f64,
    pub requests_per_minute: f64,
    pub rate_limit: RateLimitSnapshot,
}

/// Records traffic and predicts near-term trouble per endpoint.
///
/// Safe to share across threads via `Arc<TrafficMonitor>`.
pub struct TrafficMonitor {
    config: MonitorConfig,
    ledger: Ledger,
}

impl TrafficMonitor {
    /// Create a monitor on the system clock.
    pub fn new(config: MonitorConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: MonitorConfig, clock: Arc<dyn Clock>) -> Self {
        let ledger = Ledger::new(config.prediction_window_ms, clock);
        Self { config, ledger }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Number of observations currently retained across all endpoints.
    pub fn retained(&self) -> usize {
        self.ledger.len()
    }

    /// Record one observed exchange. Never fails.
    pub fn record(&self, observation: TrafficObservation) {
        debug!(
            endpoint = %observation.endpoint,
            status = observation.status_code,
            response_time_ms = observation.response_time,
            "recording traffic"
        );
        self.ledger.record(observation);
    }

    /// Predict near-term risk for `endpoint`.
    ///
    /// Async only for symmetry with the refactor engine; resolves without
    /// suspending.
    #[tracing::instrument(skip(self), fields(risk = tracing::field::Empty))]
    pub async fn predict(&self, endpoint: &str) -> PredictionResult {
        let result = self.evaluate(endpoint);
        tracing::Span::current().record("risk", tracing::field::display(result.risk_level));
        result
    }

    /// Synchronous form of [`predict`][Self::predict].
    pub fn evaluate(&self, endpoint: &str) -> PredictionResult {
        let traffic = self.ledger.slice(endpoint);
        let snapshot = rate_limit::extract(&traffic, self.ledger.now_ms());

        let rate_limit_approaching = snapshot.is_approaching(self.config.rate_limit_threshold);
        let predicted_failure = signals::predicts_failure(&traffic);
        let response_time_issues = signals::latency_degraded(&traffic);

        debug!(
            observations = traffic.len(),
            rate_limit_approaching,
            predicted_failure,
            response_time_issues,
            remaining = snapshot.remaining,
            limit = snapshot.limit,
            "signals computed"
        );

        PredictionResult {
            endpoint: endpoint.to_string(),
            risk_level: RiskLevel::from_signals(&[
                rate_limit_approaching,
                predicted_failure,
                response_time_issues,
            ]),
            predicted_failure,
            rate_limit_approaching,
            suggested_alternatives: alternatives::suggest(
                endpoint,
                self.config.api_url.as_deref(),
                &traffic,
            ),
            confidence: confidence(&traffic),
        }
    }

    /// Requests per minute over the endpoint's retained traffic.
    ///
    /// The span runs from the earliest to the latest timestamp; a zero span
    /// counts as one minute. Informational only; it does not feed the risk
    /// level.
    pub fn request_rate(&self, endpoint: &str) -> f64 {
        request_rate(&self.ledger.slice(endpoint))
    }

    /// Aggregate statistics for one endpoint.
    pub fn stats(&self, endpoint: &str) -> EndpointStats {
        let traffic = self.ledger.slice(endpoint);
        EndpointStats {
            endpoint: endpoint.to_string(),
            observations: traffic.len(),
            errors: traffic.iter().filter(|o| o.is_error()).count(),
            avg_latency_ms: if traffic.is_empty() {
                0.0
            } else {
                signals::mean_latency(&traffic)
            },
            requests_per_minute: request_rate(&traffic),
            rate_limit: rate_limit::extract(&traffic, self.ledger.now_ms()),
        }
    }
}

/// `min(n × 10, 95)`, plus 5 when any observation reports rate limits.
///
/// The bonus is added after the cap and is not re-clamped.
fn confidence(traffic: &[TrafficObservation]) -> u32 {
    let base = traffic
        .len()
        .saturating_mul(CONFIDENCE_PER_OBSERVATION)
        .min(CONFIDENCE_CAP) as u32;

    if traffic.iter().any(rate_limit::has_rate_limit_headers) {
        base + RATE_LIMIT_HEADER_BONUS
    } else {
        base
    }
}

fn request_rate(traffic: &[TrafficObservation]) -> f64 {
    let (Some(start), Some(end)) = (
        traffic.iter().map(|o| o.timestamp).min(),
        traffic.iter().map(|o| o.timestamp).max(),
    ) else {
        return 0.0;
    };

    let minutes = (end - start) as f64 / MS_PER_MINUTE;
    let minutes = if minutes == 0.0 { 1.0 } else { minutes };
    traffic.len() as f64 / minutes
}
