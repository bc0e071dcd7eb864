//! Rate-limit snapshot extraction from response headers.
//!
//! Providers disagree on header spelling: some send the legacy
//! `X-RateLimit-*` family, others the IETF draft `RateLimit-*` names. Each
//! field is looked up through an ordered candidate list, legacy first.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::traffic::TrafficObservation;

const DEFAULT_LIMIT: i64 = 100;
const DEFAULT_REMAINING: i64 = 100;
const DEFAULT_RESET_DELAY_MS: i64 = 60_000;

const LIMIT_KEYS: &[&str] = &["x-ratelimit-limit", "ratelimit-limit"];
const REMAINING_KEYS: &[&str] = &["x-ratelimit-remaining", "ratelimit-remaining"];
const RESET_KEYS: &[&str] = &["x-ratelimit-reset", "ratelimit-reset"];

/// The integer a header value starts with. IETF `RateLimit-Limit` values
/// carry a quota policy after the number (`10, 10;w=1`).
static LEADING_INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+").expect("leading integer pattern is valid"));

/// Headers whose presence marks an observation as carrying rate-limit data.
const MARKER_KEYS: &[&str] = &[
    "x-ratelimit-limit",
    "x-ratelimit-remaining",
    "ratelimit-limit",
    "ratelimit-remaining",
];

/// Limit / remaining / reset triple as last reported by the upstream API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitSnapshot {
    pub limit: i64,
    pub remaining: i64,
    /// Epoch milliseconds (or whatever unit the provider sends) of the reset.
    pub reset: i64,
}

impl RateLimitSnapshot {
    /// The snapshot used when no observation reports rate-limit headers.
    pub fn defaults(now_ms: i64) -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            remaining: DEFAULT_REMAINING,
            reset: now_ms + DEFAULT_RESET_DELAY_MS,
        }
    }

    /// Whether fewer than `threshold_pct` percent of the limit remain.
    pub fn is_approaching(&self, threshold_pct: f64) -> bool {
        (self.remaining as f64) < self.limit as f64 * threshold_pct / 100.0
    }
}

/// Whether `observation` carries any recognized rate-limit header.
pub fn has_rate_limit_headers(observation: &TrafficObservation) -> bool {
    MARKER_KEYS.iter().any(|key| non_empty(observation, key).is_some())
}

/// Build a snapshot from the most recent observation reporting rate limits.
///
/// Each field is parsed independently: a malformed value falls back to that
/// field's default without disturbing the other two.
pub fn extract(traffic: &[TrafficObservation], now_ms: i64) -> RateLimitSnapshot {
    let defaults = RateLimitSnapshot::defaults(now_ms);
    let Some(latest) = traffic.iter().rev().find(|o| has_rate_limit_headers(o)) else {
        return defaults;
    };

    RateLimitSnapshot {
        limit: parse_field(latest, LIMIT_KEYS).unwrap_or(defaults.limit),
        remaining: parse_field(latest, REMAINING_KEYS).unwrap_or(defaults.remaining),
        reset: parse_field(latest, RESET_KEYS).unwrap_or(defaults.reset),
    }
}

/// Parse the leading integer of the first non-empty candidate header. A
/// present value with no leading integer does not fall through to later
/// candidates.
fn parse_field(observation: &TrafficObservation, candidates: &[&str]) -> Option<i64> {
    let value = candidates
        .iter()
        .find_map(|key| non_empty(observation, key))?;
    LEADING_INTEGER.find(value.trim())?.as_str().parse().ok()
}

fn non_empty<'a>(observation: &'a TrafficObservation, key: &str) -> Option<&'a str> {
    observation.header(key).filter(|v| !v.is_empty())
}
