//! In-memory traffic ledger backing every prediction.
//!
//! [`Ledger`] is a time-bounded ring-buffer: observations are appended in
//! arrival order and, on every insertion, anything older than the retention
//! window is evicted from the front. Expiry runs only at insertion time, so a
//! read between two insertions may still see entries that have aged past the
//! window since the last `record`.

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
};

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Source of "now" in epoch milliseconds.
///
/// Injected into the [`Ledger`] so expiry and rate-limit reset defaults can be
/// driven deterministically from tests.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall-clock time via [`chrono::Utc`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(now_ms),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

/// One observed request/response exchange.
///
/// Field names serialize in camelCase so payloads from existing SDK clients
/// (`responseTime`, `statusCode`) deserialize unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficObservation {
    /// Endpoint path or URL the request was sent to.
    pub endpoint: String,
    /// HTTP method, e.g. `GET`.
    pub method: String,
    /// When the response was observed, epoch milliseconds.
    pub timestamp: i64,
    /// Round-trip latency in milliseconds.
    pub response_time: u64,
    pub status_code: u16,
    /// Response headers as received. Key case is not normalized.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl TrafficObservation {
    pub fn new(
        endpoint: impl Into<String>,
        method: impl Into<String>,
        timestamp: i64,
        response_time: u64,
        status_code: u16,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            method: method.into(),
            timestamp,
            response_time,
            status_code,
            headers: HashMap::new(),
        }
    }

    /// Attach a response header.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    /// Look up a header by name. An exact key wins; otherwise ASCII case is
    /// ignored.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .or_else(|| {
                self.headers
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, value)| value)
            })
            .map(String::as_str)
    }

    /// Whether the response was a client or server error (status >= 400).
    pub fn is_error(&self) -> bool {
        self.status_code >= 400
    }
}

/// Time-windowed, arrival-ordered store of [`TrafficObservation`]s.
///
/// Safe to share across threads via `Arc<Ledger>`. A single mutex guards the
/// sequence; both [`record`][Self::record] and [`slice`][Self::slice] hold it
/// only for the duration of an in-memory pass.
pub struct Ledger {
    window_ms: i64,
    clock: Arc<dyn Clock>,
    entries: Mutex<VecDeque<TrafficObservation>>,
}

impl Ledger {
    /// Create a ledger that retains observations for `window_ms` milliseconds.
    pub fn new(window_ms: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            window_ms: i64::try_from(window_ms).unwrap_or(i64::MAX),
            clock,
            entries: Mutex::new(VecDeque::new()),
        }
    }

    /// Append an observation, then evict everything that has aged out.
    ///
    /// Age is measured against the clock at the time of this call. An
    /// observation is retained only while `now - timestamp < window`; this
    /// applies to the one just appended as well.
    pub fn record(&self, observation: TrafficObservation) {
        let now = self.clock.now_ms();
        let mut entries = self.lock();
        entries.push_back(observation);
        entries.retain(|e| now.saturating_sub(e.timestamp) < self.window_ms);
    }

    /// All retained observations for `endpoint`, oldest first.
    pub fn slice(&self, endpoint: &str) -> Vec<TrafficObservation> {
        self.lock()
            .iter()
            .filter(|e| e.endpoint == endpoint)
            .cloned()
            .collect()
    }

    /// Number of observations currently retained across all endpoints.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current time according to the ledger's clock.
    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    // The sequence is never left half-updated, so a poisoned lock is safe to reuse.
    fn lock(&self) -> MutexGuard<'_, VecDeque<TrafficObservation>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: u64 = 60_000;

    fn ledger_at(now: i64) -> (Ledger, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(now));
        (Ledger::new(WINDOW, clock.clone()), clock)
    }

    fn obs(endpoint: &str, timestamp: i64) -> TrafficObservation {
        TrafficObservation::new(endpoint, "GET", timestamp, 100, 200)
    }

    // -----------------------------------------------------------------------
    // Basic record / slice
    // -----------------------------------------------------------------------

    #[test]
    fn record_and_slice_single_observation() {
        let (ledger, _) = ledger_at(1_000);
        ledger.record(obs("/api/test", 1_000));

        let slice = ledger.slice("/api/test");
        assert_eq!(slice.len(), 1);
        assert_eq!(slice[0].endpoint, "/api/test");
        assert_eq!(slice[0].response_time, 100);
    }

    #[test]
    fn slice_preserves_arrival_order() {
        let (ledger, _) = ledger_at(10_000);
        // Arrival order, not timestamp order, is what counts.
        ledger.record(obs("/a", 9_000).with_header("n", "first"));
        ledger.record(obs("/a", 8_000).with_header("n", "second"));
        ledger.record(obs("/a", 9_500).with_header("n", "third"));

        let order: Vec<_> = ledger
            .slice("/a")
            .iter()
            .map(|o| o.header("n").unwrap_or_default().to_string())
            .collect();
        assert_eq!(order, ["first", "second", "third"]);
    }

    #[test]
    fn slice_filters_by_exact_endpoint() {
        let (ledger, _) = ledger_at(0);
        ledger.record(obs("/a", 0));
        ledger.record(obs("/b", 0));
        ledger.record(obs("/a/", 0));
        ledger.record(obs("/a", 0));

        assert_eq!(ledger.slice("/a").len(), 2);
        assert_eq!(ledger.slice("/b").len(), 1);
        assert!(ledger.slice("/c").is_empty());
        assert_eq!(ledger.len(), 4);
    }

    // -----------------------------------------------------------------------
    // Expiry
    // -----------------------------------------------------------------------

    #[test]
    fn observation_expires_on_next_insert_past_window() {
        let (ledger, clock) = ledger_at(1_000);
        ledger.record(obs("/old", 1_000));

        let later = 1_000 + WINDOW as i64 + 1;
        clock.set(later);
        ledger.record(obs("/other", later));

        assert!(ledger.slice("/old").is_empty(), "expired entry must be gone");
        assert_eq!(ledger.slice("/other").len(), 1);
    }

    #[test]
    fn reads_do_not_expire_entries() {
        let (ledger, clock) = ledger_at(0);
        ledger.record(obs("/a", 0));

        clock.advance(WINDOW as i64 * 10);
        // No insertion since, so the stale entry is still visible.
        assert_eq!(ledger.slice("/a").len(), 1);
    }

    #[test]
    fn entry_exactly_window_old_is_evicted() {
        let (ledger, clock) = ledger_at(0);
        ledger.record(obs("/a", 0));

        clock.set(WINDOW as i64 - 1);
        ledger.record(obs("/b", WINDOW as i64 - 1));
        assert_eq!(ledger.slice("/a").len(), 1, "still inside the window");

        clock.set(WINDOW as i64);
        ledger.record(obs("/b", WINDOW as i64));
        assert!(ledger.slice("/a").is_empty(), "age == window is evicted");
    }

    #[test]
    fn stale_observation_is_dropped_on_arrival() {
        let (ledger, _) = ledger_at(100_000);
        ledger.record(obs("/a", 100_000 - WINDOW as i64 - 5));
        assert!(ledger.is_empty());
    }

    // -----------------------------------------------------------------------
    // Concurrency
    // -----------------------------------------------------------------------

    #[test]
    fn concurrent_records_and_slices_lose_nothing() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 250;

        let (ledger, _) = ledger_at(1_000);
        std::thread::scope(|s| {
            for t in 0..THREADS {
                let ledger = &ledger;
                s.spawn(move || {
                    let endpoint = format!("/t{t}");
                    for n in 0..PER_THREAD {
                        ledger.record(obs(&endpoint, 1_000));
                        // Each writer sees its own inserts so far, in order.
                        assert_eq!(ledger.slice(&endpoint).len(), n + 1);
                    }
                });
            }
        });

        assert_eq!(ledger.len(), THREADS * PER_THREAD);
        for t in 0..THREADS {
            assert_eq!(ledger.slice(&format!("/t{t}")).len(), PER_THREAD);
        }
    }

    // -----------------------------------------------------------------------
    // TrafficObservation
    // -----------------------------------------------------------------------

    #[test]
    fn header_lookup_ignores_case() {
        let o = obs("/a", 0).with_header("X-RateLimit-Remaining", "7");
        assert_eq!(o.header("x-ratelimit-remaining"), Some("7"));
        assert_eq!(o.header("ratelimit-remaining"), None);
    }

    #[test]
    fn exact_header_name_beats_other_spellings() {
        let o = obs("/a", 0)
            .with_header("x-ratelimit-remaining", "5")
            .with_header("X-RateLimit-Remaining", "50");
        assert_eq!(o.header("x-ratelimit-remaining"), Some("5"));
        assert_eq!(o.header("X-RateLimit-Remaining"), Some("50"));
    }

    #[test]
    fn error_flag_starts_at_400() {
        assert!(!TrafficObservation::new("/", "GET", 0, 0, 399).is_error());
        assert!(TrafficObservation::new("/", "GET", 0, 0, 400).is_error());
        assert!(TrafficObservation::new("/", "GET", 0, 0, 503).is_error());
    }

    #[test]
    fn deserializes_camel_case_payload_without_headers() {
        let o: TrafficObservation = serde_json::from_str(
            r#"{"endpoint":"/api","method":"POST","timestamp":5,"responseTime":12,"statusCode":201}"#,
        )
        .expect("payload should parse");
        assert_eq!(o.response_time, 12);
        assert_eq!(o.status_code, 201);
        assert!(o.headers.is_empty());
    }
}
