//! traffic-advisor: client-side API traffic risk predictor and source
//! refactor advisor.
//!
//! Two independent subsystems, usable on their own or together through
//! [`Advisor`]:
//!
//! - [`TrafficMonitor`] keeps a rolling window of observed API exchanges and
//!   predicts, per endpoint, whether failures or rate-limit exhaustion are
//!   imminent.
//! - [`RefactorEngine`] scans JavaScript-family source text for a handful of
//!   performance, idiom and async patterns.
//!
//! ```rust
//! use traffic_advisor::{MonitorConfig, TrafficMonitor, TrafficObservation};
//!
//! let monitor = TrafficMonitor::new(MonitorConfig::default());
//! let now = chrono::Utc::now().timestamp_millis();
//! monitor.record(
//!     TrafficObservation::new("/v1/users", "GET", now, 120, 200)
//!         .with_header("x-ratelimit-limit", "100")
//!         .with_header("x-ratelimit-remaining", "4"),
//! );
//!
//! // `predict` is the async form of `evaluate`.
//! let prediction = monitor.evaluate("/v1/users");
//! assert!(prediction.rate_limit_approaching);
//! assert_eq!(prediction.suggested_alternatives[0], "/v2/users");
//! ```

pub mod advisor;
pub mod api;
pub mod config;
pub mod error;
pub mod predict;
pub mod refactor;
pub mod traffic;

pub use advisor::Advisor;
pub use config::{Config, MonitorConfig, RefactorConfig};
pub use error::ApiError;
pub use predict::{PredictionResult, RateLimitSnapshot, RiskLevel, TrafficMonitor};
pub use refactor::{RefactorEngine, Suggestion};
pub use traffic::{Clock, Ledger, ManualClock, SystemClock, TrafficObservation};
