//! One handle over both subsystems.

use std::sync::Arc;

use crate::{
    config::Config,
    predict::{PredictionResult, TrafficMonitor},
    refactor::{RefactorEngine, Suggestion},
    traffic::{Clock, SystemClock, TrafficObservation},
};

/// Traffic risk predictor and refactor advisor behind a single type.
pub struct Advisor {
    monitor: TrafficMonitor,
    refactor: RefactorEngine,
}

impl Advisor {
    pub fn new(config: &Config) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &Config, clock: Arc<dyn Clock>) -> Self {
        Self {
            monitor: TrafficMonitor::with_clock(config.monitor.clone(), clock),
            refactor: RefactorEngine::new(config.refactor.clone()),
        }
    }

    pub fn monitor(&self) -> &TrafficMonitor {
        &self.monitor
    }

    pub fn refactor(&self) -> &RefactorEngine {
        &self.refactor
    }

    pub fn record_traffic(&self, observation: TrafficObservation) {
        self.monitor.record(observation);
    }

    pub async fn predict(&self, endpoint: &str) -> PredictionResult {
        self.monitor.predict(endpoint).await
    }

    pub async fn refactor_code(&self, source: &str) -> Vec<Suggestion> {
        self.refactor.suggestions_for(source)
    }
}
