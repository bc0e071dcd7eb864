//! Boolean warning signals computed over one endpoint's windowed traffic.

use crate::traffic::TrafficObservation;

/// Overall error rate above which failure is predicted.
const OVERALL_ERROR_RATE: f64 = 0.30;
/// Error rate over the most recent observations above which failure is predicted.
const RECENT_ERROR_RATE: f64 = 0.50;
const RECENT_ERROR_SAMPLE: usize = 10;

/// Minimum observations before latency drift is considered.
const LATENCY_MIN_SAMPLES: usize = 5;
const RECENT_LATENCY_SAMPLE: usize = 5;
/// Recent mean latency must exceed this multiple of the windowed mean.
const LATENCY_DRIFT_FACTOR: f64 = 2.0;

/// Predict an imminent failure from error rates.
///
/// Two independent triggers: the whole slice erroring more than 30% of the
/// time, or the last ten observations erroring more than half the time.
pub fn predicts_failure(traffic: &[TrafficObservation]) -> bool {
    if traffic.is_empty() {
        return false;
    }

    if error_rate(traffic) > OVERALL_ERROR_RATE {
        return true;
    }

    error_rate(tail(traffic, RECENT_ERROR_SAMPLE)) > RECENT_ERROR_RATE
}

/// Flag latency degradation when the last five responses average more than
/// double the windowed mean.
///
/// Coarse on purpose: one slow outlier among five recent samples can trip it.
pub fn latency_degraded(traffic: &[TrafficObservation]) -> bool {
    if traffic.len() < LATENCY_MIN_SAMPLES {
        return false;
    }

    let overall = mean_latency(traffic);
    let recent = mean_latency(tail(traffic, RECENT_LATENCY_SAMPLE));
    recent > overall * LATENCY_DRIFT_FACTOR
}

/// Fraction of observations with status >= 400. Callers guarantee non-empty input.
fn error_rate(traffic: &[TrafficObservation]) -> f64 {
    let errors = traffic.iter().filter(|o| o.is_error()).count();
    errors as f64 / traffic.len() as f64
}

/// Callers guarantee non-empty input.
pub(crate) fn mean_latency(traffic: &[TrafficObservation]) -> f64 {
    traffic.iter().map(|o| o.response_time as f64).sum::<f64>() / traffic.len() as f64
}

fn tail(traffic: &[TrafficObservation], n: usize) -> &[TrafficObservation] {
    &traffic[traffic.len().saturating_sub(n)..]
}
