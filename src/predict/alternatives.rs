//! Alternative-endpoint suggestions attached to every prediction.

use crate::traffic::TrafficObservation;

/// Build the ordered list of alternatives for `endpoint`.
///
/// Order is significant and entries are never de-duplicated:
///
/// 1. `/v1/` upgraded to `/v2/` (first occurrence only), when present.
/// 2. `api_url` (one trailing `/` stripped) joined with the endpoint.
/// 3. The endpoint with `?cached=true`.
/// 4. When the earliest observation was a `GET`, the endpoint without its
///    trailing `/` plus `?fallback=true`.
pub fn suggest(
    endpoint: &str,
    api_url: Option<&str>,
    traffic: &[TrafficObservation],
) -> Vec<String> {
    let mut alternatives = Vec::with_capacity(4);

    if endpoint.contains("/v1/") {
        alternatives.push(endpoint.replacen("/v1/", "/v2/", 1));
    }

    if let Some(base) = api_url {
        let base = base.strip_suffix('/').unwrap_or(base);
        alternatives.push(format!("{base}{endpoint}"));
    }

    alternatives.push(format!("{endpoint}?cached=true"));

    if traffic.first().is_some_and(|o| o.method == "GET") {
        let trimmed = endpoint.strip_suffix('/').unwrap_or(endpoint);
        alternatives.push(format!("{trimmed}?fallback=true"));
    }

    alternatives
}
