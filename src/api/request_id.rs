//! Request ID middleware.
//!
//! Every inbound request gets an `X-Request-ID`: the caller's own value when
//! it is short, printable and non-empty, a fresh UUID v4 otherwise. The ID is
//! stored as a [`RequestId`] extension and echoed back on the response. The
//! handler runs inside an `advisor_request` span carrying the ID and, for
//! `/predict` and `/stats`, the monitored endpoint being asked about, so
//! `signals computed` log lines can be traced back to one caller.

use axum::{
    extract::{Query, Request},
    http::{HeaderMap, HeaderValue, Uri},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use tracing::{field, Instrument as _};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Caller-supplied IDs longer than this are replaced with a generated one.
const MAX_CALLER_ID_LEN: usize = 128;

/// The ID assigned to the current request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty() && v.len() <= MAX_CALLER_ID_LEN)
            .map(|v| Self(v.to_string()))
            .unwrap_or_else(|| Self(Uuid::new_v4().to_string()))
    }
}

#[derive(Deserialize)]
struct EndpointParam {
    endpoint: Option<String>,
}

/// The `endpoint` query parameter, when the request names one.
fn monitored_endpoint(uri: &Uri) -> Option<String> {
    Query::<EndpointParam>::try_from_uri(uri)
        .ok()
        .and_then(|Query(p)| p.endpoint)
        .filter(|e| !e.is_empty())
}

/// Apply **inside** the `tower_http::TraceLayer` so it runs within the trace span.
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let id = RequestId::from_headers(req.headers());
    let span = tracing::debug_span!(
        "advisor_request",
        request_id = %id.0,
        endpoint = field::Empty,
    );
    if let Some(endpoint) = monitored_endpoint(req.uri()) {
        span.record("endpoint", endpoint.as_str());
    }

    req.extensions_mut().insert(id.clone());
    let mut response = next.run(req).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&id.0) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
