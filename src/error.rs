//! Typed request errors for the HTTP layer.
//!
//! The prediction and refactor cores are total and never fail; the only
//! errors a handler can produce come from malformed requests. [`ApiError`]
//! converts into a JSON error response automatically via [`IntoResponse`], so
//! handlers return `Result<T, ApiError>` and propagate with `?`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A required query parameter was absent or empty.
    #[error("missing required query parameter `{0}`")]
    MissingParameter(&'static str),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::MissingParameter(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "request rejected");
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
