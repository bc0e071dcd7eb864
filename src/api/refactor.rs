//! `POST /refactor`: run the source-pattern advisor over a code block.

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use super::AdvisorState;

#[derive(Debug, Deserialize)]
pub struct RefactorRequest {
    code: String,
}

/// Example response:
/// ```json
/// {
///   "suggestions": [
///     {
///       "type": "idiom",
///       "description": "Use const/let instead of var for block scoping",
///       "originalCode": "var x = 1;",
///       "suggestedCode": "let x = 1;",
///       "line": 1,
///       "severity": "medium"
///     }
///   ]
/// }
/// ```
pub async fn refactor(
    State(state): State<Arc<AdvisorState>>,
    Json(req): Json<RefactorRequest>,
) -> impl IntoResponse {
    let suggestions = state.advisor.refactor_code(&req.code).await;
    Json(json!({ "suggestions": suggestions }))
}
