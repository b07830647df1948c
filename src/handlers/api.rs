use axum::{Json, response::IntoResponse};
use serde_json::json;

/// Health check handler
///
/// Returns `{"status": "OK"}` while the server is accepting requests.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "OK" }))
}
