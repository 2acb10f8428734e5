//! Health Check API Handlers

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

/// GET /
pub async fn index() -> impl IntoResponse {
    (StatusCode::OK, "WhiteMuse API is running")
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}
