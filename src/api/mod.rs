//! API Module
//!
//! HTTP layer in front of the relay. Every response body is JSON with an
//! `ok` flag, except the plain-text banner at `/`.

pub mod error;
pub mod generate;
pub mod health;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::provider::PredictionApi;
use crate::relay::Relay;

/// Largest accepted request body (inline base64 images).
pub const BODY_LIMIT: usize = 25 * 1024 * 1024;

/// Create the API router with all endpoints
pub fn create_router<P>(relay: Arc<Relay<P>>) -> Router
where
    P: PredictionApi + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(health::index))
        .route("/health", get(health::health_check))
        .route("/generate", post(generate::generate::<P>))
        .route("/api/process", post(generate::process_image::<P>))
        .with_state(relay)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
