//! Generation API Handlers
//!
//! Validate the request body, build a job from the mode catalog and hand it
//! to the relay. The relay's envelope is rendered as the response.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::api::error::{ApiResult, EnvelopeResponse};
use crate::error::RelayError;
use crate::modes::{Mode, background_removal_spec};
use crate::prediction::JobSpec;
use crate::provider::PredictionApi;
use crate::relay::Relay;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    /// Extra model input; keys override the mode defaults.
    #[serde(default)]
    pub input: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct ProcessImageRequest {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub bg_type: Option<String>,
}

fn parse_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, RelayError> {
    body.map(|Json(req)| req)
        .map_err(|rejection| RelayError::InvalidRequest(rejection.body_text()))
}

async fn relay_spec<P>(relay: &Relay<P>, spec: JobSpec) -> ApiResult
where
    P: PredictionApi + Send + Sync + 'static,
{
    let (status, envelope) = relay.submit_and_wait(&spec).await;
    Ok(EnvelopeResponse::new(status, envelope))
}

/// POST /generate
/// Run a text or image generation job
pub async fn generate<P>(
    State(relay): State<Arc<Relay<P>>>,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> ApiResult
where
    P: PredictionApi + Send + Sync + 'static,
{
    let req = parse_body(body)?;

    let mode = req
        .mode
        .as_deref()
        .filter(|mode| !mode.trim().is_empty())
        .ok_or_else(|| RelayError::InvalidRequest("mode is required (text or image)".into()))?;
    let prompt = req.prompt.as_deref().unwrap_or_default();
    if prompt.trim().is_empty() {
        return Err(RelayError::InvalidRequest("prompt is required".into()).into());
    }
    let mode: Mode = mode.parse()?;
    let spec = mode.spec(prompt, req.input.as_ref())?;

    let request_id = Uuid::new_v4();
    tracing::info!(%request_id, ?mode, model = spec.model_identifier(), "generate request");

    relay_spec(&relay, spec).await
}

/// POST /api/process
/// Remove or replace the background of an image, with a brand description
/// of inline images when the describer is configured
pub async fn process_image<P>(
    State(relay): State<Arc<Relay<P>>>,
    body: Result<Json<ProcessImageRequest>, JsonRejection>,
) -> ApiResult
where
    P: PredictionApi + Send + Sync + 'static,
{
    let req = parse_body(body)?;

    let image_url = req.image_url.as_deref().unwrap_or_default();
    let spec = background_removal_spec(image_url, req.bg_type.as_deref())?;

    let request_id = Uuid::new_v4();
    tracing::info!(
        %request_id,
        model = spec.model_identifier(),
        describe = relay.describer().is_some(),
        "background removal request"
    );

    let (status, envelope) = relay.process_image(&spec, image_url).await;
    Ok(EnvelopeResponse::new(status, envelope))
}
