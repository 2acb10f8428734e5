//! API Error Handling
//!
//! Turns relay outcomes into HTTP responses carrying a [`ResultEnvelope`].

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::envelope::ResultEnvelope;
use crate::error::RelayError;

/// Status code plus envelope, ready to be rendered as JSON.
#[derive(Debug)]
pub struct EnvelopeResponse {
    status: StatusCode,
    envelope: ResultEnvelope,
}

impl EnvelopeResponse {
    pub fn new(status: u16, envelope: ResultEnvelope) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self { status, envelope }
    }
}

impl From<RelayError> for EnvelopeResponse {
    fn from(err: RelayError) -> Self {
        let (status, envelope) = ResultEnvelope::failure(&err);
        Self::new(status, envelope)
    }
}

impl IntoResponse for EnvelopeResponse {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = self.status.as_u16(), "request failed: {:?}", self.envelope);
        } else if !self.status.is_success() {
            tracing::warn!(status = self.status.as_u16(), "request rejected: {:?}", self.envelope);
        }

        (self.status, Json(self.envelope)).into_response()
    }
}

pub type ApiResult = Result<EnvelopeResponse, EnvelopeResponse>;
