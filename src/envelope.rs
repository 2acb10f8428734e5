//! Stable response envelope returned to callers.
//!
//! Success carries the provider output verbatim; failure carries a
//! human-readable `error` and an optional diagnostic `detail`. Both serialize
//! with an `ok` flag so clients can branch on one field.

use serde::Serialize;
use serde_json::Value;

use crate::error::RelayError;
use crate::provider::{Job, JobStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuccessEnvelope {
    pub ok: bool,
    pub id: String,
    pub status: JobStatus,
    pub output: Value,
    /// Brand description of the submitted image, when one was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Raw provider job, only when debug output is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureEnvelope {
    pub ok: bool,
    pub error: String,
    pub detail: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResultEnvelope {
    Success(SuccessEnvelope),
    Failure(FailureEnvelope),
}

impl ResultEnvelope {
    pub fn success(job: Job, include_raw: bool) -> Self {
        ResultEnvelope::Success(SuccessEnvelope {
            ok: true,
            id: job.id,
            status: job.status,
            output: job.output.unwrap_or(Value::Null),
            description: None,
            raw: include_raw.then_some(job.raw),
        })
    }

    /// Attach a description to a success envelope. Failures are unchanged.
    pub fn with_description(mut self, text: String) -> Self {
        if let ResultEnvelope::Success(success) = &mut self {
            success.description = Some(text);
        }
        self
    }

    /// Envelope and HTTP status for a failed request.
    pub fn failure(err: &RelayError) -> (u16, Self) {
        let mut error = err.to_string();
        if error.trim().is_empty() {
            error = "Unknown error".to_string();
        }
        let envelope = ResultEnvelope::Failure(FailureEnvelope {
            ok: false,
            error,
            detail: err.detail(),
        });
        (err.status_code(), envelope)
    }

    /// Normalize the outcome of a relay run into `(status code, envelope)`.
    pub fn from_result(result: Result<Job, RelayError>, include_raw: bool) -> (u16, Self) {
        match result {
            Ok(job) => (200, Self::success(job, include_raw)),
            Err(err) => Self::failure(&err),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ResultEnvelope::Success(_))
    }
}
