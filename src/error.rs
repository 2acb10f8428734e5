use thiserror::Error;

use crate::provider::{Job, JobStatus, ProviderError};

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Provider(#[from] ProviderError),

    /// The provider reported the job itself as failed or canceled.
    #[error("Prediction {status}")]
    JobFailed { status: JobStatus, job: Box<Job> },

    /// The deadline passed while the job was still pending or processing.
    #[error("Prediction timeout (last status: {last_status})")]
    JobTimeout {
        last_status: JobStatus,
        job: Box<Job>,
    },
}

impl RelayError {
    /// HTTP status the router answers with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::InvalidRequest(_) => 400,
            RelayError::Provider(err) => err.status().unwrap_or(500),
            RelayError::JobTimeout { .. } => 504,
            RelayError::Config(_) | RelayError::JobFailed { .. } => 500,
        }
    }

    /// Diagnostic payload forwarded to the caller as `detail`.
    pub fn detail(&self) -> Option<serde_json::Value> {
        match self {
            RelayError::Provider(err) => err.payload().cloned(),
            RelayError::JobFailed { job, .. } | RelayError::JobTimeout { job, .. } => {
                Some(job.raw.clone())
            }
            RelayError::Config(_) | RelayError::InvalidRequest(_) => None,
        }
    }
}
