pub mod client;
pub mod error;
pub mod types;

pub use client::{PredictionApi, PredictionClient};
pub use error::ProviderError;
pub use types::{CreateJobRequest, Job, JobStatus, ModelRef};
