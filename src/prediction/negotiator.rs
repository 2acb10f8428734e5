use tracing::{debug, warn};

use super::job::JobSpec;
use crate::provider::{Job, PredictionApi, ProviderError};

/// Create a job for `spec`, discovering which request shape the provider accepts.
///
/// Tries the kind's first shape; if the provider rejects it and the kind has a
/// fallback, retries exactly once with the fallback. When both fail, the
/// fallback's error is returned.
pub async fn create_job(api: &impl PredictionApi, spec: &JobSpec) -> Result<Job, ProviderError> {
    let plan = spec.kind().shape_plan();

    debug!(model = spec.model_identifier(), shape = %plan.first, "creating prediction");
    let first_err = match api.create_job(&spec.request(plan.first)).await {
        Ok(job) => return Ok(job),
        Err(err) => err,
    };

    let Some(fallback) = plan.fallback else {
        return Err(first_err);
    };

    warn!(
        model = spec.model_identifier(),
        rejected = %plan.first,
        retry = %fallback,
        error = %first_err,
        "provider rejected request shape, retrying once"
    );
    api.create_job(&spec.request(fallback)).await
}
