use std::time::Duration;

use tokio::time::Instant;
use tracing::{Instrument, info, info_span};

use crate::config::RelayConfig;
use crate::description::{DescriptionClient, InlineImage};
use crate::envelope::ResultEnvelope;
use crate::error::RelayError;
use crate::prediction::{JobSpec, negotiator, poller};
use crate::provider::{Job, PredictionApi, PredictionClient};

/// Polling and response parameters for one relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelaySettings {
    /// Total wait, measured from the first creation attempt.
    pub deadline: Duration,
    /// Fixed wait between status fetches.
    pub poll_interval: Duration,
    /// Attach the raw provider job to success envelopes.
    pub include_raw: bool,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(120),
            poll_interval: Duration::from_millis(1500),
            include_raw: false,
        }
    }
}

/// Submits jobs to a provider and waits for their outcome.
///
/// Holds no per-request state; one instance serves all concurrent requests.
pub struct Relay<P> {
    api: P,
    settings: RelaySettings,
    describer: Option<DescriptionClient>,
}

impl Relay<PredictionClient> {
    /// Build a relay backed by the HTTP provider client.
    /// Fails before any network I/O if the credential is missing or blank.
    ///
    /// Brand descriptions are enabled only when a description key is set.
    pub fn from_config(config: &RelayConfig) -> Result<Self, RelayError> {
        let client = PredictionClient::new(&config.provider)?;
        let relay = Self::new(client, config.relay_settings());
        if !config.description.is_enabled() {
            info!("no description key configured, brand descriptions disabled");
            return Ok(relay);
        }
        Ok(relay.with_describer(DescriptionClient::new(&config.description)?))
    }
}

impl<P: PredictionApi> Relay<P> {
    pub fn new(api: P, settings: RelaySettings) -> Self {
        Self {
            api,
            settings,
            describer: None,
        }
    }

    pub fn with_describer(mut self, describer: DescriptionClient) -> Self {
        self.describer = Some(describer);
        self
    }

    pub fn describer(&self) -> Option<&DescriptionClient> {
        self.describer.as_ref()
    }

    pub fn api(&self) -> &P {
        &self.api
    }

    pub fn settings(&self) -> &RelaySettings {
        &self.settings
    }

    /// Create the job, then poll it until terminal or the deadline.
    pub async fn run(&self, spec: &JobSpec) -> Result<Job, RelayError> {
        let deadline = Instant::now() + self.settings.deadline;
        let span = info_span!("prediction", kind = ?spec.kind(), model = spec.model_identifier());

        async {
            let created = negotiator::create_job(&self.api, spec).await?;
            info!(job_id = %created.id, status = %created.status, "prediction created");
            poller::settle(&self.api, created, deadline, self.settings.poll_interval).await
        }
        .instrument(span)
        .await
    }

    /// Run `spec` and normalize the outcome into `(HTTP status, envelope)`.
    pub async fn submit_and_wait(&self, spec: &JobSpec) -> (u16, ResultEnvelope) {
        let result = self.run(spec).await;
        ResultEnvelope::from_result(result, self.settings.include_raw)
    }

    /// Run an image job and, alongside it, describe the source image.
    ///
    /// The description is requested only when a describer is configured and
    /// `image_url` is an inline `data:` URL. If either call fails the whole
    /// request fails, with the job's error taking precedence.
    pub async fn process_image(&self, spec: &JobSpec, image_url: &str) -> (u16, ResultEnvelope) {
        let image = InlineImage::from_data_url(image_url);
        let (Some(describer), Some(image)) = (&self.describer, image) else {
            return self.submit_and_wait(spec).await;
        };

        let (result, description) = tokio::join!(self.run(spec), describer.describe(&image));
        let include_raw = self.settings.include_raw;
        match (result, description) {
            (Ok(job), Ok(text)) => {
                info!(model = describer.model(), "brand description attached");
                (200, ResultEnvelope::success(job, include_raw).with_description(text))
            }
            (Err(err), _) => ResultEnvelope::failure(&err),
            (Ok(_), Err(err)) => ResultEnvelope::failure(&RelayError::from(err)),
        }
    }
}
