use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use super::error::ProviderError;
use super::types::{CreateJobRequest, Job};
use crate::config::ProviderConfig;
use crate::error::RelayError;

pub const API_URL: &str = "https://api.replicate.com/v1";

/// Job-oriented compute API: create a prediction, then look it up by id.
pub trait PredictionApi {
    fn create_job(
        &self,
        req: &CreateJobRequest,
    ) -> impl Future<Output = Result<Job, ProviderError>> + Send;

    fn get_job(&self, id: &str) -> impl Future<Output = Result<Job, ProviderError>> + Send;
}

#[derive(Debug, Clone)]
pub struct PredictionClient {
    api_token: String,
    client: Client,
    base_url: String,
}

impl PredictionClient {
    /// Validate the credential and build the HTTP client.
    ///
    /// A token that is empty after trimming is rejected here, before any
    /// request can be issued.
    pub fn new(config: &ProviderConfig) -> Result<Self, RelayError> {
        let api_token = config.api_token.trim();
        if api_token.is_empty() {
            return Err(RelayError::Config(
                "missing REPLICATE_API_TOKEN (set it in the environment or relay.toml)".into(),
            ));
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(ProviderError::from)?;

        Ok(Self {
            api_token: api_token.to_string(),
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn handle_response(response: reqwest::Response) -> Result<Job, ProviderError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ProviderError::from_body(status.as_u16(), &body));
        }

        let raw: Value = serde_json::from_str(&body)
            .map_err(|e| ProviderError::Parse(format!("response is not JSON: {e}")))?;
        Job::from_value(raw)
    }
}

impl PredictionApi for PredictionClient {
    async fn create_job(&self, req: &CreateJobRequest) -> Result<Job, ProviderError> {
        let url = format!("{}/predictions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(req)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    async fn get_job(&self, id: &str) -> Result<Job, ProviderError> {
        let url = format!("{}/predictions/{}", self.base_url, id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        Self::handle_response(response).await
    }
}
