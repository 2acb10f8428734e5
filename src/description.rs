//! Brand descriptions for processed images.
//!
//! A second provider (Gemini `generateContent`) looks at the submitted image
//! and writes an appraisal-style description. It only applies to images sent
//! inline as `data:` URLs; remote URLs are not fetched.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::DescriptionConfig;
use crate::error::RelayError;
use crate::provider::ProviderError;

pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_DESCRIPTION_MODEL: &str = "gemini-2.0-flash";

const APPRAISAL_PROMPT: &str =
    "Analyze this item as a brand appraiser and describe its details in Japanese.";

/// Image bytes carried inline in the request, still base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl InlineImage {
    /// Split a `data:<mime>;base64,<payload>` URL. Anything else yields `None`.
    pub fn from_data_url(url: &str) -> Option<Self> {
        let rest = url.trim().strip_prefix("data:")?;
        let (meta, data) = rest.split_once(',')?;
        let mime_type = meta.strip_suffix(";base64")?;
        if data.is_empty() {
            return None;
        }
        let mime_type = if mime_type.is_empty() {
            "image/jpeg"
        } else {
            mime_type
        };
        Some(Self {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        })
    }
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 2],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum RequestPart<'a> {
    Text(&'a str),
    InlineData(InlineData<'a>),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DescriptionClient {
    api_key: String,
    client: Client,
    base_url: String,
    model: String,
}

impl DescriptionClient {
    /// Validate the key and build the HTTP client. A blank key is rejected.
    pub fn new(config: &DescriptionConfig) -> Result<Self, RelayError> {
        let api_key = config.api_key.trim();
        if api_key.is_empty() {
            return Err(RelayError::Config(
                "missing GEMINI_API_KEY (set it in the environment or relay.toml)".into(),
            ));
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(ProviderError::from)?;

        Ok(Self {
            api_key: api_key.to_string(),
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.trim().to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask the model for a description of `image`. Returns the text of the
    /// first candidate, its parts joined.
    pub async fn describe(&self, image: &InlineImage) -> Result<String, ProviderError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = GenerateContentRequest {
            contents: [RequestContent {
                parts: [
                    RequestPart::Text(APPRAISAL_PROMPT),
                    RequestPart::InlineData(InlineData {
                        mime_type: &image.mime_type,
                        data: &image.data,
                    }),
                ],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::from_body(status.as_u16(), &text));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::Parse(format!("description is not JSON: {e}")))?;
        let description: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        if description.trim().is_empty() {
            return Err(ProviderError::Parse("description response has no text".into()));
        }
        Ok(description)
    }
}
