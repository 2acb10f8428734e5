use std::str::FromStr;

use serde_json::{Map, Value, json};

use crate::error::RelayError;
use crate::prediction::{JobKind, JobSpec};

pub const TEXT_MODEL: &str = "meta/llama-3-8b-instruct";
pub const IMAGE_MODEL: &str = "black-forest-labs/flux-schnell";
/// Background removal onto plain white.
pub const WHITE_BACKGROUND_MODEL: &str = "lucataco/remove-bg";
/// Background replacement driven by a prompt.
pub const PROMPTED_BACKGROUND_MODEL: &str = "logerzz/background-remover";

/// Generation mode requested by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Text,
    Image,
}

impl FromStr for Mode {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "text" => Ok(Mode::Text),
            "image" => Ok(Mode::Image),
            _ => Err(RelayError::InvalidRequest(
                "mode must be 'text' or 'image'".into(),
            )),
        }
    }
}

impl Mode {
    pub fn kind(&self) -> JobKind {
        match self {
            Mode::Text => JobKind::TextGeneration,
            Mode::Image => JobKind::ImageGeneration,
        }
    }

    pub fn model(&self) -> &'static str {
        match self {
            Mode::Text => TEXT_MODEL,
            Mode::Image => IMAGE_MODEL,
        }
    }

    /// Model input defaults for this mode, before caller overrides.
    fn defaults(&self, prompt: &str) -> Map<String, Value> {
        let mut input = Map::new();
        input.insert("prompt".into(), json!(prompt));
        if *self == Mode::Text {
            input.insert("max_new_tokens".into(), json!(450));
            input.insert("temperature".into(), json!(0.6));
        }
        input
    }

    /// Build the job for `prompt`. Keys in `input` override the mode defaults;
    /// an `input` that is not a JSON object is ignored.
    pub fn spec(&self, prompt: &str, input: Option<&Value>) -> Result<JobSpec, RelayError> {
        if prompt.trim().is_empty() {
            return Err(RelayError::InvalidRequest("prompt is required".into()));
        }
        let overrides = match input {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        };
        Ok(JobSpec::new(
            self.kind(),
            self.model(),
            self.defaults(prompt),
            overrides,
        ))
    }
}

/// Build a background-removal job. `bg_type == "white"` selects the plain
/// white model; anything else is passed as the background prompt.
pub fn background_removal_spec(
    image_url: &str,
    bg_type: Option<&str>,
) -> Result<JobSpec, RelayError> {
    if image_url.trim().is_empty() {
        return Err(RelayError::InvalidRequest("image_url is required".into()));
    }

    let model = match bg_type {
        Some("white") => WHITE_BACKGROUND_MODEL,
        _ => PROMPTED_BACKGROUND_MODEL,
    };

    let mut input = Map::new();
    input.insert("image".into(), json!(image_url));
    if let Some(bg_type) = bg_type {
        input.insert("background_prompt".into(), json!(bg_type));
    }

    Ok(JobSpec::new(
        JobKind::ImageBackgroundRemoval,
        model,
        input,
        Map::new(),
    ))
}
