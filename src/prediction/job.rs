use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::provider::{CreateJobRequest, ModelRef};

/// What a job produces. Decides which request shapes creation may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobKind {
    TextGeneration,
    ImageGeneration,
    ImageBackgroundRemoval,
}

/// How the model reference is expressed in the creation body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestShape {
    /// `{"version": <model>, "input": ...}`
    Version,
    /// `{"model": <model>, "input": ...}`
    Model,
}

impl std::fmt::Display for RequestShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestShape::Version => write!(f, "version"),
            RequestShape::Model => write!(f, "model"),
        }
    }
}

/// Ordered creation attempts for a job kind: one shape, optionally one fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapePlan {
    pub first: RequestShape,
    pub fallback: Option<RequestShape>,
}

impl JobKind {
    /// Generation kinds reference community models whose accepted shape
    /// differs between API deployments, so they try `version` then `model`.
    /// Background removal always names a fixed model and only uses `model`.
    pub fn shape_plan(&self) -> ShapePlan {
        match self {
            JobKind::TextGeneration | JobKind::ImageGeneration => ShapePlan {
                first: RequestShape::Version,
                fallback: Some(RequestShape::Model),
            },
            JobKind::ImageBackgroundRemoval => ShapePlan {
                first: RequestShape::Model,
                fallback: None,
            },
        }
    }
}

/// Provider-agnostic description of one unit of work.
///
/// Built once per request and never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSpec {
    kind: JobKind,
    model_identifier: String,
    parameters: Map<String, Value>,
}

impl JobSpec {
    /// Merge `overrides` on top of `defaults`; overriding keys win.
    pub fn new(
        kind: JobKind,
        model_identifier: impl Into<String>,
        defaults: Map<String, Value>,
        overrides: Map<String, Value>,
    ) -> Self {
        let mut parameters = defaults;
        parameters.extend(overrides);
        Self {
            kind,
            model_identifier: model_identifier.into(),
            parameters,
        }
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    pub fn model_identifier(&self) -> &str {
        &self.model_identifier
    }

    pub fn parameters(&self) -> &Map<String, Value> {
        &self.parameters
    }

    /// Creation body for this spec in the given shape.
    pub fn request(&self, shape: RequestShape) -> CreateJobRequest {
        let model = match shape {
            RequestShape::Version => ModelRef::Version(self.model_identifier.clone()),
            RequestShape::Model => ModelRef::Model(self.model_identifier.clone()),
        };
        CreateJobRequest {
            model,
            input: self.parameters.clone(),
        }
    }
}
