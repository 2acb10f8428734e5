//! Tipos de dados para requisições e respostas da API de predições.
//!
//! O corpo de criação aceita duas formas mutuamente exclusivas para a
//! referência do modelo (`version` ou `model`), representadas por [`ModelRef`].
//! As respostas são mantidas também como JSON bruto para diagnóstico.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::error::ProviderError;

/// Referência ao modelo no corpo de criação.
///
/// Serializada como uma única chave: `{"version": "..."}` ou `{"model": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelRef {
    Version(String),
    Model(String),
}

/// Corpo da requisição para `POST /predictions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateJobRequest {
    /// Referência ao modelo, achatada no objeto de nível superior.
    #[serde(flatten)]
    pub model: ModelRef,
    /// Parâmetros repassados ao modelo sem alteração.
    pub input: Map<String, Value>,
}

/// Lifecycle status of a remote job, collapsed from the provider's vocabulary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Pending,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

impl JobStatus {
    /// Map a provider status string onto the relay's status set.
    /// Unknown strings are treated as still running.
    pub fn from_provider(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "starting" | "pending" | "queued" => JobStatus::Pending,
            "processing" | "running" => JobStatus::Processing,
            "succeeded" | "successful" | "completed" => JobStatus::Succeeded,
            "failed" | "error" => JobStatus::Failed,
            "canceled" | "cancelled" | "aborted" => JobStatus::Canceled,
            _ => JobStatus::Processing,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
            JobStatus::Canceled => "canceled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Succeeded | JobStatus::Failed | JobStatus::Canceled
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JobStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(JobStatus::from_provider(&raw))
    }
}

/// Provider-side handle for one prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    /// Present once the job has succeeded. Shape is model-defined.
    pub output: Option<Value>,
    /// Present when the job failed or was canceled.
    pub error_detail: Option<Value>,
    /// The provider's JSON object as received.
    pub raw: Value,
}

#[derive(Deserialize)]
struct JobFields {
    id: String,
    #[serde(default)]
    status: Option<JobStatus>,
    #[serde(default)]
    output: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

impl Job {
    /// Interpret a provider JSON object as a job. Fails if `id` is missing.
    pub fn from_value(raw: Value) -> Result<Self, ProviderError> {
        let fields = JobFields::deserialize(&raw)
            .map_err(|e| ProviderError::Parse(format!("not a prediction object: {e}")))?;
        Ok(Self {
            id: fields.id,
            status: fields.status.unwrap_or_default(),
            output: fields.output,
            error_detail: fields.error,
            raw,
        })
    }
}
