//! Tipos de erro para o cliente do provedor de predições.
//!
//! Define [`ProviderError`] com variantes para rejeições da API, falhas de
//! rede e respostas ilegíveis. Usa `thiserror` para derivar `Display` e `Error`
//! a partir dos atributos `#[error(...)]`.

use serde_json::Value;
use thiserror::Error;

/// Erros que podem ocorrer ao interagir com a API de predições.
///
/// Todas as variantes contam como falha de requisição ao provedor:
/// - [`Api`](ProviderError::Api): o servidor respondeu com status não-2xx
/// - [`Network`](ProviderError::Network): falha na camada de rede
/// - [`Parse`](ProviderError::Parse): corpo de sucesso que não é um job válido
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Erro retornado pela API (ex.: 401 token inválido, 422 versão desconhecida).
    /// `message` vem do campo `detail`, depois `error`, depois o corpo inteiro.
    #[error("provider API error: {status} {message}")]
    Api {
        status: u16,
        message: String,
        payload: Option<Value>,
    },

    /// Falha de rede subjacente (DNS, conexão recusada, timeout).
    #[error("provider network error: {0}")]
    Network(#[from] reqwest::Error),

    /// O provedor respondeu com sucesso, mas o corpo não descreve um job.
    #[error("invalid provider response: {0}")]
    Parse(String),
}

impl ProviderError {
    /// Builds an [`Api`](ProviderError::Api) error from a raw non-2xx body.
    pub fn from_body(status: u16, body: &str) -> Self {
        let payload = serde_json::from_str::<Value>(body).ok();
        let message = payload
            .as_ref()
            .and_then(|json| {
                diagnostic_field(json, "detail").or_else(|| diagnostic_field(json, "error"))
            })
            .unwrap_or_else(|| body.to_string());
        Self::Api {
            status,
            message,
            payload,
        }
    }

    /// HTTP status reported by the provider, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Network(err) => err.status().map(|s| s.as_u16()),
            Self::Parse(_) => None,
        }
    }

    /// Parsed response body, if the provider sent JSON.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Api { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }
}

fn diagnostic_field(json: &Value, key: &str) -> Option<String> {
    let value = json.get(key)?;
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        // Google-style `{"error": {"code", "message", "status"}}`.
        Value::Object(map) => Some(
            map.get("message")
                .and_then(Value::as_str)
                .map_or_else(|| value.to_string(), str::to_string),
        ),
        other => Some(other.to_string()),
    }
}
