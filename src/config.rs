//! Configuração do relay carregada a partir de `relay.toml`.
//!
//! A struct [`RelayConfig`] contém todos os parâmetros configuráveis.
//! Valores não presentes no arquivo usam defaults sensíveis.
//! Variáveis de ambiente têm precedência sobre o arquivo e são lidas uma
//! única vez, na inicialização.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::description::{DEFAULT_DESCRIPTION_MODEL, GEMINI_API_URL};
use crate::provider::client::API_URL;
use crate::relay::RelaySettings;

/// Nome do arquivo procurado no diretório atual quando `--config` não é passado.
pub const DEFAULT_CONFIG_FILE: &str = "relay.toml";

/// Configuração de nível superior carregada de `relay.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Endereço em que o servidor HTTP escuta.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Prazo total para um job, contado a partir da primeira submissão.
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,

    /// Intervalo fixo entre consultas de status.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Anexa o job bruto do provedor às respostas de sucesso (`raw`).
    #[serde(default)]
    pub include_raw: bool,

    /// Parâmetros de acesso ao provedor.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Provedor de descrições de marca. Desativado sem chave.
    #[serde(default)]
    pub description: DescriptionConfig,
}

/// Parâmetros do cliente HTTP do provedor.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Token da API. Validado (após trim) na construção do cliente.
    #[serde(default)]
    pub api_token: String,

    /// URL base da API, sem barra final.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout de cada requisição individual ao provedor.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Parâmetros do cliente de descrição de imagens (Gemini).
#[derive(Debug, Clone, Deserialize)]
pub struct DescriptionConfig {
    /// Chave da API. Vazia (após trim) desativa as descrições.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_description_base_url")]
    pub base_url: String,

    #[serde(default = "default_description_model")]
    pub model: String,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

// Valor padrão para o endereço: "0.0.0.0:10000".
fn default_bind_addr() -> String {
    "0.0.0.0:10000".to_string()
}

// Valor padrão para o prazo: 120s.
fn default_deadline_ms() -> u64 {
    120_000
}

// Valor padrão para o intervalo de polling: 1.5s.
fn default_poll_interval_ms() -> u64 {
    1_500
}

fn default_base_url() -> String {
    API_URL.to_string()
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_description_base_url() -> String {
    GEMINI_API_URL.to_string()
}

fn default_description_model() -> String {
    DEFAULT_DESCRIPTION_MODEL.to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            deadline_ms: default_deadline_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            include_raw: false,
            provider: ProviderConfig::default(),
            description: DescriptionConfig::default(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            base_url: default_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl Default for DescriptionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_description_base_url(),
            model: default_description_model(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl DescriptionConfig {
    /// Descrições só são pedidas quando há uma chave não vazia.
    pub fn is_enabled(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl RelayConfig {
    /// Carrega a configuração e aplica as variáveis de ambiente do processo.
    ///
    /// Sem `path`, usa `relay.toml` do diretório atual se existir, ou os
    /// valores padrão. Um `path` explícito que não existe é um erro.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str::<RelayConfig>(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Sobrepõe valores com as variáveis de ambiente fornecidas por `lookup`.
    ///
    /// Variáveis vazias (após trim) são ignoradas; numéricas inválidas são erro.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(token) = get("REPLICATE_API_TOKEN") {
            self.provider.api_token = token;
        }
        if let Some(url) = get("REPLICATE_BASE_URL") {
            self.provider.base_url = url;
        }
        if let Some(key) = get("GEMINI_API_KEY") {
            self.description.api_key = key;
        }
        if let Some(url) = get("GEMINI_BASE_URL") {
            self.description.base_url = url;
        }
        if let Some(ms) = get("RELAY_DEADLINE_MS") {
            self.deadline_ms = ms
                .parse()
                .with_context(|| format!("RELAY_DEADLINE_MS is not a number: {ms}"))?;
        }
        if let Some(ms) = get("RELAY_POLL_INTERVAL_MS") {
            self.poll_interval_ms = ms
                .parse()
                .with_context(|| format!("RELAY_POLL_INTERVAL_MS is not a number: {ms}"))?;
        }
        if let Some(flag) = get("RELAY_INCLUDE_RAW") {
            self.include_raw = matches!(flag.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(port) = get("PORT") {
            let port: u16 = port
                .parse()
                .with_context(|| format!("PORT is not a valid port: {port}"))?;
            self.bind_addr = format!("0.0.0.0:{port}");
        }

        Ok(())
    }

    /// Rejeita valores que travariam o polling.
    ///
    /// Um intervalo zero faria o relay consultar o provedor sem pausa; um
    /// prazo zero faria todo job expirar antes da primeira consulta.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            bail!("poll_interval_ms must be greater than zero");
        }
        if self.deadline_ms == 0 {
            bail!("deadline_ms must be greater than zero");
        }
        Ok(())
    }

    /// Parâmetros de polling e resposta usados pelo [`Relay`](crate::relay::Relay).
    pub fn relay_settings(&self) -> RelaySettings {
        RelaySettings {
            deadline: Duration::from_millis(self.deadline_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            include_raw: self.include_raw,
        }
    }
}
