use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;

use serde::Deserialize;
use thiserror::Error;

use crate::llm::{AnthropicAdapter, AnthropicClient, ModelEntry, OpenAIClient, Provider};

// ============================================================================
// Config (root)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Extra model keys on top of the built-in table.
    #[serde(default)]
    pub models: Vec<ModelConfig>,
}

impl Config {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = match fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };
        Ok(serde_saphyr::from_str(&contents)?)
    }

    pub fn model_entries(&self) -> impl Iterator<Item = (String, ModelEntry)> + '_ {
        self.models.iter().map(|m| {
            (
                m.key.clone(),
                ModelEntry {
                    provider: m.provider,
                    model: m.model.clone(),
                },
            )
        })
    }
}

// ============================================================================
// ServerConfig
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Directory served at `/` and `/static`.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_request_timeout() -> u64 {
    120
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

// ============================================================================
// ProvidersConfig
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai: OpenAIConfig,
    #[serde(default)]
    pub anthropic: AnthropicConfig,
}

#[derive(Debug, Deserialize)]
pub struct OpenAIConfig {
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: default_openai_base_url(),
        }
    }
}

fn default_openai_base_url() -> String {
    OpenAIClient::DEFAULT_BASE_URL.to_string()
}

#[derive(Debug, Deserialize)]
pub struct AnthropicConfig {
    #[serde(default = "default_anthropic_base_url")]
    pub base_url: String,
    #[serde(default = "default_anthropic_api_version")]
    pub api_version: String,
    #[serde(default = "default_anthropic_max_tokens")]
    pub max_tokens: u32,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            base_url: default_anthropic_base_url(),
            api_version: default_anthropic_api_version(),
            max_tokens: default_anthropic_max_tokens(),
        }
    }
}

fn default_anthropic_base_url() -> String {
    AnthropicClient::DEFAULT_BASE_URL.to_string()
}

fn default_anthropic_api_version() -> String {
    AnthropicClient::DEFAULT_API_VERSION.to_string()
}

fn default_anthropic_max_tokens() -> u32 {
    AnthropicAdapter::DEFAULT_MAX_TOKENS
}

// ============================================================================
// ModelConfig
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ModelConfig {
    pub key: String,
    pub provider: Provider,
    pub model: String,
}

// ============================================================================
// ConfigError
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_saphyr::Error),
}

// ============================================================================
// Tests
// ============================================================================
