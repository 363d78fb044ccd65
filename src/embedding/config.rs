//! Embedding configuration read from the environment

use super::error::{EmbeddingError, Result};
use crate::text::chunking::{ChunkingConfig, DEFAULT_MAX_CHUNK_TOKENS};
use serde::Deserialize;

pub const DEFAULT_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_max_tokens() -> usize {
    DEFAULT_MAX_CHUNK_TOKENS
}
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    60
}

/// Settings for embedding requests.
///
/// Read from `EMBEDDING_MODEL`, `EMBEDDING_MAX_TOKENS`, `EMBEDDING_API_KEY`,
/// `EMBEDDING_BASE_URL` and `EMBEDDING_TIMEOUT_SECS`; the API key falls back to
/// `OPENAI_API_KEY`.
#[derive(Deserialize, Clone, PartialEq, Eq)]
pub struct EmbeddingConfig {
    #[serde(default = "default_model")]
    pub model: String,
    /// Token budget per provider call, below the model's hard limit
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            api_key: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// keep the key out of logs
impl std::fmt::Debug for EmbeddingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingConfig")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl EmbeddingConfig {
    /// Load from the process environment, reading a `.env` file first if present
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("loaded environment from {:?}", path);
        }
        Self::from_vars(std::env::vars())
    }

    /// Load from explicit `(name, value)` pairs
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: Vec<(String, String)> = vars.into_iter().collect();
        let mut config: EmbeddingConfig = envy::prefixed("EMBEDDING_")
            .from_iter(vars.iter().cloned())
            .map_err(|e| EmbeddingError::configuration(format!("invalid embedding config: {e}")))?;
        // an empty explicit key does not shadow OPENAI_API_KEY
        config.api_key = config.api_key.filter(|key| !key.is_empty());
        if config.api_key.is_none() {
            config.api_key = vars
                .into_iter()
                .find(|(name, _)| name == API_KEY_ENV)
                .map(|(_, value)| value)
                .filter(|value| !value.is_empty());
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(EmbeddingError::configuration("model must not be empty"));
        }
        if self.max_tokens == 0 {
            return Err(EmbeddingError::configuration(
                "max_tokens must be greater than 0",
            ));
        }
        Ok(())
    }

    pub fn chunking_config(&self) -> ChunkingConfig {
        ChunkingConfig::for_budget(self.max_tokens)
    }
}
