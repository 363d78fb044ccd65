//! OpenAI embeddings endpoint client

use super::config::{API_KEY_ENV, EmbeddingConfig};
use super::provider::{EmbeddingProvider, ProviderError};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Blocking client for `POST {base_url}/embeddings`
pub struct OpenAiEmbeddingProvider {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl OpenAiEmbeddingProvider {
    /// Build a client; fails without an API key so that no request is ever sent unauthenticated
    pub fn new(config: &EmbeddingConfig) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ProviderError::MissingCredential(format!("{API_KEY_ENV} is not set")))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_key,
            endpoint: format!("{}/embeddings", config.base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl EmbeddingProvider for OpenAiEmbeddingProvider {
    fn create_embedding(&self, text: &str, model: &str) -> Result<Vec<f32>, ProviderError> {
        debug!("embedding request: model={}, {} chars", model, text.len());
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest { model, input: text })
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(ProviderError::api(status.as_u16(), body));
        }

        let parsed: EmbeddingResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::invalid_response(format!("cannot parse body: {e}")))?;
        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|embedding| !embedding.is_empty())
            .ok_or_else(|| ProviderError::invalid_response("response contains no embedding"))
    }
}
