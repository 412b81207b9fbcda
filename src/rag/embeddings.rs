use async_trait::async_trait;
use reqwest::Client;

use crate::config::EmbeddingConfig;
use crate::error::{RelayError, UpstreamError};
use crate::models::{EmbeddingRequest, EmbeddingResponse, EmbeddingVector};
use crate::upstream::{client_with_timeout, post_json};

/// Turns a query into a vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, query: &str) -> Result<EmbeddingVector, RelayError>;
}

/// Embedder backed by Ollama's `/api/embeddings` endpoint.
pub struct OllamaEmbedder {
    client: Client,
    url: String,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: client_with_timeout(config.timeout)?,
            url: config.url.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, query: &str) -> Result<EmbeddingVector, RelayError> {
        tracing::debug!("Requesting embedding from {}", self.url);

        let body = EmbeddingRequest {
            prompt: query,
            model: &self.model,
        };
        let response: EmbeddingResponse = post_json(&self.client, &self.url, &body)
            .await
            .map_err(RelayError::EmbeddingUnavailable)?;

        if response.embedding.is_empty() {
            return Err(RelayError::EmbeddingUnavailable(UpstreamError::Malformed(
                "empty embedding".to_string(),
            )));
        }

        Ok(response.embedding)
    }
}
