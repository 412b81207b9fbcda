use async_trait::async_trait;
use reqwest::Client;

use crate::config::GenerationConfig;
use crate::error::RelayError;
use crate::models::{GenerateRequest, GenerateResponse};
use crate::prompt::GenerationPrompt;
use crate::upstream::{client_with_timeout, post_json};

/// Shown to the user when the generation service answered without text.
pub const FALLBACK_RESPONSE: &str = "I couldn't generate a response.";

#[async_trait]
pub trait Generator: Send + Sync {
    /// `Ok(None)` means the service succeeded but produced no answer text.
    async fn generate(&self, prompt: &GenerationPrompt) -> Result<Option<String>, RelayError>;
}

/// Non-streaming client for Ollama's `/api/generate`.
pub struct OllamaGenerator {
    client: Client,
    url: String,
    model: String,
}

impl OllamaGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: client_with_timeout(config.timeout)?,
            url: config.url.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    async fn generate(&self, prompt: &GenerationPrompt) -> Result<Option<String>, RelayError> {
        tracing::info!("Sending prompt to Ollama at {}", self.url);

        let body = GenerateRequest {
            prompt: prompt.as_str(),
            model: &self.model,
            stream: false,
        };
        let response: GenerateResponse = post_json(&self.client, &self.url, &body)
            .await
            .map_err(RelayError::GenerationFailed)?;

        Ok(response.response)
    }
}
