use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;

use super::{ModelClient, ModelError};

/// Calls a local Ollama `/api/generate` endpoint with streaming disabled.
///
/// One request per prompt. No retry and no request timeout: a hung model
/// server blocks the caller until the connection drops.
pub struct OllamaClient {
    config: ModelConfig,
    http: reqwest::Client,
}

impl OllamaClient {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ModelClient for OllamaClient {
    async fn query(&self, prompt: &str) -> Result<String, ModelError> {
        let body = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
        };

        tracing::debug!(
            url = %self.config.url,
            model = %self.config.model,
            prompt_chars = prompt.len(),
            "querying model"
        );

        let resp = self.http.post(&self.config.url).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ModelError::Status { status, body });
        }

        let reply: GenerateResponse = resp.json().await?;
        let text = reply.response.ok_or(ModelError::MissingResponse)?;

        tracing::debug!(reply_chars = text.len(), "model replied");
        Ok(text)
    }
}

// --- API types ---

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}
