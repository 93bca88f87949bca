pub mod mock;
pub mod ollama;

use async_trait::async_trait;

/// Errors from a completion call. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("model server returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("model reply has no `response` field")]
    MissingResponse,
    #[error("model unavailable: {0}")]
    Unavailable(String),
}

/// A text-completion endpoint. Takes a prompt, returns the raw reply text.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn query(&self, prompt: &str) -> Result<String, ModelError>;
}
