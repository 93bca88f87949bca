use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{ModelClient, ModelError};

/// A scripted model for tests. Returns pre-defined replies in order and
/// remembers every prompt it was given.
pub struct MockModel {
    replies: Vec<String>,
    index: AtomicUsize,
    prompts: Mutex<Vec<String>>,
    available: bool,
}

impl MockModel {
    pub fn new<S: Into<String>>(replies: impl IntoIterator<Item = S>) -> Self {
        Self {
            replies: replies.into_iter().map(Into::into).collect(),
            index: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            available: true,
        }
    }

    /// A model whose every call fails like an unreachable server.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new(Vec::<String>::new())
        }
    }

    /// Number of times `query` was called.
    pub fn calls(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ModelClient for MockModel {
    async fn query(&self, prompt: &str) -> Result<String, ModelError> {
        let i = self.index.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        if !self.available {
            return Err(ModelError::Unavailable("connection refused".to_string()));
        }
        self.replies.get(i).cloned().ok_or_else(|| {
            ModelError::Unavailable(format!("MockModel: no more replies (called {} times)", i + 1))
        })
    }
}
