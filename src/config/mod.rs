//! Runtime configuration passed into the library at construction time.
//!
//! The binary fills these from CLI flags and environment variables; tests
//! build them directly.

use std::net::SocketAddr;

use anyhow::{Context, Result};

use crate::consts::{DEFAULT_MODEL, DEFAULT_OLLAMA_URL};

/// Where and what to ask for completions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    /// Full URL of the generation endpoint (e.g. `.../api/generate`).
    pub url: String,
    /// Model identifier sent with every request.
    pub model: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// HTTP service settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
}

impl ServerConfig {
    /// Parse a `host:port` bind address.
    pub fn from_bind(bind: &str) -> Result<Self> {
        let bind = bind
            .parse()
            .with_context(|| format!("invalid bind address: {}", bind))?;
        Ok(Self { bind })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
        }
    }
}
