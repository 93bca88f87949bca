//! Turns an engine output into a model verdict.
//!
//! The prompt asks the model for JSON. Whatever JSON comes back is passed
//! through untouched; anything else becomes a fallback error record that
//! keeps the raw reply for diagnosis.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::model::{ModelClient, ModelError};
use crate::prompts::insight::build_insight_prompt;
use crate::store::EngineOutput;

pub const ERROR_VERDICT: &str = "error";
pub const INVALID_JSON_REASON: &str = "LLM output invalid JSON";

/// The model's verdict for one piece of content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InsightResult {
    /// The model's own JSON, not validated against any schema.
    Model(Value),
    /// The model replied with something that is not JSON.
    Fallback {
        content_id: String,
        verdict: String,
        primary_reason: String,
        raw_response: String,
    },
}

impl InsightResult {
    fn invalid_json(content_id: &str, raw_response: String) -> Self {
        Self::Fallback {
            content_id: content_id.to_string(),
            verdict: ERROR_VERDICT.to_string(),
            primary_reason: INVALID_JSON_REASON.to_string(),
            raw_response,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Model(value) => value.clone(),
            Self::Fallback { .. } => serde_json::to_value(self).unwrap_or(Value::Null),
        }
    }
}

/// Prompt builder + model client + reply parsing.
pub struct InsightGenerator {
    model: Arc<dyn ModelClient>,
}

impl InsightGenerator {
    pub fn new(model: Arc<dyn ModelClient>) -> Self {
        Self { model }
    }

    /// Ask the model about one engine output.
    ///
    /// Model transport errors are returned as-is; only unparseable replies
    /// are recovered here.
    pub async fn generate(
        &self,
        engine_output: &EngineOutput,
    ) -> Result<InsightResult, ModelError> {
        let prompt = build_insight_prompt(engine_output);
        let raw_response = self.model.query(&prompt).await?;

        match serde_json::from_str::<Value>(&raw_response) {
            Ok(value) => Ok(InsightResult::Model(value)),
            Err(e) => {
                tracing::warn!(
                    content_id = engine_output.content_id(),
                    error = %e,
                    "model output is not valid JSON"
                );
                Ok(InsightResult::invalid_json(
                    engine_output.content_id(),
                    raw_response,
                ))
            }
        }
    }
}
