//! Offline driver: run every known content item through the pipeline and
//! dump the results to a JSON file.
//!
//! Items run strictly one after another. A failing item is logged and
//! recorded as [`ItemOutcome::Failure`]; it never stops the batch.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use crate::insight::InsightGenerator;
use crate::store::{ContentStore, EngineOutput};

/// The upstream analytics step that produces engine outputs.
#[async_trait]
pub trait BaseEngine: Send + Sync {
    /// Every content id the performance data knows about, in source order.
    fn content_ids(&self) -> Vec<String>;

    async fn run(&self, content_id: &str) -> Result<EngineOutput>;
}

/// Replays precomputed engine outputs from a [`ContentStore`].
pub struct StoreEngine {
    store: Arc<ContentStore>,
}

impl StoreEngine {
    pub fn new(store: Arc<ContentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BaseEngine for StoreEngine {
    fn content_ids(&self) -> Vec<String> {
        self.store.list_ids().into_iter().map(String::from).collect()
    }

    async fn run(&self, content_id: &str) -> Result<EngineOutput> {
        self.store
            .get(content_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no engine output for {}", content_id))
    }
}

/// What each item goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pipeline {
    /// Base engine only; results are engine outputs.
    Base,
    /// Base engine output chained into the insight generator.
    Insight,
}

/// Result of one batch item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    Success { content_id: String, output: Value },
    Failure { content_id: String, error: String },
}

impl ItemOutcome {
    pub fn content_id(&self) -> &str {
        match self {
            Self::Success { content_id, .. } | Self::Failure { content_id, .. } => content_id,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Successful outputs, in batch order.
pub fn successes(outcomes: &[ItemOutcome]) -> Vec<Value> {
    outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            ItemOutcome::Success { output, .. } => Some(output.clone()),
            ItemOutcome::Failure { .. } => None,
        })
        .collect()
}

pub struct BatchRunner {
    engine: Arc<dyn BaseEngine>,
    insights: Option<Arc<InsightGenerator>>,
    only: Option<Vec<String>>,
}

impl BatchRunner {
    /// Engine outputs only.
    pub fn base(engine: Arc<dyn BaseEngine>) -> Self {
        Self {
            engine,
            insights: None,
            only: None,
        }
    }

    /// Engine outputs fed into the insight generator.
    pub fn insight(engine: Arc<dyn BaseEngine>, insights: Arc<InsightGenerator>) -> Self {
        Self {
            engine,
            insights: Some(insights),
            only: None,
        }
    }

    /// Restrict the batch to these ids. Ids the engine does not know are
    /// skipped, not failed.
    pub fn only(mut self, ids: Vec<String>) -> Self {
        self.only = Some(ids);
        self
    }

    pub fn pipeline(&self) -> Pipeline {
        if self.insights.is_some() {
            Pipeline::Insight
        } else {
            Pipeline::Base
        }
    }

    fn selected_ids(&self) -> Vec<String> {
        let known = self.engine.content_ids();
        match &self.only {
            None => known,
            Some(ids) => ids
                .iter()
                .filter(|id| {
                    let present = known.contains(*id);
                    if !present {
                        tracing::info!(content_id = %id, "skipping missing content_id");
                    }
                    present
                })
                .cloned()
                .collect(),
        }
    }

    async fn run_one(&self, content_id: &str) -> Result<Value> {
        let output = self.engine.run(content_id).await?;
        match &self.insights {
            None => Ok(output.to_value()),
            Some(insights) => Ok(insights.generate(&output).await?.to_value()),
        }
    }

    /// Run every selected id, one at a time.
    pub async fn run_for_all(&self) -> Vec<ItemOutcome> {
        let ids = self.selected_ids();
        let mut outcomes = Vec::with_capacity(ids.len());

        for content_id in ids {
            let outcome = match self.run_one(&content_id).await {
                Ok(output) => {
                    tracing::debug!(content_id = %content_id, "item done");
                    ItemOutcome::Success { content_id, output }
                }
                Err(e) => {
                    tracing::warn!(content_id = %content_id, error = %e, "item failed");
                    ItemOutcome::Failure {
                        content_id,
                        error: e.to_string(),
                    }
                }
            };
            outcomes.push(outcome);
        }

        outcomes
    }
}

/// Write results as an indented JSON array, replacing any existing file.
pub fn write_results(path: impl AsRef<Path>, results: &[Value]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
