//! Read-only content store: content id -> precomputed engine output.
//!
//! Populated once at startup (from a JSON file or from in-memory entries) and
//! shared behind an `Arc`. Iteration order is the order of the source.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Why a JSON value could not become an [`EngineOutput`].
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("record has no string `content_id` field")]
    MissingContentId,
}

/// Errors from loading a [`ContentStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read content store {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("content store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("content store must be a JSON object keyed by content id")]
    NotAnObject,
    #[error("invalid engine output for {key:?}: {source}")]
    InvalidRecord { key: String, source: RecordError },
}

/// Performance signals computed by the base engine for one piece of content.
///
/// Opaque apart from the `content_id` field, which is guaranteed to be
/// present. Field order is kept as loaded so prompts render stably.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct EngineOutput {
    content_id: String,
    fields: Map<String, Value>,
}

impl EngineOutput {
    pub fn content_id(&self) -> &str {
        &self.content_id
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Clone into a plain JSON value.
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

impl TryFrom<Map<String, Value>> for EngineOutput {
    type Error = RecordError;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let content_id = fields
            .get("content_id")
            .and_then(Value::as_str)
            .ok_or(RecordError::MissingContentId)?
            .to_string();
        Ok(Self { content_id, fields })
    }
}

impl TryFrom<Value> for EngineOutput {
    type Error = RecordError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Self::try_from(fields),
            _ => Err(RecordError::NotAnObject),
        }
    }
}

impl Serialize for EngineOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

/// Ordered, immutable mapping from content id to [`EngineOutput`].
#[derive(Debug, Default)]
pub struct ContentStore {
    entries: Vec<(String, EngineOutput)>,
    index: HashMap<String, usize>,
}

impl ContentStore {
    /// Build from `(id, output)` pairs. A repeated id keeps its first
    /// position and its last record.
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, EngineOutput)>,
        K: Into<String>,
    {
        let mut store = Self::default();
        for (id, output) in entries {
            let id = id.into();
            match store.index.get(&id) {
                Some(&i) => store.entries[i].1 = output,
                None => {
                    store.index.insert(id.clone(), store.entries.len());
                    store.entries.push((id, output));
                }
            }
        }
        store
    }

    /// Parse a JSON object of `id -> engine output`.
    pub fn from_json_str(json: &str) -> Result<Self, StoreError> {
        let Value::Object(map) = serde_json::from_str::<Value>(json)? else {
            return Err(StoreError::NotAnObject);
        };

        let entries = map
            .into_iter()
            .map(|(key, value)| match EngineOutput::try_from(value) {
                Ok(output) => Ok((key, output)),
                Err(source) => Err(StoreError::InvalidRecord { key, source }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_entries(entries))
    }

    /// Load the store from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_json_str(&json)?;
        tracing::info!(path = %path.display(), items = store.len(), "content store loaded");
        Ok(store)
    }

    /// All known ids, in store order.
    pub fn list_ids(&self) -> Vec<&str> {
        self.entries.iter().map(|(id, _)| id.as_str()).collect()
    }

    pub fn get(&self, id: &str) -> Option<&EngineOutput> {
        self.index.get(id).map(|&i| &self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
