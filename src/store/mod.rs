//! Durable preference storage.
//!
//! Graph configurations, workspace slots, the offset cache and display
//! toggles are written through [`PrefStore`]. Writes happen only at explicit
//! confirmation points, never per frame.

pub mod json_file;

pub use json_file::JsonFileStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::io;
use thiserror::Error;
use tracing::warn;

/// Keys used for persisted state
pub mod keys {
    pub const GRAPH_CONFIG: &str = "graphConfig";
    pub const WORKSPACES: &str = "workspaceGraphConfigs";
    pub const OFFSET_CACHE: &str = "offsetCache";
    pub const VIEW_SETTINGS: &str = "viewSettings";
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access preference file: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to encode preferences: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key/value preference storage
pub trait PrefStore: Send {
    /// Get the stored value for a key
    fn get(&self, key: &str) -> Option<Value>;

    /// Store a value under a key
    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError>;
}

/// Read and decode a stored value, treating malformed entries as absent.
pub fn load<T: DeserializeOwned>(store: &dyn PrefStore, key: &str) -> Option<T> {
    let value = store.get(key)?;
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            warn!(key, error = %e, "ignoring malformed stored preference");
            None
        }
    }
}

/// Encode and store a value. Failures are logged, never propagated.
pub fn persist<T: Serialize>(store: &mut dyn PrefStore, key: &str, value: &T) {
    let result = serde_json::to_value(value)
        .map_err(StoreError::from)
        .and_then(|v| store.set(key, v));

    if let Err(e) = result {
        warn!(key, error = %e, "failed to persist preference");
    }
}

/// In-memory store, used when persistence is disabled and in tests
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PrefStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_load_ignores_malformed_value() {
        let mut store = MemoryStore::new();
        store.set("n", json!("not a number")).unwrap();

        let value: Option<u32> = load(&store, "n");
        assert!(value.is_none());
    }

    #[test]
    fn test_persist_then_load() {
        let mut store = MemoryStore::new();
        persist(&mut store, "list", &vec![1, 2, 3]);

        let value: Option<Vec<u32>> = load(&store, "list");
        assert_eq!(value, Some(vec![1, 2, 3]));
        assert_eq!(store.len(), 1);
    }
}
