use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{PrefStore, StoreError};

/// Preference store backed by a single JSON document on disk.
///
/// The whole document is rewritten on every `set`, which is fine because
/// writes only happen on user confirmation.
pub struct JsonFileStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl JsonFileStore {
    /// Default location under the user's config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("blackbox-timeline").join("prefs.json"))
    }

    /// Open a store at the given path.
    ///
    /// A missing or unreadable file starts an empty store rather than failing,
    /// the same way a fresh install has no preferences yet.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Map<String, Value>>(&contents) {
                Ok(values) => values,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "preference file is corrupt, starting empty");
                    Map::new()
                }
            },
            Err(_) => {
                debug!(path = %path.display(), "no preference file yet");
                Map::new()
            }
        };

        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl PrefStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");

        let mut store = JsonFileStore::open(&path);
        assert!(store.get("offsetCache").is_none());
        store.set("offsetCache", json!([{"log": "a.csv"}])).unwrap();

        let reopened = JsonFileStore::open(&path);
        assert_eq!(reopened.get("offsetCache"), Some(json!([{"log": "a.csv"}])));
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "{not json").unwrap();

        let store = JsonFileStore::open(&path);
        assert!(store.get("graphConfig").is_none());
    }
}
