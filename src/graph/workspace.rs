use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::GraphConfig;
use crate::store::StoreError;

pub const WORKSPACE_SLOTS: usize = 10;

/// Default file name for exported workspaces
pub const DEFAULT_WORKSPACE_FILE: &str = "workspaces.json";

/// On-disk shape: `{"graphConfig": [config-or-null, ...]}`
#[derive(Serialize, Deserialize)]
struct WorkspaceFile {
    #[serde(rename = "graphConfig", default)]
    graph_config: Vec<Option<GraphConfig>>,
}

/// Ten numbered slots, each optionally holding a whole graph configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workspaces {
    slots: [Option<GraphConfig>; WORKSPACE_SLOTS],
}

impl Serialize for Workspaces {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WorkspaceFile {
            graph_config: self.slots.to_vec(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Workspaces {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let file = WorkspaceFile::deserialize(deserializer)?;
        let mut workspaces = Workspaces::default();
        // short files leave the remaining slots empty, extra entries are ignored
        for (slot, config) in workspaces.slots.iter_mut().zip(file.graph_config) {
            *slot = config;
        }
        Ok(workspaces)
    }
}

impl Workspaces {
    pub fn get(&self, slot: usize) -> Option<&GraphConfig> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// Store a copy of `config` in `slot`. Returns false for an invalid slot.
    pub fn store(&mut self, slot: usize, config: &GraphConfig) -> bool {
        match self.slots.get_mut(slot) {
            Some(entry) => {
                *entry = Some(config.sanitized());
                true
            }
            None => false,
        }
    }

    /// Indices of the slots that hold a configuration
    pub fn occupied(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots.iter().enumerate().filter(|(_, s)| s.is_some()).map(|(i, _)| i)
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn read_file(path: &Path) -> Result<Self, StoreError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn write_file(&self, path: &Path) -> Result<(), StoreError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Field, Graph};

    fn sample() -> GraphConfig {
        GraphConfig::new(vec![Graph::new("Motors", vec![Field::new("motor[0]", "#f00")])])
    }

    #[test]
    fn test_wire_format_has_ten_slots() {
        let mut workspaces = Workspaces::default();
        workspaces.store(3, &sample());

        let value: serde_json::Value = serde_json::from_str(&workspaces.to_json().unwrap()).unwrap();
        let slots = value["graphConfig"].as_array().unwrap();
        assert_eq!(slots.len(), WORKSPACE_SLOTS);
        assert!(slots[0].is_null());
        assert_eq!(slots[3][0]["label"], "Motors");
    }

    #[test]
    fn test_short_file_pads_slots() {
        let workspaces = Workspaces::from_json(r#"{"graphConfig": [null, [{"label": "A", "fields": []}]]}"#).unwrap();
        assert!(workspaces.get(0).is_none());
        assert_eq!(workspaces.get(1).unwrap().graphs()[0].label, "A");
        assert!(workspaces.get(9).is_none());
        assert_eq!(workspaces.occupied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_invalid_slot_rejected() {
        let mut workspaces = Workspaces::default();
        assert!(!workspaces.store(10, &sample()));
        assert!(workspaces.get(10).is_none());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_WORKSPACE_FILE);

        let mut workspaces = Workspaces::default();
        workspaces.store(0, &sample());
        workspaces.write_file(&path).unwrap();

        assert_eq!(Workspaces::read_file(&path).unwrap(), workspaces);
    }
}
