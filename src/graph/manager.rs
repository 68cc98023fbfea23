use tracing::{debug, info};

use super::workspace::{Workspaces, WORKSPACE_SLOTS};
use super::GraphConfig;
use crate::store::{self, keys, PrefStore, StoreError};

/// Owns the active graph configuration, the single-level undo buffer and
/// the workspace slots.
///
/// Every mutator returns whether the active configuration changed so the
/// caller knows to re-adapt the renderer and schedule a frame.
#[derive(Debug, Clone, Default)]
pub struct GraphConfigManager {
    active: GraphConfig,
    previous: Option<GraphConfig>,
    workspaces: Workspaces,
}

impl GraphConfigManager {
    pub fn new(active: GraphConfig, workspaces: Workspaces) -> Self {
        Self {
            active,
            previous: None,
            workspaces,
        }
    }

    /// Restore the active configuration and workspace slots from the store.
    ///
    /// The flag is false when no configuration was stored, so the caller can
    /// fall back to an example layout once a log is open.
    pub fn load(store: &dyn PrefStore) -> (Self, bool) {
        let active: Option<GraphConfig> = store::load(store, keys::GRAPH_CONFIG);
        let workspaces: Workspaces = store::load(store, keys::WORKSPACES).unwrap_or_default();
        let restored = active.is_some();
        (Self::new(active.unwrap_or_default(), workspaces), restored)
    }

    pub fn active(&self) -> &GraphConfig {
        &self.active
    }

    pub fn previous(&self) -> Option<&GraphConfig> {
        self.previous.as_ref()
    }

    pub fn workspaces(&self) -> &Workspaces {
        &self.workspaces
    }

    /// Make `config` active, remembering the current one for undo
    pub fn apply(&mut self, config: GraphConfig, store: &mut dyn PrefStore) -> bool {
        let config = config.sanitized();
        self.previous = Some(std::mem::replace(&mut self.active, config));
        store::persist(store, keys::GRAPH_CONFIG, &self.active);
        debug!(graphs = self.active.len(), "graph configuration applied");
        true
    }

    /// Go back to the remembered configuration.
    ///
    /// Undo goes through `apply`, so undoing twice toggles between the last
    /// two configurations.
    pub fn undo(&mut self, store: &mut dyn PrefStore) -> bool {
        match self.previous.clone() {
            Some(previous) => self.apply(previous, store),
            None => false,
        }
    }

    /// Replace the configuration with one graph per field of graph `index`
    pub fn expand(&mut self, index: usize, store: &mut dyn PrefStore) -> bool {
        match self.active.expanded(index) {
            Some(expanded) => self.apply(expanded, store),
            None => {
                debug!(index, "expand ignored, no such graph");
                false
            }
        }
    }

    /// Replace the configuration with just graph `index`.
    ///
    /// With a single graph on screen this acts as undo instead.
    pub fn collapse_to_one(&mut self, index: usize, store: &mut dyn PrefStore) -> bool {
        if self.active.len() == 1 {
            return self.undo(store);
        }
        match self.active.collapsed(index) {
            Some(collapsed) => self.apply(collapsed, store),
            None => {
                debug!(index, "collapse ignored, no such graph");
                false
            }
        }
    }

    /// Copy the active configuration into a workspace slot
    pub fn store_workspace(&mut self, slot: usize, store: &mut dyn PrefStore) -> bool {
        if !self.workspaces.store(slot, &self.active) {
            debug!(slot, "workspace slot out of range");
            return false;
        }
        store::persist(store, keys::WORKSPACES, &self.workspaces);
        info!(slot, "workspace stored");
        true
    }

    /// Apply the configuration held in a workspace slot, if any
    pub fn load_workspace(&mut self, slot: usize, store: &mut dyn PrefStore) -> bool {
        if slot >= WORKSPACE_SLOTS {
            return false;
        }
        match self.workspaces.get(slot).cloned() {
            Some(config) => self.apply(config, store),
            None => false,
        }
    }

    /// Replace every workspace slot with the contents of an exported file
    pub fn import_workspaces(&mut self, json: &str, store: &mut dyn PrefStore) -> Result<(), StoreError> {
        self.workspaces = Workspaces::from_json(json)?;
        store::persist(store, keys::WORKSPACES, &self.workspaces);
        info!(slots = self.workspaces.occupied().count(), "workspaces imported");
        Ok(())
    }

    /// Serialize the workspace slots exactly as they are held
    pub fn export_workspaces(&self) -> Result<String, StoreError> {
        self.workspaces.to_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Field, Graph};
    use crate::store::MemoryStore;

    fn graph(label: &str, fields: &[&str]) -> Graph {
        Graph::new(label, fields.iter().map(|f| Field::new(f, "#fff")).collect())
    }

    fn two_graphs() -> GraphConfig {
        GraphConfig::new(vec![
            graph("Gyros", &["gyroADC[0]", "gyroADC[1]", "gyroADC[2]"]),
            graph("Motors", &["motor[0]", "motor[1]"]),
        ])
    }

    #[test]
    fn test_apply_and_undo() {
        let mut store = MemoryStore::new();
        let mut manager = GraphConfigManager::default();
        let first = two_graphs();
        let second = GraphConfig::new(vec![graph("Motors", &["motor[0]"])]);

        manager.apply(first.clone(), &mut store);
        manager.apply(second.clone(), &mut store);
        assert_eq!(manager.active(), &second);

        assert!(manager.undo(&mut store));
        assert_eq!(manager.active(), &first);

        // a second undo toggles back
        assert!(manager.undo(&mut store));
        assert_eq!(manager.active(), &second);
    }

    #[test]
    fn test_undo_without_history_is_noop() {
        let mut store = MemoryStore::new();
        let mut manager = GraphConfigManager::new(two_graphs(), Workspaces::default());

        assert!(!manager.undo(&mut store));
        assert_eq!(manager.active(), &two_graphs());
        assert!(store.is_empty());
    }

    #[test]
    fn test_expand_three_fields() {
        let mut store = MemoryStore::new();
        let mut manager = GraphConfigManager::new(two_graphs(), Workspaces::default());

        assert!(manager.expand(0, &mut store));
        let labels: Vec<&str> = manager.active().graphs().iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, ["gyroADC[0]", "gyroADC[1]", "gyroADC[2]"]);
        assert!(!manager.expand(7, &mut store));
    }

    #[test]
    fn test_collapse_merges_selected_graph() {
        let mut store = MemoryStore::new();
        let mut manager = GraphConfigManager::new(two_graphs(), Workspaces::default());

        assert!(manager.collapse_to_one(1, &mut store));
        assert_eq!(manager.active().len(), 1);
        assert_eq!(manager.active().graphs()[0].label, "Motors");
        assert_eq!(manager.active().graphs()[0].fields.len(), 2);
    }

    #[test]
    fn test_collapse_single_graph_falls_back_to_undo() {
        let mut store = MemoryStore::new();
        let mut manager = GraphConfigManager::default();
        let remembered = two_graphs();
        manager.apply(remembered.clone(), &mut store);
        manager.apply(GraphConfig::new(vec![graph("Solo", &["vbat"])]), &mut store);

        assert!(manager.collapse_to_one(0, &mut store));
        assert_eq!(manager.active(), &remembered);
    }

    #[test]
    fn test_workspace_store_and_load() {
        let mut store = MemoryStore::new();
        let mut manager = GraphConfigManager::new(two_graphs(), Workspaces::default());

        assert!(!manager.load_workspace(4, &mut store));
        assert!(manager.store_workspace(4, &mut store));
        assert!(store.get(keys::WORKSPACES).is_some());

        manager.apply(GraphConfig::default(), &mut store);
        assert!(manager.load_workspace(4, &mut store));
        assert_eq!(manager.active(), &two_graphs());
    }

    #[test]
    fn test_import_replaces_all_slots() {
        let mut store = MemoryStore::new();
        let mut manager = GraphConfigManager::new(two_graphs(), Workspaces::default());
        manager.store_workspace(0, &mut store);

        manager
            .import_workspaces(r#"{"graphConfig": [null, null, [{"label": "Imported", "fields": []}]]}"#, &mut store)
            .unwrap();

        assert!(manager.workspaces().get(0).is_none());
        assert_eq!(manager.workspaces().get(2).unwrap().graphs()[0].label, "Imported");
        assert!(manager.import_workspaces("not json", &mut store).is_err());
    }

    #[test]
    fn test_persisted_config_restored() {
        let mut store = MemoryStore::new();
        let mut manager = GraphConfigManager::default();
        manager.apply(two_graphs(), &mut store);

        let (restored, found) = GraphConfigManager::load(&store);
        assert!(found);
        assert_eq!(restored.active(), &two_graphs());
    }
}
