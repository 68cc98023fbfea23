use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::core::Micros;
use crate::store::{self, keys, PrefStore, StoreError};

/// Engine tunables.
///
/// Every field has a default, so a partial JSON file only overrides what it
/// names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Delay between frames while playing
    pub frame_interval_ms: u64,
    /// Trailing window for seek bar repaints during playback
    pub seek_bar_repaint_ms: u64,
    /// Trailing window for value table refreshes
    pub value_table_refresh_ms: u64,
    /// Arrow key jump
    pub small_jump_us: Micros,
    /// Mouse wheel jump, as a fraction of the visible window
    pub wheel_jump_fraction: f64,
    /// Page up/down jump, as a fraction of the visible window
    pub page_jump_fraction: f64,
    /// Video offset nudge step in seconds (one frame at 15fps)
    pub offset_nudge_seconds: f64,
    /// Number of remembered video offsets
    pub offset_cache_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
            seek_bar_repaint_ms: 200,
            value_table_refresh_ms: 250,
            small_jump_us: 100 * 1000,
            wheel_jump_fraction: 0.1,
            page_jump_fraction: 0.25,
            offset_nudge_seconds: 1.0 / 15.0,
            offset_cache_capacity: 20,
        }
    }
}

impl EngineConfig {
    /// Load tunables from a JSON file
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn seek_bar_window(&self) -> Duration {
        Duration::from_millis(self.seek_bar_repaint_ms)
    }

    pub fn value_table_window(&self) -> Duration {
        Duration::from_millis(self.value_table_refresh_ms)
    }
}

/// Persisted display toggles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    pub show_table: bool,
    pub show_craft: bool,
    pub show_sticks: bool,
    pub show_analyser: bool,
    pub legend_hidden: bool,
    /// Table quick-show overlay, not persisted
    #[serde(skip)]
    pub table_overlay: bool,
    /// Table visibility from before the overlay forced it on
    #[serde(skip)]
    table_before_overlay: bool,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            show_table: true,
            show_craft: true,
            show_sticks: true,
            show_analyser: false,
            legend_hidden: false,
            table_overlay: false,
            table_before_overlay: true,
        }
    }
}

impl ViewSettings {
    pub fn load(store: &dyn PrefStore) -> Self {
        store::load(store, keys::VIEW_SETTINGS).unwrap_or_default()
    }

    pub fn save(&self, store: &mut dyn PrefStore) {
        store::persist(store, keys::VIEW_SETTINGS, self);
    }

    /// Toggle the quick-show table overlay.
    ///
    /// Showing the overlay forces the table on; hiding it restores whatever
    /// the table visibility was before.
    pub fn toggle_table_overlay(&mut self) {
        self.table_overlay = !self.table_overlay;
        if self.table_overlay {
            self.table_before_overlay = self.show_table;
            self.show_table = true;
        } else if !self.table_before_overlay {
            self.show_table = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"frame_interval_ms": 33}"#).unwrap();
        assert_eq!(config.frame_interval(), Duration::from_millis(33));
        assert_eq!(config.value_table_refresh_ms, 250);
        assert_eq!(config.offset_cache_capacity, 20);
    }

    #[test]
    fn test_table_overlay_restores_hidden_table() {
        let mut view = ViewSettings {
            show_table: false,
            ..ViewSettings::default()
        };

        view.toggle_table_overlay();
        assert!(view.show_table);

        view.toggle_table_overlay();
        assert!(!view.show_table);
    }

    #[test]
    fn test_view_settings_persist() {
        let mut store = MemoryStore::new();
        let view = ViewSettings {
            show_craft: false,
            legend_hidden: true,
            ..ViewSettings::default()
        };
        view.save(&mut store);

        let loaded = ViewSettings::load(&store);
        assert!(!loaded.show_craft);
        assert!(loaded.legend_hidden);
    }
}
