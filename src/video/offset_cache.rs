use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

use crate::store::{self, keys, PrefStore};

/// Maximum number of remembered offsets
pub const MAX_CACHE_ENTRIES: usize = 20;

/// A calibrated offset for one (log, segment, video) combination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffsetCacheEntry {
    pub log: String,
    pub index: usize,
    pub video: String,
    pub offset: f64,
}

impl OffsetCacheEntry {
    fn matches(&self, log: &str, index: usize, video: &str) -> bool {
        self.log == log && self.index == index && self.video == video
    }
}

/// Bounded FIFO of previously calibrated video offsets
#[derive(Debug, Clone)]
pub struct OffsetCache {
    entries: VecDeque<OffsetCacheEntry>,
    capacity: usize,
}

impl Default for OffsetCache {
    fn default() -> Self {
        Self::with_capacity(MAX_CACHE_ENTRIES)
    }
}

impl OffsetCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Restore the cache from the store, keeping only the newest entries
    pub fn load(store: &dyn PrefStore, capacity: usize) -> Self {
        let mut cache = Self::with_capacity(capacity);
        let stored: Vec<OffsetCacheEntry> = store::load(store, keys::OFFSET_CACHE).unwrap_or_default();
        for entry in stored {
            cache.insert(entry);
        }
        cache
    }

    pub fn save(&self, store: &mut dyn PrefStore) {
        store::persist(store, keys::OFFSET_CACHE, &self.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &OffsetCacheEntry> {
        self.entries.iter()
    }

    /// Append an entry, evicting the oldest when full
    pub fn insert(&mut self, entry: OffsetCacheEntry) {
        while self.entries.len() >= self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                debug!(log = %evicted.log, video = %evicted.video, "offset cache evicted oldest entry");
            }
        }
        self.entries.push_back(entry);
    }

    /// Most recent offset recorded for an exact (log, index, video) match
    pub fn lookup(&self, log: &str, index: usize, video: &str) -> Option<f64> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.matches(log, index, video))
            .map(|e| e.offset)
    }
}
