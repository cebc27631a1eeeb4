// Progress store and its persistence adapter
use crate::constants::{PROGRESS_KEY, STASH_KEY};
use crate::Result;
use questlog_cache::KeyValueStore;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, warn};

/// What the player has done: completed quests and found collector items
///
/// Ids and item names are not checked against the catalog. The revision
/// goes up on every mutation so derived views know when to rebuild.
#[derive(Debug, Clone, Default)]
pub struct ProgressStore {
    completed_quest_ids: HashSet<String>,
    found_collector_items: HashSet<String>,
    revision: u64,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(
        completed: impl IntoIterator<Item = String>,
        found: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            completed_quest_ids: completed.into_iter().collect(),
            found_collector_items: found.into_iter().collect(),
            revision: 0,
        }
    }

    pub fn is_completed(&self, quest_id: &str) -> bool {
        self.completed_quest_ids.contains(quest_id)
    }

    pub fn is_found(&self, item: &str) -> bool {
        self.found_collector_items.contains(item)
    }

    pub fn completed_ids(&self) -> &HashSet<String> {
        &self.completed_quest_ids
    }

    pub fn found_items(&self) -> &HashSet<String> {
        &self.found_collector_items
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Flip a quest's completion; returns whether it is now completed
    pub fn toggle_quest_completed(&mut self, quest_id: &str) -> bool {
        self.revision += 1;
        flip(&mut self.completed_quest_ids, quest_id)
    }

    /// Flip a collector item; returns whether it is now found
    pub fn toggle_collector_item_found(&mut self, item: &str) -> bool {
        self.revision += 1;
        flip(&mut self.found_collector_items, item)
    }

    pub fn clear(&mut self) {
        self.revision += 1;
        self.completed_quest_ids.clear();
        self.found_collector_items.clear();
    }
}

fn flip(set: &mut HashSet<String>, key: &str) -> bool {
    if set.remove(key) {
        false
    } else {
        set.insert(key.to_string());
        true
    }
}

/// Progress store wired to durable storage
///
/// Starts disarmed: mutations only touch memory until `arm` is called,
/// which happens once the catalog has loaded. That way a session that
/// never got a catalog can't overwrite saved progress with an empty set.
pub struct ProgressTracker {
    progress: ProgressStore,
    backend: Box<dyn KeyValueStore>,
    armed: bool,
}

impl ProgressTracker {
    /// Restore both sets from storage. Missing or corrupt entries come back empty.
    pub fn load(backend: Box<dyn KeyValueStore>) -> Self {
        let completed = read_set(backend.as_ref(), PROGRESS_KEY);
        let found = read_set(backend.as_ref(), STASH_KEY);
        debug!(
            "Restored progress: {} completed quests, {} found items",
            completed.len(),
            found.len()
        );

        Self {
            progress: ProgressStore::from_parts(completed, found),
            backend,
            armed: false,
        }
    }

    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Enable persistence and write the current state through
    pub fn arm(&mut self) -> Result<()> {
        self.armed = true;
        self.sync()
    }

    /// Returns whether the quest is now completed. The in-memory flip
    /// sticks even if the write fails.
    pub fn toggle_quest_completed(&mut self, quest_id: &str) -> Result<bool> {
        let now_completed = self.progress.toggle_quest_completed(quest_id);
        self.sync()?;
        Ok(now_completed)
    }

    pub fn toggle_collector_item_found(&mut self, item: &str) -> Result<bool> {
        let now_found = self.progress.toggle_collector_item_found(item);
        self.sync()?;
        Ok(now_found)
    }

    /// Wipe everything, including the persisted copy
    pub fn reset_all(&mut self) -> Result<()> {
        self.progress.clear();
        self.backend.remove(PROGRESS_KEY)?;
        self.backend.remove(STASH_KEY)?;
        warn!("Progress wiped");
        Ok(())
    }

    fn sync(&self) -> Result<()> {
        if !self.armed {
            debug!("Catalog not loaded yet, keeping progress in memory only");
            return Ok(());
        }

        self.backend
            .set(PROGRESS_KEY, &encode_set(&self.progress.completed_quest_ids)?)?;
        self.backend
            .set(STASH_KEY, &encode_set(&self.progress.found_collector_items)?)?;
        Ok(())
    }
}

fn read_set(backend: &dyn KeyValueStore, key: &str) -> HashSet<String> {
    let raw = match backend.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return HashSet::new(),
        Err(e) => {
            warn!("Could not read {} from storage, starting empty: {}", key, e);
            return HashSet::new();
        }
    };

    match serde_json::from_str::<Vec<String>>(&raw) {
        Ok(values) => values.into_iter().collect(),
        Err(e) => {
            warn!("Stored {} is corrupt, starting empty: {}", key, e);
            HashSet::new()
        }
    }
}

/// Sorted so the stored value doesn't churn with hash order
fn encode_set(set: &HashSet<String>) -> Result<String> {
    let sorted: BTreeSet<&String> = set.iter().collect();
    Ok(serde_json::to_string(&sorted)?)
}
