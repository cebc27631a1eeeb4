use crate::{store::KeyValueStore, CacheError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory store for tests and throwaway sessions
///
/// Clones share the same map, so a test can keep a handle and inspect
/// what got written through another one.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries
            .lock()
            .map(|map| map.contains_key(key))
            .unwrap_or(false)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut map = self.entries.lock().map_err(|_| CacheError::Poisoned)?;
        map.remove(key);
        Ok(())
    }
}
