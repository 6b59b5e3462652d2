use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{KeyValueStore, StoreError};

/// In-process store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<(String, String), String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, group: &str, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .entries
            .lock()
            .get(&(group.to_string(), key.to_string()))
            .cloned())
    }

    fn set(&self, group: &str, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .insert((group.to_string(), key.to_string()), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_are_separate() {
        let store = MemoryStore::new();
        store.set("a", "key", "1").unwrap();
        store.set("b", "key", "2").unwrap();
        assert_eq!(store.get("a", "key").unwrap().as_deref(), Some("1"));
        assert_eq!(store.get("b", "key").unwrap().as_deref(), Some("2"));
        assert_eq!(store.get("c", "key").unwrap(), None);
    }

    #[test]
    fn test_clones_share_entries() {
        let store = MemoryStore::new();
        let clone = store.clone();
        clone.set("g", "k", "v").unwrap();
        assert_eq!(store.len(), 1);
    }
}
