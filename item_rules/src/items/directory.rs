//! In-memory item directory implementing [`ItemLookup`].

use std::collections::HashMap;

use super::{normalize_name, ItemId, ItemLookup, ItemMeta};

/// A name/metadata table for items.
///
/// Name lookups are case-insensitive. A name that is not an exact match
/// resolves when it is a prefix of exactly one known item name, so
/// "Grimy ranarr" finds "Grimy ranarr weed".
#[derive(Debug, Clone, Default)]
pub struct ItemDirectory {
    items: HashMap<ItemId, ItemMeta>,
    by_name: HashMap<String, ItemId>,
}

impl ItemDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item (builder style).
    pub fn with_item(mut self, id: i32, name: &str, stackable: bool, tradeable: bool) -> Self {
        self.insert(ItemMeta {
            id: ItemId(id),
            name: name.to_string(),
            stackable,
            tradeable,
        });
        self
    }

    /// Insert or replace an item.
    pub fn insert(&mut self, meta: ItemMeta) {
        self.by_name.insert(normalize_name(&meta.name), meta.id);
        self.items.insert(meta.id, meta);
    }

    /// Merge another directory into this one. Entries in `other` win.
    pub fn extend(&mut self, other: ItemDirectory) {
        for (_, meta) in other.items {
            self.insert(meta);
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ItemLookup for ItemDirectory {
    fn metadata(&self, id: ItemId) -> Option<&ItemMeta> {
        self.items.get(&id)
    }

    fn find_by_name(&self, name: &str) -> Option<ItemId> {
        let needle = normalize_name(name);
        if needle.is_empty() {
            return None;
        }
        if let Some(id) = self.by_name.get(&needle) {
            return Some(*id);
        }

        let mut found = None;
        for (known, id) in &self.by_name {
            if known.starts_with(&needle) {
                match found {
                    None => found = Some(*id),
                    Some(existing) if existing == *id => {}
                    // Ambiguous prefix
                    Some(_) => return None,
                }
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn herbs() -> ItemDirectory {
        ItemDirectory::new()
            .with_item(207, "Grimy ranarr weed", false, true)
            .with_item(3049, "Grimy toadflax", false, true)
            .with_item(209, "Grimy irit leaf", false, true)
            .with_item(5295, "Ranarr seed", true, true)
    }

    #[test]
    fn test_exact_lookup_is_case_insensitive() {
        let dir = herbs();
        assert_eq!(dir.find_by_name("grimy TOADFLAX"), Some(ItemId(3049)));
        assert_eq!(dir.name(ItemId(5295)), Some("Ranarr seed"));
    }

    #[test]
    fn test_unique_prefix_lookup() {
        let dir = herbs();
        assert_eq!(dir.find_by_name("Grimy ranarr"), Some(ItemId(207)));
    }

    #[test]
    fn test_ambiguous_prefix_is_rejected() {
        let dir = herbs();
        assert_eq!(dir.find_by_name("Grimy"), None);
        assert_eq!(dir.find_by_name(""), None);
    }

    #[test]
    fn test_metadata_flags() {
        let dir = herbs();
        let seed = dir.metadata(ItemId(5295)).unwrap();
        assert!(seed.stackable);
        assert!(seed.tradeable);
        assert_eq!(dir.len(), 4);
    }
}
