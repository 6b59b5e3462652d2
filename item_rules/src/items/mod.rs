//! Item identifiers and the name/metadata lookup contract.

mod directory;
mod kind;

pub use directory::*;
pub use kind::*;

use serde::{Deserialize, Serialize};

/// Game item identifier as reported by the host client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub i32);

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a tracked item family. Doubles as its storage key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KindId(pub String);

impl KindId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for KindId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for KindId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Item containers observed through snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerId {
    Inventory,
    Equipment,
    Bank,
    Other(i32),
}

/// Static facts about an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMeta {
    pub id: ItemId,
    pub name: String,
    pub stackable: bool,
    pub tradeable: bool,
}

/// Name and metadata lookup for item identifiers.
///
/// Used to turn text-only quantity reports ("12 x Ranarr seed") back into
/// item identifiers.
pub trait ItemLookup: Send + Sync {
    /// Metadata for an item, if known.
    fn metadata(&self, id: ItemId) -> Option<&ItemMeta>;

    /// Resolve an item name as it appears in game text.
    fn find_by_name(&self, name: &str) -> Option<ItemId>;

    /// Display name for an item.
    fn name(&self, id: ItemId) -> Option<&str> {
        self.metadata(id).map(|meta| meta.name.as_str())
    }
}

/// Lowercase, trim, and collapse inner whitespace for name comparisons.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Grimy   Ranarr weed "), "grimy ranarr weed");
        assert_eq!(normalize_name("Coins"), "coins");
    }

    #[test]
    fn test_kind_id_display() {
        let id = KindId::from("herb_sack");
        assert_eq!(id.to_string(), "herb_sack");
        assert_eq!(id.as_str(), "herb_sack");
    }
}
