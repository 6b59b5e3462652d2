//! Persistence - profile-scoped key-value storage of family states.
//!
//! - **KeyValueStore**: the external store contract (`get`/`set` of strings)
//! - **MemoryStore** / **SqliteStore**: backends
//! - **PersistenceAdapter**: JSON encoding plus an off-tick background writer

mod adapter;
mod memory;
mod sqlite;

pub use adapter::*;
pub use memory::*;
pub use sqlite::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of the player profile a store is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(pub Uuid);

impl ProfileId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ProfileId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ProfileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("background writer has stopped")]
    WriterClosed,
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// A string key-value store, grouped by namespace.
///
/// Implementations are blocking; the adapter calls `set` off the tick thread.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, group: &str, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, group: &str, key: &str, value: &str) -> Result<(), StoreError>;
}
