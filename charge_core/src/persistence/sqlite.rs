use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use super::{KeyValueStore, ProfileId, StoreError};

const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS kv_store (
    profile TEXT NOT NULL,
    grp     TEXT NOT NULL,
    key     TEXT NOT NULL,
    value   TEXT NOT NULL,
    PRIMARY KEY (profile, grp, key)
);
";

/// SQLite-backed store scoped to one profile.
/// Uses parking_lot::Mutex for synchronous access to the connection.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    profile: ProfileId,
    path: PathBuf,
}

impl SqliteStore {
    /// Open or create a database at the given path.
    pub fn open(path: &Path, profile: ProfileId) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Io(format!("create dir: {e}")))?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(CREATE_TABLES)
            .map_err(|e| StoreError::Database(format!("schema: {e}")))?;

        info!(path = %path.display(), %profile, "store opened");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            profile,
            path: path.to_owned(),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn in_memory(profile: ProfileId) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(CREATE_TABLES)
            .map_err(|e| StoreError::Database(format!("schema: {e}")))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            profile,
            path: PathBuf::from(":memory:"),
        })
    }

    pub fn profile(&self) -> ProfileId {
        self.profile
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The same database scoped to another profile.
    pub fn for_profile(&self, profile: ProfileId) -> Self {
        Self {
            conn: self.conn.clone(),
            profile,
            path: self.path.clone(),
        }
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, group: &str, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.conn.lock();
        let value = conn
            .query_row(
                "SELECT value FROM kv_store WHERE profile = ?1 AND grp = ?2 AND key = ?3",
                params![self.profile.to_string(), group, key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, group: &str, key: &str, value: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO kv_store (profile, grp, key, value) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (profile, grp, key) DO UPDATE SET value = excluded.value",
            params![self.profile.to_string(), group, key, value],
        )?;
        Ok(())
    }
}
