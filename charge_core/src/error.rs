//! Engine errors.
//!
//! Only construction-time and store-level APIs return these. Per-tick
//! ingestion never fails; anomalies end up in the diagnostics log instead.

use std::path::PathBuf;

use item_rules::RuleError;

use crate::persistence::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid tick schedule: {0}")]
    InvalidSchedule(String),

    #[error(transparent)]
    Rules(#[from] RuleError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("unknown item kind `{0}`")]
    UnknownKind(String),
}
