//! Tracker configuration, loaded from TOML.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::error::TrackerError;

/// Ava's device worn while using a dart-firing weapon.
///
/// The device recovers a share of fired darts, which lowers the rate at which
/// the loaded darts of a dual-resource weapon are consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DartRetention {
    #[default]
    None,
    Attractor,
    Accumulator,
    Assembler,
}

impl DartRetention {
    /// Fraction of fired darts that are recovered.
    pub fn retained_fraction(&self) -> f64 {
        match self {
            DartRetention::None => 0.0,
            DartRetention::Attractor => 0.6,
            DartRetention::Accumulator => 0.72,
            DartRetention::Assembler => 0.8,
        }
    }

    /// Darts consumed per use.
    pub fn consumed_per_use(&self) -> f64 {
        1.0 - self.retained_fraction()
    }
}

/// Engine configuration. Every field has a default, so an empty document is
/// a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Ticks a recorded interaction stays eligible for target resolution,
    /// counting the tick it happened on.
    pub lookback_ticks: u64,

    /// Key-value store group holding every family's state.
    pub storage_group: String,

    pub dart_retention: DartRetention,

    /// Low-charge thresholds per kind id, replacing the kind's default.
    pub low_charge_overrides: BTreeMap<String, i64>,

    /// Kind ids to leave untracked.
    pub disabled_kinds: HashSet<String>,

    /// Diagnostics kept before the oldest are discarded.
    pub max_diagnostics: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            lookback_ticks: 2,
            storage_group: "item-charges".to_string(),
            dart_retention: DartRetention::None,
            low_charge_overrides: BTreeMap::new(),
            disabled_kinds: HashSet::new(),
            max_diagnostics: 256,
        }
    }
}

impl TrackerConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, TrackerError> {
        let mut config: TrackerConfig = toml::from_str(source)?;
        config.lookback_ticks = config.lookback_ticks.max(1);
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> Result<Self, TrackerError> {
        let source = std::fs::read_to_string(path).map_err(|source| TrackerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Depletion threshold for a kind, honouring overrides.
    pub fn low_threshold(&self, kind: &str, default: i64) -> i64 {
        self.low_charge_overrides
            .get(kind)
            .copied()
            .unwrap_or(default)
    }
}
