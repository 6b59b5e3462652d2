//! Replays a JSON-lines signal log through a tracker and prints the result.
//!
//! Usage: `charge-replay <log.jsonl> [--config path] [--db path]`

use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

use charge_core::{
    ChargeTracker, KeyValueStore, MemoryStore, ProfileId, SqliteStore, TrackerConfig, TrackerError,
};
use clap::Parser;
use item_rules::{Catalog, TimedSignal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "charge-replay")]
#[command(about = "Replay a JSON-lines signal log through a charge tracker")]
struct Args {
    /// JSON-lines file of timed signals
    log: PathBuf,

    /// TOML tracker configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// SQLite database to persist states into; in memory when omitted
    #[arg(long)]
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), TrackerError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,charge_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => TrackerConfig::load(path)?,
        None => TrackerConfig::default(),
    };

    let store: Arc<dyn KeyValueStore> = match &args.db {
        Some(path) => Arc::new(SqliteStore::open(path, replay_profile())?),
        None => Arc::new(MemoryStore::new()),
    };

    let mut tracker = ChargeTracker::builder(Catalog::builtin()?, Catalog::builtin_items())
        .with_config(config)
        .with_store(store)
        .build()?;

    let file = std::fs::File::open(&args.log).map_err(|source| TrackerError::Io {
        path: args.log.clone(),
        source,
    })?;

    let mut skipped = 0usize;
    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|source| TrackerError::Io {
            path: args.log.clone(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<TimedSignal>(&line) {
            Ok(signal) => tracker.ingest(signal),
            Err(e) => {
                skipped += 1;
                tracing::warn!(line = number + 1, error = %e, "skipping unreadable signal");
            }
        }
    }
    tracker.end_tick();
    tracker.flush().await?;

    tracing::info!(tick = tracker.tick(), skipped, "replay finished");

    for kind in tracker.catalog().kinds() {
        let state = tracker.charge_state(kind.id.as_str())?;
        println!("{:<24} {}", kind.id, serde_json::to_string(state).unwrap_or_default());
    }

    let calibration = tracker.items_needing_calibration();
    if !calibration.is_empty() {
        println!();
        println!("needs a check:");
        for name in calibration {
            println!("  {name}");
        }
    }

    let diagnostics = tracker.diagnostics();
    if !diagnostics.is_empty() {
        println!();
        println!("{} diagnostics recorded", diagnostics.len());
    }

    Ok(())
}

/// Replays always write under the same profile so repeated runs share state.
fn replay_profile() -> ProfileId {
    ProfileId(uuid::Uuid::nil())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_accept_optional_paths() {
        let args = Args::try_parse_from([
            "charge-replay",
            "session.jsonl",
            "--db",
            "charges.db",
        ])
        .unwrap();
        assert_eq!(args.log, PathBuf::from("session.jsonl"));
        assert_eq!(args.db, Some(PathBuf::from("charges.db")));
        assert!(args.config.is_none());
    }

    #[test]
    fn test_args_require_log() {
        assert!(Args::try_parse_from(["charge-replay", "--config", "tracker.toml"]).is_err());
    }
}
