//! # Charge Core
//!
//! The engine half of the item charge tracker. It consumes the signal model
//! and rule tables from `item_rules`, infers hidden charge counts and
//! container contents tick by tick, and persists them per profile.
//!
//! ## Core Components
//!
//! - **dialog**: Dialog state machine emitting state-change and selection events
//! - **matcher**: Ordered first-match scan over rule tables and the shared pool
//! - **context**: Lookback interactions, item presence, snapshots and diagnostics
//! - **reconciler**: Per-family state holders, effect application, target resolution
//! - **scheduler**: The explicit per-tick phase order and the deferral queue
//! - **persistence**: Key-value stores and the background-writing adapter
//! - **tracker**: The `ChargeTracker` facade and its queries
//!
//! ## Design Philosophy
//!
//! - **Data-Driven**: Families are declarative records; one generic engine serves all of them
//! - **Explicit Ordering**: Phase order is a validated value, not an accident of subscription order
//! - **Best-Effort**: Ingestion never fails; doubtful signals are dropped and recorded

pub mod config;
pub mod context;
pub mod dialog;
pub mod error;
pub mod matcher;
pub mod persistence;
pub mod reconciler;
pub mod scheduler;
pub mod tracker;

pub use config::*;
pub use context::*;
pub use dialog::*;
pub use error::*;
pub use matcher::*;
pub use persistence::*;
pub use reconciler::*;
pub use scheduler::*;
pub use tracker::*;
