//! # Item Rules
//!
//! The "Item Bible" crate - tracked item families, the signal model, and the
//! declarative rule tables that describe how game signals change hidden item
//! charges and container contents.
//! This crate is the single source of truth for *what* the signals mean and
//! does not contain any engine logic.

pub mod catalog;
pub mod dialog;
pub mod items;
pub mod rules;
pub mod signals;
pub mod state;

pub use catalog::*;
pub use dialog::*;
pub use items::*;
pub use rules::*;
pub use signals::*;
pub use state::*;
