//! Dialog state machine.
//!
//! Turns per-tick widget state into [`DialogEvent`]s:
//! - `StateChanged` when the normalized dialog differs structurally from the
//!   previous one (`NoDialog` included; it is not evidence that a dialog
//!   ended, since some flows go straight from one dialog to another)
//! - `OptionSelected` at most once per tick, from a widget click or a
//!   script notification, resolved against the dialog on screen when the
//!   selection was made

use item_rules::{DialogScript, DialogState, DialogWidget, DialogWidgets, Tick};
use tracing::debug;

/// A dialog notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogEvent {
    StateChanged(DialogState),
    /// `choice` is `None` for "click to continue", the option text for a
    /// multi-choice selection, or the submitted text for an input prompt.
    OptionSelected {
        state: DialogState,
        choice: Option<String>,
    },
}

/// A way of making a dialog selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Widget(DialogWidget),
    Script(DialogScript),
}

#[derive(Debug, Clone, Default)]
pub struct DialogTracker {
    current: DialogState,
    selected_on: Option<Tick>,
}

impl DialogTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The dialog as of the last observation.
    pub fn current(&self) -> &DialogState {
        &self.current
    }

    /// Observe this tick's widgets.
    pub fn observe(&mut self, widgets: &DialogWidgets) -> Option<DialogEvent> {
        let next = DialogState::from_widgets(widgets);
        if next == self.current {
            return None;
        }
        debug!(from = ?self.current.kind(), to = ?next.kind(), "dialog state changed");
        self.current = next.clone();
        Some(DialogEvent::StateChanged(next))
    }

    /// Register a selection made on `tick`.
    ///
    /// Only the first selection of a tick produces an event; later ones are
    /// dropped so a single choice is never applied twice. Selections with no
    /// dialog on screen are ignored.
    pub fn select(&mut self, selection: Selection, tick: Tick) -> Option<DialogEvent> {
        if !self.current.is_open() {
            return None;
        }
        if self.selected_on == Some(tick) {
            debug!(tick, "dropping repeated dialog selection");
            return None;
        }

        let choice = match selection {
            Selection::Widget(DialogWidget::Continue) | Selection::Script(DialogScript::Continue) => {
                None
            }
            Selection::Widget(DialogWidget::Option(index))
            | Selection::Script(DialogScript::OptionChosen(index)) => {
                Some(self.current.option(index)?.to_string())
            }
            Selection::Script(DialogScript::InputSubmitted(text)) => Some(text.trim().to_string()),
        };

        self.selected_on = Some(tick);
        Some(DialogEvent::OptionSelected {
            state: self.current.clone(),
            choice,
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
