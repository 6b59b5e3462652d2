//! Recently-interacted-item bookkeeping with a bounded lookback window.

use std::collections::VecDeque;

use item_rules::{KindId, Tick};

/// What the player did to a tracked item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionKind {
    /// An explicit "Check" menu action.
    Check,
    /// "Use X on Y" where one side is the tracked item.
    UseOn,
    /// Any other menu option a family's rules care about, e.g. "Fill".
    Option(String),
}

impl InteractionKind {
    /// Whether the interaction identifies which item a following message is
    /// about.
    pub fn identifies_target(&self) -> bool {
        matches!(self, InteractionKind::Check | InteractionKind::UseOn)
    }
}

/// One recorded interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    pub kind: KindId,
    pub action: InteractionKind,
    pub tick: Tick,
    pub consumed: bool,
}

/// Interactions from the last `window` ticks, oldest first.
#[derive(Debug, Clone)]
pub struct InteractionLog {
    entries: VecDeque<Interaction>,
    window: u64,
}

impl InteractionLog {
    pub fn new(window: u64) -> Self {
        Self {
            entries: VecDeque::new(),
            window: window.max(1),
        }
    }

    pub fn window(&self) -> u64 {
        self.window
    }

    /// Whether something recorded on `then` is still eligible on `now`.
    pub fn in_window(&self, then: Tick, now: Tick) -> bool {
        now.saturating_sub(then) < self.window
    }

    pub fn record(&mut self, kind: KindId, action: InteractionKind, tick: Tick) {
        self.entries.push_back(Interaction {
            kind,
            action,
            tick,
            consumed: false,
        });
    }

    /// Kinds among `candidates` with a target-identifying interaction in the
    /// window, without duplicates.
    pub fn recent_targets(&self, candidates: &[KindId], now: Tick) -> Vec<KindId> {
        let mut found: Vec<KindId> = Vec::new();
        for entry in &self.entries {
            if entry.action.identifies_target()
                && self.in_window(entry.tick, now)
                && candidates.contains(&entry.kind)
                && !found.contains(&entry.kind)
            {
                found.push(entry.kind.clone());
            }
        }
        found
    }

    /// Consume an unconsumed menu-option interaction for `kind` in the window.
    ///
    /// Returns whether one was found. The newest matching entry is taken.
    pub fn take_option(&mut self, kind: &KindId, option: &str, now: Tick) -> bool {
        let window = self.window;
        let found = self.entries.iter_mut().rev().find(|entry| {
            !entry.consumed
                && &entry.kind == kind
                && now.saturating_sub(entry.tick) < window
                && matches!(&entry.action, InteractionKind::Option(o) if o.eq_ignore_ascii_case(option))
        });
        match found {
            Some(entry) => {
                entry.consumed = true;
                true
            }
            None => false,
        }
    }

    /// Mark the target-identifying interactions with `kind` as consumed.
    ///
    /// Menu-option entries stay pending for `take_option`.
    pub fn consume(&mut self, kind: &KindId) {
        for entry in self
            .entries
            .iter_mut()
            .filter(|entry| &entry.kind == kind && entry.action.identifies_target())
        {
            entry.consumed = true;
        }
    }

    /// Drop entries that fell out of the window as of `now`, returning the
    /// ones nothing consumed.
    pub fn prune(&mut self, now: Tick) -> Vec<Interaction> {
        let mut stale = Vec::new();
        while let Some(front) = self.entries.front() {
            if self.in_window(front.tick, now) {
                break;
            }
            if let Some(entry) = self.entries.pop_front() {
                if !entry.consumed {
                    stale.push(entry);
                }
            }
        }
        stale
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
