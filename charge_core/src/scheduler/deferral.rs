//! Deferral queue - effects waiting for this tick's equipment to settle.

use std::collections::VecDeque;

use item_rules::Tick;

use crate::matcher::Candidate;

/// An effect whose target is resolved at the deferred flush.
///
/// Created while processing a tick, applied and discarded at that tick's
/// flush; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEffect {
    pub tick: Tick,
    pub candidates: Vec<Candidate>,
    /// The signal text, for logs.
    pub origin: String,
}

/// FIFO queue of pending effects.
#[derive(Debug, Clone, Default)]
pub struct DeferralQueue {
    queue: VecDeque<PendingEffect>,
}

impl DeferralQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pending: PendingEffect) {
        self.queue.push_back(pending);
    }

    /// Take every queued effect, oldest first.
    pub fn drain(&mut self) -> Vec<PendingEffect> {
        self.queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
