//! Session context - the mutable bookkeeping each tick's processing reads
//! and updates, kept apart from the reconciled states.
//!
//! Holds the interaction lookback log, item presence, the last snapshot of
//! each container, the local actor's current animation and the diagnostics
//! log. Pruning happens explicitly at the start of every tick.

mod diagnostics;
mod interactions;
mod presence;

pub use diagnostics::*;
pub use interactions::*;
pub use presence::*;

use std::collections::HashMap;

use item_rules::{ContainerId, ContainerSnapshot, Tick};

/// The animation the local actor is performing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveAnimation {
    pub id: i32,
    /// Tick the animation started on.
    pub since: Tick,
}

/// Idle animation id reported by the host.
pub const IDLE_ANIMATION: i32 = -1;

#[derive(Debug, Clone)]
pub struct SessionContext {
    tick: Tick,
    pub interactions: InteractionLog,
    pub presence: Presence,
    containers: HashMap<ContainerId, ContainerSnapshot>,
    animation: Option<ActiveAnimation>,
    pub diagnostics: Diagnostics,
}

impl SessionContext {
    pub fn new(lookback_ticks: u64, max_diagnostics: usize) -> Self {
        Self {
            tick: 0,
            interactions: InteractionLog::new(lookback_ticks),
            presence: Presence::new(),
            containers: HashMap::new(),
            animation: None,
            diagnostics: Diagnostics::new(max_diagnostics),
        }
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Advance to `tick`, pruning interactions that left the window.
    ///
    /// Unused interactions are recorded as stale.
    pub fn begin_tick(&mut self, tick: Tick) {
        self.tick = tick;
        for entry in self.interactions.prune(tick) {
            self.diagnostics.record(
                tick,
                DiagnosticKind::StaleInteraction,
                format!(
                    "{:?} on {} at tick {} was never matched",
                    entry.action, entry.kind, entry.tick
                ),
                vec![entry.kind],
            );
        }
    }

    /// Store a snapshot, returning the previous one for the same container.
    pub fn replace_snapshot(&mut self, snapshot: ContainerSnapshot) -> Option<ContainerSnapshot> {
        self.containers.insert(snapshot.container, snapshot)
    }

    pub fn snapshot(&self, container: ContainerId) -> Option<&ContainerSnapshot> {
        self.containers.get(&container)
    }

    /// Record an animation change. Returns whether the id actually changed.
    pub fn set_animation(&mut self, id: i32, tick: Tick) -> bool {
        let current = self.animation.map(|a| a.id).unwrap_or(IDLE_ANIMATION);
        if current == id {
            return false;
        }
        self.animation = (id != IDLE_ANIMATION).then_some(ActiveAnimation { id, since: tick });
        true
    }

    pub fn animation(&self) -> Option<ActiveAnimation> {
        self.animation
    }

    /// Forget everything session-scoped except diagnostics.
    pub fn reset(&mut self) {
        self.interactions.clear();
        self.presence = Presence::new();
        self.containers.clear();
        self.animation = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use item_rules::KindId;

    #[test]
    fn test_begin_tick_records_stale_interactions() {
        let mut context = SessionContext::new(2, 16);
        context
            .interactions
            .record(KindId::from("trident"), InteractionKind::Check, 1);

        context.begin_tick(2);
        assert!(context.diagnostics.is_empty());

        context.begin_tick(3);
        assert_eq!(context.diagnostics.count(DiagnosticKind::StaleInteraction), 1);
        assert!(context.interactions.is_empty());
    }

    #[test]
    fn test_animation_changes() {
        let mut context = SessionContext::new(2, 16);
        assert!(context.set_animation(1167, 4));
        assert!(!context.set_animation(1167, 5));
        assert_eq!(context.animation().map(|a| a.since), Some(4));

        assert!(context.set_animation(IDLE_ANIMATION, 6));
        assert_eq!(context.animation(), None);
    }

    #[test]
    fn test_replace_snapshot_returns_previous() {
        let mut context = SessionContext::new(2, 16);
        let first = ContainerSnapshot::new(ContainerId::Inventory, [(207, 3)]);
        assert!(context.replace_snapshot(first.clone()).is_none());

        let second = ContainerSnapshot::new(ContainerId::Inventory, [(207, 1)]);
        assert_eq!(context.replace_snapshot(second), Some(first));
        assert!(context.snapshot(ContainerId::Equipment).is_none());
    }
}
