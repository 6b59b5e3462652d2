//! Per-item reconciler - one state holder per tracked family.
//!
//! Holders are created lazily (as UNKNOWN) the first time anything touches a
//! family. Only the reconciler mutates a family's state, and every mutation
//! that changes it marks the family dirty for the end-of-tick save.

mod apply;
mod resolve;

pub use resolve::*;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use item_rules::{ApplyOutcome, ChargeState, Effect, ItemLookup, KindId, Tick, TrackedItemKind};

/// Fractional consumption carried between uses of a dual-resource family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Residuals {
    pub primary: f64,
    pub secondary: f64,
}

/// What effect application needs from outside the family.
pub struct ApplyEnv<'a> {
    pub items: &'a dyn ItemLookup,
    pub tick: Tick,
    /// Window within which an amendment still applies.
    pub lookback: u64,
    /// Secondary units consumed per dual-resource use.
    pub dart_consumption: f64,
}

/// Runtime state of one family.
#[derive(Debug, Clone, Default)]
pub struct KindRuntime {
    pub state: ChargeState,
    pub residuals: Residuals,
    last_amendable: Option<(Effect, Tick)>,
    last_loss: Option<Tick>,
    last_fired: Option<Tick>,
}

#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    runtimes: HashMap<KindId, KindRuntime>,
    dirty: BTreeSet<KindId>,
}

static UNKNOWN: ChargeState = ChargeState::Unknown;

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, kind: &KindId) -> &ChargeState {
        self.runtimes
            .get(kind)
            .map(|runtime| &runtime.state)
            .unwrap_or(&UNKNOWN)
    }

    pub fn residuals(&self, kind: &KindId) -> Residuals {
        self.runtimes
            .get(kind)
            .map(|runtime| runtime.residuals)
            .unwrap_or_default()
    }

    fn runtime_mut(&mut self, kind: &KindId) -> &mut KindRuntime {
        self.runtimes.entry(kind.clone()).or_default()
    }

    /// Install loaded state without marking it dirty.
    pub fn restore(&mut self, kind: &KindId, state: ChargeState, residuals: Residuals) {
        let runtime = self.runtime_mut(kind);
        runtime.state = state;
        runtime.residuals = residuals;
    }

    /// Apply an effect to a family.
    pub fn apply(
        &mut self,
        kind: &TrackedItemKind,
        effect: Effect,
        env: &ApplyEnv<'_>,
    ) -> ApplyOutcome {
        let label = effect.label();
        let outcome = self.runtime_mut(&kind.id).apply_effect(kind, effect, env);
        if outcome.changed() {
            self.dirty.insert(kind.id.clone());
        }
        debug!(kind = %kind.id, effect = label, ?outcome, tick = env.tick, "applied effect");
        outcome
    }

    /// Whether a cooldown-gated loss may happen on `now`.
    pub fn cooldown_elapsed(&self, kind: &KindId, cooldown: u64, now: Tick) -> bool {
        match self.runtimes.get(kind).and_then(|runtime| runtime.last_loss) {
            Some(last) => now.saturating_sub(last) >= cooldown,
            None => true,
        }
    }

    pub fn mark_loss(&mut self, kind: &KindId, now: Tick) {
        self.runtime_mut(kind).last_loss = Some(now);
    }

    /// Whether a cadence rule is due again on `now`.
    pub fn cadence_due(&self, kind: &KindId, cadence: u64, now: Tick) -> bool {
        match self.runtimes.get(kind).and_then(|runtime| runtime.last_fired) {
            Some(last) => now.saturating_sub(last) >= cadence,
            None => true,
        }
    }

    pub fn mark_fired(&mut self, kind: &KindId, now: Tick) {
        self.runtime_mut(kind).last_fired = Some(now);
    }

    /// Families changed since the last call.
    pub fn take_dirty(&mut self) -> Vec<KindId> {
        std::mem::take(&mut self.dirty).into_iter().collect()
    }

    pub fn clear(&mut self) {
        self.runtimes.clear();
        self.dirty.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use item_rules::ItemDirectory;
    use proptest::prelude::*;

    fn env(items: &ItemDirectory, tick: Tick) -> ApplyEnv<'_> {
        ApplyEnv {
            items,
            tick,
            lookback: 2,
            dart_consumption: 1.0,
        }
    }

    #[test]
    fn test_state_is_lazily_unknown() {
        let reconciler = Reconciler::new();
        assert_eq!(reconciler.state(&KindId::from("x")), &ChargeState::Unknown);
    }

    #[test]
    fn test_changes_mark_dirty_once() {
        let items = ItemDirectory::new();
        let kind = TrackedItemKind::counter("trident", "Trident").with_capacity(2500);
        let mut reconciler = Reconciler::new();

        reconciler.apply(&kind, Effect::Set(10), &env(&items, 1));
        reconciler.apply(&kind, Effect::Decrease(1), &env(&items, 1));
        assert_eq!(reconciler.take_dirty(), vec![KindId::from("trident")]);
        assert!(reconciler.take_dirty().is_empty());

        // Same value again is not a change
        reconciler.apply(&kind, Effect::Set(9), &env(&items, 2));
        assert!(reconciler.take_dirty().is_empty());
    }

    #[test]
    fn test_restore_is_not_dirty() {
        let mut reconciler = Reconciler::new();
        let id = KindId::from("trident");
        reconciler.restore(&id, ChargeState::Charges(5), Residuals::default());
        assert_eq!(reconciler.state(&id), &ChargeState::Charges(5));
        assert!(reconciler.take_dirty().is_empty());
    }

    #[test]
    fn test_cooldown_and_cadence() {
        let mut reconciler = Reconciler::new();
        let id = KindId::from("helm");
        assert!(reconciler.cooldown_elapsed(&id, 100, 5));
        reconciler.mark_loss(&id, 5);
        assert!(!reconciler.cooldown_elapsed(&id, 100, 104));
        assert!(reconciler.cooldown_elapsed(&id, 100, 105));

        reconciler.mark_fired(&id, 10);
        assert!(!reconciler.cadence_due(&id, 2, 11));
        assert!(reconciler.cadence_due(&id, 2, 12));
    }

    fn counter_effect() -> impl Strategy<Value = Effect> {
        prop_oneof![
            (-100i64..6000).prop_map(Effect::Set),
            (0i64..6000).prop_map(Effect::Increase),
            (0i64..6000).prop_map(Effect::Decrease),
        ]
    }

    proptest! {
        #[test]
        fn test_increase_and_set_never_leave_bounds(
            effects in prop::collection::vec(counter_effect(), 1..40),
        ) {
            let items = ItemDirectory::new();
            let kind = TrackedItemKind::counter("trident", "Trident").with_capacity(2500);
            let mut reconciler = Reconciler::new();
            reconciler.apply(&kind, Effect::Set(0), &env(&items, 1));

            for (tick, effect) in effects.into_iter().enumerate() {
                reconciler.apply(&kind, effect, &env(&items, tick as Tick + 2));
                let charges = reconciler.state(&kind.id).charges();
                prop_assert!(matches!(charges, Some(0..=2500)));
            }
        }
    }
}
