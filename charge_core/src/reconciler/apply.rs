//! Effect application for one family.

use std::collections::BTreeMap;

use item_rules::{
    ApplyOutcome, ChargeState, DiffDirection, DualResource, Effect, ItemId, SkipReason,
    TrackedItemKind,
};

use super::{ApplyEnv, KindRuntime, Residuals};

/// Tolerance for fractional consumption landing just under a whole unit.
const EPSILON: f64 = 1e-9;

/// Fold several primitive outcomes into one.
fn combine(acc: ApplyOutcome, next: ApplyOutcome) -> ApplyOutcome {
    match (acc, next) {
        (ApplyOutcome::Changed, _) | (_, ApplyOutcome::Changed) => ApplyOutcome::Changed,
        (ApplyOutcome::Skipped(reason), _) | (_, ApplyOutcome::Skipped(reason)) => {
            ApplyOutcome::Skipped(reason)
        }
        _ => ApplyOutcome::Unchanged,
    }
}

/// The same effect with a new amount, for effects that can be amended.
fn amended(base: &Effect, amount: i64) -> Option<Effect> {
    match base {
        Effect::Increase(_) => Some(Effect::Increase(amount)),
        Effect::Decrease(_) => Some(Effect::Decrease(amount)),
        Effect::Add { item, .. } => Some(Effect::Add {
            item: *item,
            quantity: amount,
        }),
        _ => None,
    }
}

/// Per-item movement between two snapshots in the given direction.
fn moved_items(
    direction: DiffDirection,
    before: &BTreeMap<ItemId, i64>,
    after: &BTreeMap<ItemId, i64>,
) -> BTreeMap<ItemId, i64> {
    let (from, to) = match direction {
        // Items leave the inventory
        DiffDirection::Fill => (before, after),
        // Items enter the inventory
        DiffDirection::Empty => (after, before),
    };
    from.iter()
        .filter_map(|(item, quantity)| {
            let moved = quantity - to.get(item).copied().unwrap_or(0);
            (moved > 0).then_some((*item, moved))
        })
        .collect()
}

impl KindRuntime {
    /// Apply an effect, tracking amendable effects and fractional usage.
    pub(super) fn apply_effect(
        &mut self,
        kind: &TrackedItemKind,
        effect: Effect,
        env: &ApplyEnv<'_>,
    ) -> ApplyOutcome {
        if let Effect::Amend(amount) = effect {
            let base = self
                .last_amendable
                .as_ref()
                .filter(|(_, at)| env.tick.saturating_sub(*at) < env.lookback)
                .and_then(|(base, _)| amended(base, amount));
            return match base {
                Some(effect) => self.apply_primitive(kind, &effect, env),
                None => ApplyOutcome::Skipped(SkipReason::NothingToAmend),
            };
        }

        let outcome = self.apply_primitive(kind, &effect, env);
        match effect {
            Effect::Increase(_) | Effect::Decrease(_) | Effect::Add { .. } => {
                if outcome != ApplyOutcome::Skipped(SkipReason::ShapeMismatch) {
                    self.last_amendable = Some((effect, env.tick));
                }
            }
            Effect::Reset => {
                self.last_amendable = None;
                if self.residuals != Residuals::default() {
                    self.residuals = Residuals::default();
                    return ApplyOutcome::Changed;
                }
            }
            _ => {}
        }
        outcome
    }

    fn apply_primitive(
        &mut self,
        kind: &TrackedItemKind,
        effect: &Effect,
        env: &ApplyEnv<'_>,
    ) -> ApplyOutcome {
        let bounds = kind.bounds();
        let contents = kind.holds_contents();
        let mismatch = ApplyOutcome::Skipped(SkipReason::ShapeMismatch);

        match effect {
            Effect::Set(value) if !contents => self.state.set_charges(*value, &bounds),
            Effect::Increase(delta) if !contents => self.state.adjust_charges(*delta, &bounds),
            Effect::Decrease(delta) if !contents => {
                self.state.adjust_charges(delta.saturating_neg(), &bounds)
            }
            Effect::Add { item, quantity } if contents => {
                if !kind.accepts(*item, env.items) {
                    return mismatch;
                }
                self.state
                    .add_item(*item, *quantity, kind.capacity_for(*item))
            }
            Effect::Remove { item, quantity } if contents => {
                self.state.remove_item(*item, *quantity)
            }
            Effect::Replace(incoming) if contents => {
                let accepted = incoming
                    .iter()
                    .filter(|(item, _)| kind.accepts(**item, env.items))
                    .map(|(item, quantity)| (*item, *quantity))
                    .collect();
                self.state
                    .replace_contents(accepted, |item| kind.capacity_for(item))
            }
            Effect::Clear if contents => self.state.clear_contents(),
            Effect::Reset => self.state.reset(),
            Effect::Transfer {
                direction,
                before,
                after,
            } => self.transfer(kind, *direction, before, after, env),
            Effect::Consume { uses } => match kind.dual() {
                Some(resource) => self.consume(resource, *uses, env),
                None if !contents => self.state.adjust_charges(-uses, &bounds),
                None => mismatch,
            },
            Effect::Amend(_) => ApplyOutcome::Skipped(SkipReason::NothingToAmend),
            _ => mismatch,
        }
    }

    /// Move items between the inventory and the family.
    ///
    /// Containers take or give the accepted sub-items that moved. Counters
    /// with rechargeable components convert moved components into charges,
    /// limited by the scarcest component.
    fn transfer(
        &mut self,
        kind: &TrackedItemKind,
        direction: DiffDirection,
        before: &BTreeMap<ItemId, i64>,
        after: &BTreeMap<ItemId, i64>,
        env: &ApplyEnv<'_>,
    ) -> ApplyOutcome {
        let moved = moved_items(direction, before, after);

        if !kind.holds_contents() {
            if kind.components.is_empty() {
                return ApplyOutcome::Skipped(SkipReason::ShapeMismatch);
            }
            let charges = kind
                .components
                .iter()
                .map(|component| {
                    moved.get(&component.item).copied().unwrap_or(0) / component.per_charge.max(1)
                })
                .min()
                .unwrap_or(0);
            if charges == 0 {
                return ApplyOutcome::Unchanged;
            }
            let delta = match direction {
                DiffDirection::Fill => charges,
                DiffDirection::Empty => -charges,
            };
            return self.state.adjust_charges(delta, &kind.bounds());
        }

        let moved: Vec<(ItemId, i64)> = moved
            .into_iter()
            .filter(|(item, _)| kind.accepts(*item, env.items))
            .collect();
        if moved.is_empty() {
            return ApplyOutcome::Unchanged;
        }
        if !self.state.is_known() {
            return ApplyOutcome::Skipped(SkipReason::UnknownBase);
        }

        moved
            .into_iter()
            .map(|(item, quantity)| match direction {
                DiffDirection::Fill => {
                    self.state
                        .add_item(item, quantity, kind.capacity_for(item))
                }
                DiffDirection::Empty => self.state.remove_item(item, Some(quantity)),
            })
            .fold(ApplyOutcome::Unchanged, combine)
    }

    /// Consume `uses` of a dual-resource family.
    ///
    /// Each resource accumulates its fractional usage and only whole units
    /// are removed. The secondary resource is whichever accepted sub-item is
    /// loaded; with none loaded only the primary is consumed.
    fn consume(&mut self, resource: &DualResource, uses: i64, env: &ApplyEnv<'_>) -> ApplyOutcome {
        let Some(contents) = self.state.contents() else {
            return match self.state {
                ChargeState::Unknown => ApplyOutcome::Skipped(SkipReason::UnknownBase),
                _ => ApplyOutcome::Skipped(SkipReason::ShapeMismatch),
            };
        };
        if uses <= 0 {
            return ApplyOutcome::Unchanged;
        }

        let loaded = contents
            .keys()
            .copied()
            .find(|item| *item != resource.primary && resource.secondary.accepts(*item, env.items));

        let mut outcome = ApplyOutcome::Unchanged;

        self.residuals.primary += uses as f64 * resource.primary_per_use;
        let whole = (self.residuals.primary + EPSILON).floor();
        self.residuals.primary = (self.residuals.primary - whole).max(0.0);
        if whole >= 1.0 {
            outcome = combine(
                outcome,
                self.state.remove_item(resource.primary, Some(whole as i64)),
            );
        }

        if let Some(dart) = loaded {
            self.residuals.secondary += uses as f64 * env.dart_consumption;
            let whole = (self.residuals.secondary + EPSILON).floor();
            self.residuals.secondary = (self.residuals.secondary - whole).max(0.0);
            if whole >= 1.0 {
                outcome = combine(outcome, self.state.remove_item(dart, Some(whole as i64)));
            }
        }

        // Residual movement alone still needs persisting
        combine(outcome, ApplyOutcome::Changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use item_rules::{ItemDirectory, ItemFilter};

    fn items() -> ItemDirectory {
        ItemDirectory::new()
            .with_item(207, "Grimy ranarr weed", false, true)
            .with_item(3049, "Grimy toadflax", false, true)
            .with_item(560, "Death rune", true, true)
            .with_item(12934, "Zulrah's scales", true, true)
            .with_item(810, "Adamant dart", true, true)
    }

    fn env(items: &ItemDirectory, tick: u64) -> ApplyEnv<'_> {
        ApplyEnv {
            items,
            tick,
            lookback: 2,
            dart_consumption: 1.0,
        }
    }

    fn sack() -> TrackedItemKind {
        TrackedItemKind::container(
            "sack",
            "Herb sack",
            ItemFilter::NamePrefix("Grimy ".to_string()),
        )
        .with_capacity(28)
    }

    fn blowpipe() -> TrackedItemKind {
        TrackedItemKind::dual_resource(
            "blowpipe",
            "Toxic blowpipe",
            DualResource {
                primary: ItemId(12934),
                primary_per_use: 2.0 / 3.0,
                primary_capacity: 16383,
                secondary: ItemFilter::NameSuffix(" dart".to_string()),
                secondary_capacity: 16383,
            },
        )
    }

    #[test]
    fn test_shape_mismatch_leaves_state_alone() {
        let items = items();
        let mut runtime = KindRuntime::default();
        let outcome = runtime.apply_effect(&sack(), Effect::Set(3), &env(&items, 1));
        assert_eq!(outcome, ApplyOutcome::Skipped(SkipReason::ShapeMismatch));
        assert_eq!(runtime.state, ChargeState::Unknown);
    }

    #[test]
    fn test_rejected_sub_items_are_dropped() {
        let items = items();
        let mut runtime = KindRuntime::default();
        let incoming = BTreeMap::from([(ItemId(207), 3), (ItemId(560), 50)]);
        runtime.apply_effect(&sack(), Effect::Replace(incoming), &env(&items, 1));
        assert_eq!(runtime.state.total(), Some(3));
        assert_eq!(
            runtime.apply_effect(
                &sack(),
                Effect::Add {
                    item: ItemId(560),
                    quantity: 1
                },
                &env(&items, 1)
            ),
            ApplyOutcome::Skipped(SkipReason::ShapeMismatch)
        );
    }

    #[test]
    fn test_amend_reapplies_recent_add() {
        let items = items();
        let mut runtime = KindRuntime {
            state: ChargeState::Contents(BTreeMap::new()),
            ..Default::default()
        };
        let add = Effect::Add {
            item: ItemId(207),
            quantity: 1,
        };
        runtime.apply_effect(&sack(), add, &env(&items, 5));
        runtime.apply_effect(&sack(), Effect::Amend(1), &env(&items, 5));
        assert_eq!(runtime.state.quantity_of(ItemId(207)), 2);

        // Too late to amend
        assert_eq!(
            runtime.apply_effect(&sack(), Effect::Amend(1), &env(&items, 7)),
            ApplyOutcome::Skipped(SkipReason::NothingToAmend)
        );
    }

    #[test]
    fn test_transfer_fill_and_empty() {
        let items = items();
        let mut runtime = KindRuntime {
            state: ChargeState::Contents(BTreeMap::from([(ItemId(207), 2)])),
            ..Default::default()
        };
        let inventory = BTreeMap::from([(ItemId(207), 5), (ItemId(560), 10)]);
        let after_fill = BTreeMap::from([(ItemId(560), 9)]);

        runtime.apply_effect(
            &sack(),
            Effect::Transfer {
                direction: DiffDirection::Fill,
                before: inventory.clone(),
                after: after_fill.clone(),
            },
            &env(&items, 1),
        );
        assert_eq!(runtime.state.quantity_of(ItemId(207)), 7);
        assert_eq!(runtime.state.quantity_of(ItemId(560)), 0);

        runtime.apply_effect(
            &sack(),
            Effect::Transfer {
                direction: DiffDirection::Empty,
                before: after_fill,
                after: inventory,
            },
            &env(&items, 2),
        );
        assert_eq!(runtime.state.quantity_of(ItemId(207)), 2);
    }

    #[test]
    fn test_transfer_into_unknown_container_is_skipped() {
        let items = items();
        let mut runtime = KindRuntime::default();
        let outcome = runtime.apply_effect(
            &sack(),
            Effect::Transfer {
                direction: DiffDirection::Fill,
                before: BTreeMap::from([(ItemId(207), 1)]),
                after: BTreeMap::new(),
            },
            &env(&items, 1),
        );
        assert_eq!(outcome, ApplyOutcome::Skipped(SkipReason::UnknownBase));
    }

    #[test]
    fn test_counter_transfer_uses_components() {
        let items = items();
        let kind = TrackedItemKind::counter("staff", "Staff")
            .with_capacity(100)
            .with_component(560, 2);
        let mut runtime = KindRuntime {
            state: ChargeState::Charges(1),
            ..Default::default()
        };
        runtime.apply_effect(
            &kind,
            Effect::Transfer {
                direction: DiffDirection::Fill,
                before: BTreeMap::from([(ItemId(560), 10)]),
                after: BTreeMap::from([(ItemId(560), 3)]),
            },
            &env(&items, 1),
        );
        assert_eq!(runtime.state, ChargeState::Charges(4));
    }

    #[test]
    fn test_consume_accumulates_fractions() {
        let items = items();
        let mut runtime = KindRuntime {
            state: ChargeState::Contents(BTreeMap::from([
                (ItemId(12934), 100),
                (ItemId(810), 50),
            ])),
            ..Default::default()
        };
        let env = ApplyEnv {
            dart_consumption: 0.2,
            ..env(&items, 1)
        };

        runtime.apply_effect(&blowpipe(), Effect::Consume { uses: 1 }, &env);
        assert_eq!(runtime.state.quantity_of(ItemId(12934)), 100);
        runtime.apply_effect(&blowpipe(), Effect::Consume { uses: 2 }, &env);
        assert_eq!(runtime.state.quantity_of(ItemId(12934)), 98);
        assert!(runtime.residuals.primary.abs() < 1e-6);

        runtime.apply_effect(&blowpipe(), Effect::Consume { uses: 2 }, &env);
        assert_eq!(runtime.state.quantity_of(ItemId(810)), 49);
    }

    #[test]
    fn test_reset_clears_residuals() {
        let items = items();
        let mut runtime = KindRuntime {
            state: ChargeState::Contents(BTreeMap::from([(ItemId(12934), 10)])),
            ..Default::default()
        };
        runtime.apply_effect(&blowpipe(), Effect::Consume { uses: 1 }, &env(&items, 1));
        assert!(runtime.residuals.primary > 0.0);

        runtime.apply_effect(&blowpipe(), Effect::Reset, &env(&items, 2));
        assert_eq!(runtime.state, ChargeState::Unknown);
        assert_eq!(runtime.residuals, Residuals::default());
    }
}
