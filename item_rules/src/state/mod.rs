//! Charge state - the reconciled value of one tracked family.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::items::ItemId;

/// The reconciled value for one tracked family.
///
/// Invariants: a counter is never negative, a mapping never holds an entry
/// at or below zero, and declared capacities are never exceeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum ChargeState {
    /// Never observed this session.
    #[default]
    Unknown,
    Charges(i64),
    Contents(BTreeMap<ItemId, i64>),
}

/// Clamping parameters taken from a family descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub capacity: Option<i64>,
    pub allow_underflow: bool,
    pub zero_is_known: bool,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            capacity: None,
            allow_underflow: false,
            zero_is_known: true,
        }
    }
}

impl Bounds {
    /// Clamp into `[0, capacity]`.
    pub fn clamp(&self, value: i64) -> i64 {
        let value = value.max(0);
        match self.capacity {
            Some(capacity) => value.min(capacity),
            None => value,
        }
    }
}

/// Result of applying a primitive to a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Changed,
    Unchanged,
    Skipped(SkipReason),
}

impl ApplyOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, ApplyOutcome::Changed)
    }
}

/// Why a primitive left the state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A relative change needs a known starting value.
    UnknownBase,
    /// The decrement would go below zero.
    Underflow,
    /// A scalar operation on a mapping, or the reverse.
    ShapeMismatch,
    /// An amendment with no recent effect to amend.
    NothingToAmend,
}

impl ChargeState {
    pub fn is_known(&self) -> bool {
        !matches!(self, ChargeState::Unknown)
    }

    pub fn charges(&self) -> Option<i64> {
        match self {
            ChargeState::Charges(charges) => Some(*charges),
            _ => None,
        }
    }

    pub fn contents(&self) -> Option<&BTreeMap<ItemId, i64>> {
        match self {
            ChargeState::Contents(contents) => Some(contents),
            _ => None,
        }
    }

    /// Quantity of one sub-item, zero when absent.
    pub fn quantity_of(&self, item: ItemId) -> i64 {
        self.contents()
            .and_then(|contents| contents.get(&item).copied())
            .unwrap_or(0)
    }

    /// Counter value, or the sum of all sub-item quantities.
    pub fn total(&self) -> Option<i64> {
        match self {
            ChargeState::Unknown => None,
            ChargeState::Charges(charges) => Some(*charges),
            ChargeState::Contents(contents) => Some(contents.values().sum()),
        }
    }

    fn replace(&mut self, next: ChargeState) -> ApplyOutcome {
        if *self == next {
            ApplyOutcome::Unchanged
        } else {
            *self = next;
            ApplyOutcome::Changed
        }
    }

    fn normalized_charges(value: i64, bounds: &Bounds) -> ChargeState {
        let value = bounds.clamp(value);
        if value == 0 && !bounds.zero_is_known {
            ChargeState::Unknown
        } else {
            ChargeState::Charges(value)
        }
    }

    /// Set the counter, clamped into `[0, capacity]`.
    pub fn set_charges(&mut self, value: i64, bounds: &Bounds) -> ApplyOutcome {
        if matches!(self, ChargeState::Contents(_)) {
            return ApplyOutcome::Skipped(SkipReason::ShapeMismatch);
        }
        self.replace(Self::normalized_charges(value, bounds))
    }

    /// Add a signed delta to the counter.
    ///
    /// A decrement past zero is refused before anything changes unless the
    /// bounds allow underflow, in which case it clamps to zero.
    pub fn adjust_charges(&mut self, delta: i64, bounds: &Bounds) -> ApplyOutcome {
        let current = match self {
            ChargeState::Charges(charges) => *charges,
            ChargeState::Unknown => return ApplyOutcome::Skipped(SkipReason::UnknownBase),
            ChargeState::Contents(_) => return ApplyOutcome::Skipped(SkipReason::ShapeMismatch),
        };
        let target = current.saturating_add(delta);
        if target < 0 && !bounds.allow_underflow {
            return ApplyOutcome::Skipped(SkipReason::Underflow);
        }
        self.replace(Self::normalized_charges(target, bounds))
    }

    /// Merge a sub-item into the mapping, capped at `capacity`.
    pub fn add_item(&mut self, item: ItemId, quantity: i64, capacity: Option<i64>) -> ApplyOutcome {
        let ChargeState::Contents(contents) = self else {
            return match self {
                ChargeState::Unknown => ApplyOutcome::Skipped(SkipReason::UnknownBase),
                _ => ApplyOutcome::Skipped(SkipReason::ShapeMismatch),
            };
        };
        if quantity <= 0 {
            return ApplyOutcome::Unchanged;
        }
        let current = contents.get(&item).copied().unwrap_or(0);
        let mut next = current.saturating_add(quantity);
        if let Some(capacity) = capacity {
            next = next.min(capacity);
        }
        if next == current {
            return ApplyOutcome::Unchanged;
        }
        contents.insert(item, next);
        ApplyOutcome::Changed
    }

    /// Take a sub-item out of the mapping. `None` removes all of it.
    pub fn remove_item(&mut self, item: ItemId, quantity: Option<i64>) -> ApplyOutcome {
        let ChargeState::Contents(contents) = self else {
            return match self {
                ChargeState::Unknown => ApplyOutcome::Skipped(SkipReason::UnknownBase),
                _ => ApplyOutcome::Skipped(SkipReason::ShapeMismatch),
            };
        };
        let Some(current) = contents.get(&item).copied() else {
            return ApplyOutcome::Unchanged;
        };
        let remaining = match quantity {
            Some(quantity) if quantity <= 0 => return ApplyOutcome::Unchanged,
            Some(quantity) => current - quantity,
            None => 0,
        };
        if remaining > 0 {
            contents.insert(item, remaining);
        } else {
            contents.remove(&item);
        }
        ApplyOutcome::Changed
    }

    /// Replace the mapping wholesale, dropping empty entries and capping
    /// each sub-item.
    pub fn replace_contents(
        &mut self,
        contents: BTreeMap<ItemId, i64>,
        capacity_for: impl Fn(ItemId) -> Option<i64>,
    ) -> ApplyOutcome {
        if matches!(self, ChargeState::Charges(_)) {
            return ApplyOutcome::Skipped(SkipReason::ShapeMismatch);
        }
        let contents = contents
            .into_iter()
            .filter(|(_, quantity)| *quantity > 0)
            .map(|(item, quantity)| match capacity_for(item) {
                Some(capacity) => (item, quantity.min(capacity)),
                None => (item, quantity),
            })
            .filter(|(_, quantity)| *quantity > 0)
            .collect();
        self.replace(ChargeState::Contents(contents))
    }

    /// Empty a mapping. Known-empty, never unknown.
    pub fn clear_contents(&mut self) -> ApplyOutcome {
        if matches!(self, ChargeState::Charges(_)) {
            return ApplyOutcome::Skipped(SkipReason::ShapeMismatch);
        }
        self.replace(ChargeState::Contents(BTreeMap::new()))
    }

    /// Forget the state.
    pub fn reset(&mut self) -> ApplyOutcome {
        self.replace(ChargeState::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(capacity: i64) -> Bounds {
        Bounds {
            capacity: Some(capacity),
            ..Default::default()
        }
    }

    #[test]
    fn test_set_clamps_to_capacity() {
        let mut state = ChargeState::Unknown;
        assert_eq!(state.set_charges(3000, &bounds(2500)), ApplyOutcome::Changed);
        assert_eq!(state, ChargeState::Charges(2500));

        state.set_charges(-5, &bounds(2500));
        assert_eq!(state, ChargeState::Charges(0));
    }

    #[test]
    fn test_zero_means_unknown() {
        let bounds = Bounds {
            zero_is_known: false,
            ..Default::default()
        };
        let mut state = ChargeState::Charges(1);
        state.adjust_charges(-1, &bounds);
        assert_eq!(state, ChargeState::Unknown);
    }

    #[test]
    fn test_decrement_underflow_is_guarded() {
        let mut state = ChargeState::Charges(2);
        assert_eq!(
            state.adjust_charges(-3, &bounds(10)),
            ApplyOutcome::Skipped(SkipReason::Underflow)
        );
        assert_eq!(state, ChargeState::Charges(2));

        let lenient = Bounds {
            allow_underflow: true,
            ..bounds(10)
        };
        state.adjust_charges(-3, &lenient);
        assert_eq!(state, ChargeState::Charges(0));
    }

    #[test]
    fn test_relative_change_needs_known_base() {
        let mut state = ChargeState::Unknown;
        assert_eq!(
            state.adjust_charges(5, &bounds(10)),
            ApplyOutcome::Skipped(SkipReason::UnknownBase)
        );
        assert_eq!(
            state.add_item(ItemId(1), 1, None),
            ApplyOutcome::Skipped(SkipReason::UnknownBase)
        );
    }

    #[test]
    fn test_contents_add_remove() {
        let mut state = ChargeState::Contents(BTreeMap::new());
        state.add_item(ItemId(207), 27, Some(28));
        state.add_item(ItemId(207), 5, Some(28));
        assert_eq!(state.quantity_of(ItemId(207)), 28);

        state.remove_item(ItemId(207), Some(30));
        assert!(state.contents().unwrap().is_empty());
        assert_eq!(state.remove_item(ItemId(207), None), ApplyOutcome::Unchanged);
    }

    #[test]
    fn test_replace_contents_filters_and_caps() {
        let mut state = ChargeState::Unknown;
        let incoming = BTreeMap::from([(ItemId(1), 40), (ItemId(2), 0), (ItemId(3), 2)]);
        state.replace_contents(incoming, |_| Some(30));
        let contents = state.contents().unwrap();
        assert_eq!(contents.get(&ItemId(1)), Some(&30));
        assert!(!contents.contains_key(&ItemId(2)));
        assert_eq!(state.total(), Some(32));
    }

    #[test]
    fn test_clear_is_known_empty() {
        let mut state = ChargeState::Unknown;
        state.clear_contents();
        assert!(state.is_known());
        assert_eq!(state.total(), Some(0));
    }

    #[test]
    fn test_json_round_trip() {
        let state = ChargeState::Contents(BTreeMap::from([(ItemId(207), 10), (ItemId(3049), 2)]));
        let json = serde_json::to_string(&state).unwrap();
        let back: ChargeState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);

        let unknown: ChargeState = serde_json::from_str(r#"{"state":"unknown"}"#).unwrap();
        assert_eq!(unknown, ChargeState::Unknown);
    }
}
