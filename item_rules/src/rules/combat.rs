//! Hitsplat rules.

use super::PresenceRequirement;
use crate::signals::{Hitsplat, HitsplatKind, HitsplatTarget};

/// Decrement on a qualifying hitsplat, at most once per cooldown window.
///
/// Approximates a hidden server-side degradation timer: the loss happens on
/// a hit, but only if `cooldown_ticks` have passed since the previous loss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitsplatRule {
    pub target: HitsplatTarget,
    pub min_amount: i32,
    pub cooldown_ticks: u64,
    pub decrement: i64,
    pub requires: PresenceRequirement,
}

impl HitsplatRule {
    pub fn new(target: HitsplatTarget, cooldown_ticks: u64, decrement: i64) -> Self {
        Self {
            target,
            min_amount: 0,
            cooldown_ticks,
            decrement,
            requires: PresenceRequirement::Worn,
        }
    }

    pub fn with_min_amount(mut self, amount: i32) -> Self {
        self.min_amount = amount;
        self
    }

    pub fn qualifies(&self, hitsplat: &Hitsplat) -> bool {
        hitsplat.target == self.target
            && !matches!(hitsplat.kind, HitsplatKind::Heal)
            && hitsplat.amount >= self.min_amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualifies() {
        let rule = HitsplatRule::new(HitsplatTarget::SelfActor, 100, 1).with_min_amount(1);
        let hit = Hitsplat {
            target: HitsplatTarget::SelfActor,
            amount: 5,
            kind: HitsplatKind::Damage,
        };
        assert!(rule.qualifies(&hit));

        let zero = Hitsplat { amount: 0, ..hit };
        assert!(!rule.qualifies(&zero));

        let outgoing = Hitsplat {
            target: HitsplatTarget::Other,
            ..hit
        };
        assert!(!rule.qualifies(&outgoing));
    }
}
