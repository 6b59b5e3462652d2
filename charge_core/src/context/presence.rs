//! Where tracked items currently are.

use std::collections::BTreeSet;

use item_rules::{ContainerId, ContainerSnapshot, ItemId, PresenceRequirement, TrackedItemKind};

/// Items worn and carried, from the latest equipment and inventory snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Presence {
    worn: BTreeSet<ItemId>,
    carried: BTreeSet<ItemId>,
}

impl Presence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the worn or carried set from a snapshot. Other containers are
    /// ignored.
    pub fn update(&mut self, snapshot: &ContainerSnapshot) {
        let items = snapshot.totals().into_keys().collect();
        match snapshot.container {
            ContainerId::Equipment => self.worn = items,
            ContainerId::Inventory => self.carried = items,
            _ => {}
        }
    }

    pub fn is_worn(&self, item: ItemId) -> bool {
        self.worn.contains(&item)
    }

    pub fn is_carried(&self, item: ItemId) -> bool {
        self.carried.contains(&item)
    }

    fn any_variant(&self, kind: &TrackedItemKind, set: &BTreeSet<ItemId>) -> bool {
        kind.charged
            .iter()
            .chain(kind.uncharged.iter())
            .any(|item| set.contains(item))
    }

    pub fn kind_worn(&self, kind: &TrackedItemKind) -> bool {
        self.any_variant(kind, &self.worn)
    }

    pub fn kind_carried(&self, kind: &TrackedItemKind) -> bool {
        self.any_variant(kind, &self.carried)
    }

    pub fn kind_present(&self, kind: &TrackedItemKind) -> bool {
        self.kind_worn(kind) || self.kind_carried(kind)
    }

    /// Check a rule's presence requirement for a family.
    pub fn satisfies(&self, kind: &TrackedItemKind, requirement: PresenceRequirement) -> bool {
        match requirement {
            PresenceRequirement::Unconstrained => true,
            PresenceRequirement::Worn => self.kind_worn(kind),
            PresenceRequirement::Carried => self.kind_carried(kind),
            PresenceRequirement::WornOrCarried => self.kind_present(kind),
        }
    }

    /// Every worn or carried item.
    pub fn items(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.worn.union(&self.carried).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trident() -> TrackedItemKind {
        TrackedItemKind::counter("trident", "Trident").with_variants([11907], [11908])
    }

    #[test]
    fn test_presence_from_snapshots() {
        let mut presence = Presence::new();
        presence.update(&ContainerSnapshot::new(ContainerId::Equipment, [(11908, 1)]));
        assert!(presence.kind_worn(&trident()));
        assert!(!presence.kind_carried(&trident()));
        assert!(presence.satisfies(&trident(), PresenceRequirement::WornOrCarried));
        assert!(!presence.satisfies(&trident(), PresenceRequirement::Carried));
        assert!(presence.satisfies(&trident(), PresenceRequirement::Unconstrained));

        presence.update(&ContainerSnapshot::new(ContainerId::Equipment, []));
        assert!(!presence.kind_present(&trident()));
    }

    #[test]
    fn test_bank_snapshot_is_ignored() {
        let mut presence = Presence::new();
        presence.update(&ContainerSnapshot::new(ContainerId::Bank, [(11907, 1)]));
        assert_eq!(presence, Presence::new());
    }
}
