//! Tracked item family descriptors.

use std::collections::BTreeSet;

use super::{normalize_name, ItemId, ItemLookup, KindId};
use crate::rules::{
    AnimationRule, ContainerDiffRule, DialogRule, HitsplatRule, MessageRule, Rule, RuleTable,
    SharedRuleId,
};
use crate::state::Bounds;

/// A rechargeable component consumed per charge.
///
/// A trident charge costs one death rune, one chaos rune, five fire runes
/// and ten coins; each of those is a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Component {
    pub item: ItemId,
    pub per_charge: i64,
}

/// Which sub-items a container accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemFilter {
    Any,
    Ids(BTreeSet<ItemId>),
    /// Case-insensitive prefix of the item name.
    NamePrefix(String),
    /// Case-insensitive suffix of the item name.
    NameSuffix(String),
}

impl ItemFilter {
    pub fn ids(ids: impl IntoIterator<Item = i32>) -> Self {
        ItemFilter::Ids(ids.into_iter().map(ItemId).collect())
    }

    /// Check whether an item passes this filter.
    pub fn accepts(&self, item: ItemId, lookup: &dyn ItemLookup) -> bool {
        match self {
            ItemFilter::Any => true,
            ItemFilter::Ids(ids) => ids.contains(&item),
            ItemFilter::NamePrefix(prefix) => lookup
                .name(item)
                .map(|name| normalize_name(name).starts_with(&normalize_name(prefix)))
                .unwrap_or(false),
            ItemFilter::NameSuffix(suffix) => lookup
                .name(item)
                .map(|name| normalize_name(name).ends_with(&normalize_name(suffix)))
                .unwrap_or(false),
        }
    }
}

/// Two sub-counters consumed at different rates per use.
///
/// The primary resource is a fixed sub-item (scales); the secondary is
/// whichever accepted sub-item is currently loaded (darts). The secondary
/// rate is not part of the descriptor: it depends on player configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct DualResource {
    pub primary: ItemId,
    pub primary_per_use: f64,
    pub primary_capacity: i64,
    pub secondary: ItemFilter,
    pub secondary_capacity: i64,
}

/// The shape of the reconciled state.
#[derive(Debug, Clone, PartialEq)]
pub enum KindShape {
    /// A scalar charge counter.
    Counter,
    /// A bounded multiset of sub-items.
    Container { accepts: ItemFilter },
    /// A container with a primary and a secondary consumable.
    DualResource(DualResource),
}

/// Declarative descriptor of one tracked item family.
#[derive(Debug, Clone)]
pub struct TrackedItemKind {
    pub id: KindId,
    pub display_name: String,
    /// Extra names the game uses for this family in text.
    pub aliases: Vec<String>,
    /// Variants representing the charged/active form.
    pub charged: Vec<ItemId>,
    /// Variants representing the empty/inactive form.
    pub uncharged: Vec<ItemId>,
    /// Counter limit, or per-sub-item limit for containers.
    pub capacity: Option<i64>,
    /// Depletion warning threshold.
    pub low_threshold: i64,
    /// Whether zero is a valid known value ("empty") or means "unknown".
    pub zero_is_known: bool,
    /// Whether a decrement past zero clamps instead of being ignored.
    pub allow_underflow: bool,
    pub shape: KindShape,
    pub components: Vec<Component>,
    pub rules: RuleTable,
    /// Non-unique rules this family participates in.
    pub shared_rules: Vec<SharedRuleId>,
}

impl TrackedItemKind {
    fn new(id: &str, display_name: &str, shape: KindShape) -> Self {
        Self {
            id: KindId::new(id),
            display_name: display_name.to_string(),
            aliases: Vec::new(),
            charged: Vec::new(),
            uncharged: Vec::new(),
            capacity: None,
            low_threshold: 0,
            zero_is_known: true,
            allow_underflow: false,
            shape,
            components: Vec::new(),
            rules: RuleTable::default(),
            shared_rules: Vec::new(),
        }
    }

    /// Create a scalar charge counter family.
    pub fn counter(id: &str, display_name: &str) -> Self {
        Self::new(id, display_name, KindShape::Counter)
    }

    /// Create a container family accepting the given sub-items.
    pub fn container(id: &str, display_name: &str, accepts: ItemFilter) -> Self {
        Self::new(id, display_name, KindShape::Container { accepts })
    }

    /// Create a dual-resource family.
    pub fn dual_resource(id: &str, display_name: &str, resource: DualResource) -> Self {
        Self::new(id, display_name, KindShape::DualResource(resource))
    }

    /// Set the charged and uncharged variant ids.
    pub fn with_variants(
        mut self,
        charged: impl IntoIterator<Item = i32>,
        uncharged: impl IntoIterator<Item = i32>,
    ) -> Self {
        self.charged = charged.into_iter().map(ItemId).collect();
        self.uncharged = uncharged.into_iter().map(ItemId).collect();
        self
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    pub fn with_capacity(mut self, capacity: i64) -> Self {
        self.capacity = Some(capacity.max(0));
        self
    }

    pub fn with_low_threshold(mut self, threshold: i64) -> Self {
        self.low_threshold = threshold;
        self
    }

    /// Treat a zero count as unknown rather than empty.
    pub fn zero_is_unknown(mut self) -> Self {
        self.zero_is_known = false;
        self
    }

    /// Let decrements past zero clamp to zero instead of being ignored.
    pub fn allowing_underflow(mut self) -> Self {
        self.allow_underflow = true;
        self
    }

    pub fn with_component(mut self, item: i32, per_charge: i64) -> Self {
        self.components.push(Component {
            item: ItemId(item),
            per_charge,
        });
        self
    }

    /// Append a rule to the family's table, keeping declaration order.
    pub fn with_rule(mut self, rule: impl Into<Rule>) -> Self {
        self.rules.add(rule.into());
        self
    }

    pub fn with_message_rule(self, rule: MessageRule) -> Self {
        self.with_rule(rule)
    }

    pub fn with_animation_rule(self, rule: AnimationRule) -> Self {
        self.with_rule(rule)
    }

    pub fn with_dialog_rule(self, rule: DialogRule) -> Self {
        self.with_rule(rule)
    }

    pub fn with_diff_rule(self, rule: ContainerDiffRule) -> Self {
        self.with_rule(rule)
    }

    pub fn with_hitsplat_rule(self, rule: HitsplatRule) -> Self {
        self.with_rule(rule)
    }

    /// Opt into a rule from the shared non-unique pool.
    pub fn with_shared(mut self, id: &str) -> Self {
        self.shared_rules.push(SharedRuleId::new(id));
        self
    }

    /// Clamping parameters for state mutations.
    pub fn bounds(&self) -> Bounds {
        Bounds {
            capacity: self.capacity,
            allow_underflow: self.allow_underflow,
            zero_is_known: self.zero_is_known,
        }
    }

    pub fn is_variant(&self, item: ItemId) -> bool {
        self.charged.contains(&item) || self.uncharged.contains(&item)
    }

    pub fn is_charged_variant(&self, item: ItemId) -> bool {
        self.charged.contains(&item)
    }

    pub fn is_uncharged_variant(&self, item: ItemId) -> bool {
        self.uncharged.contains(&item)
    }

    /// Whether the state is a sub-item mapping rather than a scalar.
    pub fn holds_contents(&self) -> bool {
        !matches!(self.shape, KindShape::Counter)
    }

    /// The dual-resource description, for blowpipe-style families.
    pub fn dual(&self) -> Option<&DualResource> {
        match &self.shape {
            KindShape::DualResource(resource) => Some(resource),
            _ => None,
        }
    }

    /// Whether the family stores the given sub-item.
    pub fn accepts(&self, item: ItemId, lookup: &dyn ItemLookup) -> bool {
        match &self.shape {
            KindShape::Counter => false,
            KindShape::Container { accepts } => accepts.accepts(item, lookup),
            KindShape::DualResource(resource) => {
                item == resource.primary || resource.secondary.accepts(item, lookup)
            }
        }
    }

    /// Per-sub-item capacity, which differs per resource for dual kinds.
    pub fn capacity_for(&self, item: ItemId) -> Option<i64> {
        match &self.shape {
            KindShape::DualResource(resource) if item == resource.primary => {
                Some(resource.primary_capacity)
            }
            KindShape::DualResource(resource) => Some(resource.secondary_capacity),
            _ => self.capacity,
        }
    }

    /// Whether text naming an item refers to this family.
    pub fn answers_to(&self, name: &str, lookup: &dyn ItemLookup) -> bool {
        let wanted = normalize_name(name);
        if wanted.is_empty() {
            return false;
        }
        if normalize_name(&self.display_name) == wanted
            || self.aliases.iter().any(|alias| normalize_name(alias) == wanted)
        {
            return true;
        }
        self.charged
            .iter()
            .chain(self.uncharged.iter())
            .filter_map(|item| lookup.name(*item))
            .any(|variant| normalize_name(variant) == wanted)
    }

    /// The storage key holding this family's state.
    pub fn state_key(&self) -> String {
        self.id.0.clone()
    }

    /// Auxiliary storage key for accumulated fractional consumption.
    pub fn residual_key(&self) -> Option<String> {
        self.dual()
            .map(|_| format!("{}.residual", self.id.0))
    }

    /// All storage keys owned by this family.
    pub fn storage_keys(&self) -> Vec<String> {
        let mut keys = vec![self.state_key()];
        keys.extend(self.residual_key());
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::ItemDirectory;

    fn lookup() -> ItemDirectory {
        ItemDirectory::new()
            .with_item(11907, "Trident of the seas", false, true)
            .with_item(11908, "Uncharged trident", false, true)
            .with_item(207, "Grimy ranarr weed", false, true)
            .with_item(560, "Death rune", true, true)
    }

    #[test]
    fn test_counter_defaults() {
        let kind = TrackedItemKind::counter("trident", "Trident of the seas");
        assert!(kind.zero_is_known);
        assert!(!kind.allow_underflow);
        assert!(!kind.holds_contents());
        assert_eq!(kind.storage_keys(), vec!["trident".to_string()]);
    }

    #[test]
    fn test_answers_to_display_name_alias_and_variant() {
        let dir = lookup();
        let kind = TrackedItemKind::counter("trident", "Trident of the seas")
            .with_alias("trident")
            .with_variants([11907], [11908]);

        assert!(kind.answers_to("TRIDENT OF THE SEAS", &dir));
        assert!(kind.answers_to("trident", &dir));
        assert!(kind.answers_to("Uncharged trident", &dir));
        assert!(!kind.answers_to("sanguinesti staff", &dir));
    }

    #[test]
    fn test_container_accepts_by_prefix() {
        let dir = lookup();
        let kind = TrackedItemKind::container(
            "herb_sack",
            "Herb sack",
            ItemFilter::NamePrefix("Grimy ".to_string()),
        );
        assert!(kind.accepts(ItemId(207), &dir));
        assert!(!kind.accepts(ItemId(560), &dir));
    }

    #[test]
    fn test_dual_resource_keys_and_capacity() {
        let kind = TrackedItemKind::dual_resource(
            "blowpipe",
            "Toxic blowpipe",
            DualResource {
                primary: ItemId(12934),
                primary_per_use: 2.0 / 3.0,
                primary_capacity: 16383,
                secondary: ItemFilter::NameSuffix(" dart".to_string()),
                secondary_capacity: 16383,
            },
        );
        assert_eq!(kind.dual().map(|d| d.primary), Some(ItemId(12934)));
        assert_eq!(kind.storage_keys().len(), 2);
        assert_eq!(kind.residual_key().as_deref(), Some("blowpipe.residual"));
        assert_eq!(kind.capacity_for(ItemId(12934)), Some(16383));
    }
}
