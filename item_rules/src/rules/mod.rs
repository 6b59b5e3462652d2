//! Declarative rules: signal patterns mapped to effects.
//!
//! Rule tables are ordered. The engine applies the **first** matching rule
//! of a table and never evaluates later ones, so more specific rules must be
//! declared before more general ones. Overlapping patterns are not detected.

mod animation;
mod combat;
mod container;
mod dialog;
mod effect;
mod message;
mod quantity;

pub use animation::*;
pub use combat::*;
pub use container::*;
pub use dialog::*;
pub use effect::*;
pub use message::*;
pub use quantity::*;

/// Where the item must be for a rule to apply to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PresenceRequirement {
    /// The rule identifies its item on its own.
    #[default]
    Unconstrained,
    Worn,
    Carried,
    WornOrCarried,
}

/// Errors raised while authoring rule tables.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("invalid rule pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("kind `{kind}` references unknown shared rule `{rule}`")]
    UnknownSharedRule { kind: String, rule: String },

    #[error("duplicate kind `{0}`")]
    DuplicateKind(String),
}

/// Any rule, for building tables.
#[derive(Debug, Clone)]
pub enum Rule {
    Message(MessageRule),
    Animation(AnimationRule),
    Dialog(DialogRule),
    ContainerDiff(ContainerDiffRule),
    Hitsplat(HitsplatRule),
}

impl From<MessageRule> for Rule {
    fn from(rule: MessageRule) -> Self {
        Rule::Message(rule)
    }
}

impl From<AnimationRule> for Rule {
    fn from(rule: AnimationRule) -> Self {
        Rule::Animation(rule)
    }
}

impl From<DialogRule> for Rule {
    fn from(rule: DialogRule) -> Self {
        Rule::Dialog(rule)
    }
}

impl From<ContainerDiffRule> for Rule {
    fn from(rule: ContainerDiffRule) -> Self {
        Rule::ContainerDiff(rule)
    }
}

impl From<HitsplatRule> for Rule {
    fn from(rule: HitsplatRule) -> Self {
        Rule::Hitsplat(rule)
    }
}

/// A family's rules, one ordered list per signal type.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    pub check: Vec<MessageRule>,
    pub update: Vec<MessageRule>,
    pub animation: Vec<AnimationRule>,
    pub dialog: Vec<DialogRule>,
    pub container: Vec<ContainerDiffRule>,
    pub hitsplat: Vec<HitsplatRule>,
}

impl RuleTable {
    /// Append a rule to the list for its type.
    pub fn add(&mut self, rule: Rule) {
        match rule {
            Rule::Message(rule) => match rule.family {
                MessageFamily::Check => self.check.push(rule),
                MessageFamily::Update => self.update.push(rule),
            },
            Rule::Animation(rule) => self.animation.push(rule),
            Rule::Dialog(rule) => self.dialog.push(rule),
            Rule::ContainerDiff(rule) => self.container.push(rule),
            Rule::Hitsplat(rule) => self.hitsplat.push(rule),
        }
    }

    /// Message rules in evaluation order: checks before updates.
    pub fn messages(&self) -> impl Iterator<Item = &MessageRule> {
        self.check.iter().chain(self.update.iter())
    }

    pub fn len(&self) -> usize {
        self.check.len()
            + self.update.len()
            + self.animation.len()
            + self.dialog.len()
            + self.container.len()
            + self.hitsplat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Identifier of a rule in the shared non-unique pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SharedRuleId(pub String);

impl SharedRuleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for SharedRuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generic message rules reused by many families.
///
/// A shared rule applies to whichever participating family is currently
/// relevant rather than to a fixed one.
#[derive(Debug, Clone, Default)]
pub struct SharedRulePool {
    rules: Vec<(SharedRuleId, MessageRule)>,
}

impl SharedRulePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, id: &str, rule: MessageRule) -> Self {
        self.rules.push((SharedRuleId::new(id), rule));
        self
    }

    pub fn get(&self, id: &SharedRuleId) -> Option<&MessageRule> {
        self.rules
            .iter()
            .find(|(rule_id, _)| rule_id == id)
            .map(|(_, rule)| rule)
    }

    pub fn contains(&self, id: &SharedRuleId) -> bool {
        self.get(id).is_some()
    }

    /// Rules in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&SharedRuleId, &MessageRule)> {
        self.rules.iter().map(|(id, rule)| (id, rule))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_table_routes_by_family() {
        let mut table = RuleTable::default();
        table.add(
            MessageRule::update("b", EffectTemplate::Clear)
                .unwrap()
                .into(),
        );
        table.add(
            MessageRule::check("a", EffectTemplate::Clear)
                .unwrap()
                .into(),
        );
        table.add(AnimationRule::new([1], 1).into());

        assert_eq!(table.check.len(), 1);
        assert_eq!(table.update.len(), 1);
        assert_eq!(table.len(), 3);

        let order: Vec<_> = table.messages().map(|rule| rule.pattern()).collect();
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn test_shared_pool_lookup() {
        let pool = SharedRulePool::new().with_rule(
            "ran_out",
            MessageRule::update("run out of charges", EffectTemplate::Set(Quantity::Fixed(0)))
                .unwrap(),
        );
        assert!(pool.contains(&SharedRuleId::new("ran_out")));
        assert!(!pool.contains(&SharedRuleId::new("missing")));
        assert_eq!(pool.len(), 1);
    }
}
