//! Rule matcher - the ordered first-match scan over rule tables.
//!
//! Message matching works in two passes:
//! 1. **Kind-specific**: every family's check list, then its update list,
//!    is scanned in declaration order; the first matching rule of a family
//!    produces that family's candidate and later rules are not evaluated
//! 2. **Shared pool**: only when no family-specific rule matched, the shared
//!    pool is scanned; the first matching shared rule produces a candidate
//!    for every family that opted into it
//!
//! The matcher never decides which candidate a signal is about; that is the
//! reconciler's target resolution.

use item_rules::{
    AnimationRule, Catalog, ChatMessage, ContainerDiffRule, ContainerId, DialogTrigger, Effect,
    Hitsplat, HitsplatRule, InstantiateError, ItemLookup, KindId, MessageFamily, MessageRule,
    PresenceRequirement, SharedRuleId, TrackedItemKind,
};

use crate::dialog::DialogEvent;

/// A family a signal may be about, with the effect it would receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub kind: KindId,
    pub effect: Effect,
    pub requires: PresenceRequirement,
    /// Item name the signal mentions, when its rule captures one.
    pub named_item: Option<String>,
    /// Message family for chat matches; `None` for dialog matches.
    pub family: Option<MessageFamily>,
    /// Resolve only after this tick's equipment changes are known.
    pub deferred: bool,
}

impl Candidate {
    fn from_message(
        kind: &TrackedItemKind,
        rule: &MessageRule,
        effect: Effect,
        named_item: Option<&str>,
    ) -> Self {
        Self {
            kind: kind.id.clone(),
            effect,
            requires: rule.requires,
            named_item: named_item.map(str::to_string),
            family: Some(rule.family),
            deferred: rule.deferred && rule.family == MessageFamily::Update,
        }
    }
}

/// The outcome of matching one signal.
#[derive(Debug, Clone, Default)]
pub struct Matches {
    pub candidates: Vec<Candidate>,
    /// Rules that matched but whose effect could not be built.
    pub failures: Vec<(KindId, InstantiateError)>,
    /// The shared rule that matched, for pool matches.
    pub shared_rule: Option<SharedRuleId>,
}

impl Matches {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty() && self.failures.is_empty()
    }

    /// Whether application should wait for the deferred flush.
    ///
    /// Check results always apply immediately.
    pub fn is_deferred(&self) -> bool {
        self.candidates.iter().any(|c| c.deferred)
            && !self
                .candidates
                .iter()
                .any(|c| c.family == Some(MessageFamily::Check))
    }

    pub fn kinds(&self) -> Vec<KindId> {
        self.candidates.iter().map(|c| c.kind.clone()).collect()
    }
}

/// An animation rule that fired for a family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationHit {
    pub kind: KindId,
    pub rule: AnimationRule,
}

/// A hitsplat rule that qualified for a family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitsplatHit {
    pub kind: KindId,
    pub rule: HitsplatRule,
}

/// Scans a catalog's rule tables.
pub struct RuleMatcher<'a> {
    catalog: &'a Catalog,
    items: &'a dyn ItemLookup,
}

impl<'a> RuleMatcher<'a> {
    pub fn new(catalog: &'a Catalog, items: &'a dyn ItemLookup) -> Self {
        Self { catalog, items }
    }

    /// Match a chat line.
    pub fn chat(&self, message: &ChatMessage) -> Matches {
        let mut matches = Matches::default();

        // Pass 1: family-specific tables
        for kind in self.catalog.kinds() {
            let Some((rule, bindings)) = kind
                .rules
                .messages()
                .find_map(|rule| rule.matches(message).map(|bindings| (rule, bindings)))
            else {
                continue;
            };
            match rule.effect.instantiate(&bindings, self.items) {
                Ok(effect) => matches.candidates.push(Candidate::from_message(
                    kind,
                    rule,
                    effect,
                    rule.named_item(&bindings),
                )),
                Err(err) => matches.failures.push((kind.id.clone(), err)),
            }
        }
        if !matches.is_empty() {
            return matches;
        }

        // Pass 2: shared pool
        let Some((id, rule, bindings)) = self
            .catalog
            .shared()
            .iter()
            .find_map(|(id, rule)| rule.matches(message).map(|bindings| (id, rule, bindings)))
        else {
            return matches;
        };
        matches.shared_rule = Some(id.clone());

        let effect = match rule.effect.instantiate(&bindings, self.items) {
            Ok(effect) => effect,
            Err(err) => {
                for kind in self.participants(id) {
                    matches.failures.push((kind.id.clone(), err.clone()));
                }
                return matches;
            }
        };
        for kind in self.participants(id) {
            matches.candidates.push(Candidate::from_message(
                kind,
                rule,
                effect.clone(),
                rule.named_item(&bindings),
            ));
        }
        matches
    }

    fn participants<'b>(&'b self, id: &'b SharedRuleId) -> impl Iterator<Item = &'a TrackedItemKind> + 'b {
        self.catalog
            .kinds()
            .iter()
            .filter(move |kind| kind.shared_rules.contains(id))
    }

    /// Match a dialog notification, first matching rule per family.
    pub fn dialog(&self, event: &DialogEvent) -> Matches {
        let (trigger, state, choice) = match event {
            DialogEvent::StateChanged(state) => (DialogTrigger::StateChanged, state, None),
            DialogEvent::OptionSelected { state, choice } => {
                (DialogTrigger::OptionSelected, state, choice.as_deref())
            }
        };

        let mut matches = Matches::default();
        for kind in self.catalog.kinds() {
            let Some((rule, bindings)) = kind.rules.dialog.iter().find_map(|rule| {
                rule.matches(trigger, state, choice)
                    .map(|bindings| (rule, bindings))
            }) else {
                continue;
            };
            match rule.effect.instantiate(&bindings, self.items) {
                Ok(effect) => matches.candidates.push(Candidate {
                    kind: kind.id.clone(),
                    effect,
                    requires: PresenceRequirement::Unconstrained,
                    named_item: None,
                    family: None,
                    deferred: false,
                }),
                Err(err) => matches.failures.push((kind.id.clone(), err)),
            }
        }
        matches
    }

    /// First animation rule per family listing `animation`.
    pub fn animation(&self, animation: i32) -> Vec<AnimationHit> {
        self.catalog
            .kinds()
            .iter()
            .filter_map(|kind| {
                kind.rules
                    .animation
                    .iter()
                    .find(|rule| rule.matches(animation))
                    .map(|rule| AnimationHit {
                        kind: kind.id.clone(),
                        rule: rule.clone(),
                    })
            })
            .collect()
    }

    /// First qualifying hitsplat rule per family.
    pub fn hitsplat(&self, hitsplat: &Hitsplat) -> Vec<HitsplatHit> {
        self.catalog
            .kinds()
            .iter()
            .filter_map(|kind| {
                kind.rules
                    .hitsplat
                    .iter()
                    .find(|rule| rule.qualifies(hitsplat))
                    .map(|rule| HitsplatHit {
                        kind: kind.id.clone(),
                        rule: rule.clone(),
                    })
            })
            .collect()
    }

    /// Every family's container-diff rules for a container, in order.
    pub fn container_rules(&self, container: ContainerId) -> Vec<(KindId, ContainerDiffRule)> {
        self.catalog
            .kinds()
            .iter()
            .flat_map(|kind| {
                kind.rules
                    .container
                    .iter()
                    .filter(move |rule| rule.container == container)
                    .map(move |rule| (kind.id.clone(), rule.clone()))
            })
            .collect()
    }
}
