//! The catalog - every tracked family plus the shared rule pool.

mod containers;
mod equipment;
mod items;
mod shared;

pub use items::builtin_items;
pub use shared::builtin_shared_rules;

use std::collections::HashSet;

use crate::items::{ItemDirectory, ItemId, KindId, TrackedItemKind};
use crate::rules::{RuleError, SharedRulePool};

/// Tracked families in declaration order, with their shared rule pool.
///
/// Declaration order is also rule evaluation order across families, so
/// families with more specific wording come first.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    kinds: Vec<TrackedItemKind>,
    shared: SharedRulePool,
}

impl Catalog {
    /// Create an empty catalog using the given shared pool.
    pub fn new(shared: SharedRulePool) -> Self {
        Self {
            kinds: Vec::new(),
            shared,
        }
    }

    /// The built-in families.
    pub fn builtin() -> Result<Self, RuleError> {
        let mut catalog = Self::new(builtin_shared_rules()?);
        for kind in equipment::builtin_equipment()? {
            catalog.add(kind)?;
        }
        for kind in containers::builtin_containers()? {
            catalog.add(kind)?;
        }
        Ok(catalog)
    }

    /// Item names for the built-in families and their sub-items.
    pub fn builtin_items() -> ItemDirectory {
        builtin_items()
    }

    /// Register a family, validating its shared-rule references.
    pub fn add(&mut self, kind: TrackedItemKind) -> Result<(), RuleError> {
        if self.kind(&kind.id).is_some() {
            return Err(RuleError::DuplicateKind(kind.id.0));
        }
        if let Some(missing) = kind
            .shared_rules
            .iter()
            .find(|rule| !self.shared.contains(rule))
        {
            return Err(RuleError::UnknownSharedRule {
                kind: kind.id.0.clone(),
                rule: missing.0.clone(),
            });
        }
        self.kinds.push(kind);
        Ok(())
    }

    /// Builder-style [`Catalog::add`].
    pub fn with_kind(mut self, kind: TrackedItemKind) -> Result<Self, RuleError> {
        self.add(kind)?;
        Ok(self)
    }

    /// Drop families by id.
    pub fn without(mut self, disabled: &HashSet<String>) -> Self {
        self.kinds.retain(|kind| !disabled.contains(kind.id.as_str()));
        self
    }

    pub fn kinds(&self) -> &[TrackedItemKind] {
        &self.kinds
    }

    pub fn shared(&self) -> &SharedRulePool {
        &self.shared
    }

    pub fn kind(&self, id: &KindId) -> Option<&TrackedItemKind> {
        self.kinds.iter().find(|kind| &kind.id == id)
    }

    /// The family an item variant belongs to.
    pub fn kind_for_item(&self, item: ItemId) -> Option<&TrackedItemKind> {
        self.kinds.iter().find(|kind| kind.is_variant(item))
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
