//! Effects - what a matched rule does to a family's state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::quantity::{parse_amount, parse_quantity_list, Bindings, Quantity};
use crate::items::{ItemId, ItemLookup};

/// Where an effect's sub-item comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameSource {
    Fixed(ItemId),
    /// A named capture holding an item name.
    Captured(String),
}

impl NameSource {
    pub fn captured(group: &str) -> Self {
        NameSource::Captured(group.to_string())
    }
}

/// Direction of a container-diff transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffDirection {
    /// Items leaving the inventory enter the container.
    Fill,
    /// Items entering the inventory leave the container.
    Empty,
}

/// An effect as declared in a rule, before captures are substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectTemplate {
    Set(Quantity),
    Increase(Quantity),
    Decrease(Quantity),
    AddItem {
        item: NameSource,
        quantity: Quantity,
    },
    /// Remove a sub-item; `None` removes all of it.
    RemoveItem {
        item: NameSource,
        quantity: Option<Quantity>,
    },
    /// Replace the whole mapping with the listed entries.
    ReplaceContents(Vec<(NameSource, Quantity)>),
    /// Replace the whole mapping with a parsed "N x Name, ..." list.
    ReplaceListed { group: String },
    Clear,
    /// Forget the state entirely (back to unknown).
    Reset,
    /// Re-apply the previous matched effect with a new amount.
    Amend(Quantity),
}

/// A concrete effect ready for the reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    Set(i64),
    Increase(i64),
    Decrease(i64),
    Add {
        item: ItemId,
        quantity: i64,
    },
    Remove {
        item: ItemId,
        quantity: Option<i64>,
    },
    Replace(BTreeMap<ItemId, i64>),
    Clear,
    Reset,
    Amend(i64),
    /// Transfer the diff between two inventory snapshots.
    Transfer {
        direction: DiffDirection,
        before: BTreeMap<ItemId, i64>,
        after: BTreeMap<ItemId, i64>,
    },
    /// Uses of a dual-resource item.
    Consume {
        uses: i64,
    },
}

impl Effect {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Effect::Set(_) => "set",
            Effect::Increase(_) => "increase",
            Effect::Decrease(_) => "decrease",
            Effect::Add { .. } => "add",
            Effect::Remove { .. } => "remove",
            Effect::Replace(_) => "replace",
            Effect::Clear => "clear",
            Effect::Reset => "reset",
            Effect::Amend(_) => "amend",
            Effect::Transfer { .. } => "transfer",
            Effect::Consume { .. } => "consume",
        }
    }
}

/// Why a template could not be instantiated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InstantiateError {
    #[error("capture group `{0}` did not participate in the match")]
    MissingCapture(String),

    #[error("`{0}` is not an amount")]
    BadAmount(String),

    #[error("no item named `{0}`")]
    UnknownItem(String),
}

impl Quantity {
    /// Resolve against the captured bindings.
    pub fn resolve(&self, bindings: &Bindings) -> Result<i64, InstantiateError> {
        match self {
            Quantity::Fixed(value) => Ok(*value),
            Quantity::Captured(group) => {
                let raw = bindings
                    .get(group)
                    .ok_or_else(|| InstantiateError::MissingCapture(group.clone()))?;
                parse_amount(raw).ok_or_else(|| InstantiateError::BadAmount(raw.to_string()))
            }
        }
    }
}

impl NameSource {
    /// Resolve to an item id, looking captured names up by name.
    pub fn resolve(
        &self,
        bindings: &Bindings,
        lookup: &dyn ItemLookup,
    ) -> Result<ItemId, InstantiateError> {
        match self {
            NameSource::Fixed(item) => Ok(*item),
            NameSource::Captured(group) => {
                let name = bindings
                    .get(group)
                    .ok_or_else(|| InstantiateError::MissingCapture(group.clone()))?;
                lookup
                    .find_by_name(name)
                    .ok_or_else(|| InstantiateError::UnknownItem(name.to_string()))
            }
        }
    }
}

impl EffectTemplate {
    /// Substitute captures and item lookups into a concrete effect.
    pub fn instantiate(
        &self,
        bindings: &Bindings,
        lookup: &dyn ItemLookup,
    ) -> Result<Effect, InstantiateError> {
        let effect = match self {
            EffectTemplate::Set(quantity) => Effect::Set(quantity.resolve(bindings)?),
            EffectTemplate::Increase(quantity) => Effect::Increase(quantity.resolve(bindings)?),
            EffectTemplate::Decrease(quantity) => Effect::Decrease(quantity.resolve(bindings)?),
            EffectTemplate::AddItem { item, quantity } => Effect::Add {
                item: item.resolve(bindings, lookup)?,
                quantity: quantity.resolve(bindings)?,
            },
            EffectTemplate::RemoveItem { item, quantity } => Effect::Remove {
                item: item.resolve(bindings, lookup)?,
                quantity: quantity
                    .as_ref()
                    .map(|quantity| quantity.resolve(bindings))
                    .transpose()?,
            },
            EffectTemplate::ReplaceContents(entries) => {
                let mut contents = BTreeMap::new();
                for (item, quantity) in entries {
                    let item = item.resolve(bindings, lookup)?;
                    *contents.entry(item).or_insert(0) += quantity.resolve(bindings)?;
                }
                Effect::Replace(contents)
            }
            EffectTemplate::ReplaceListed { group } => {
                let text = bindings
                    .get(group)
                    .ok_or_else(|| InstantiateError::MissingCapture(group.clone()))?;
                let mut contents = BTreeMap::new();
                for (amount, name) in parse_quantity_list(text) {
                    let item = lookup
                        .find_by_name(&name)
                        .ok_or(InstantiateError::UnknownItem(name))?;
                    *contents.entry(item).or_insert(0) += amount;
                }
                Effect::Replace(contents)
            }
            EffectTemplate::Clear => Effect::Clear,
            EffectTemplate::Reset => Effect::Reset,
            EffectTemplate::Amend(quantity) => Effect::Amend(quantity.resolve(bindings)?),
        };
        Ok(effect)
    }
}
