//! Signal model - typed events observed from the game client.
//!
//! Every signal is stamped with the tick it was observed on and a sequence
//! number within that tick. The engine never receives authoritative charge
//! values; everything is inferred from these.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::items::{ContainerId, ItemId};

/// One discrete unit of host simulation time.
pub type Tick = u64;

/// Chat channel a message arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChatKind {
    #[default]
    Game,
    Spam,
    Public,
    Other,
}

/// A chat text line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub kind: ChatKind,
    pub text: String,
}

impl ChatMessage {
    pub fn game(text: impl Into<String>) -> Self {
        Self {
            kind: ChatKind::Game,
            text: text.into(),
        }
    }

    pub fn spam(text: impl Into<String>) -> Self {
        Self {
            kind: ChatKind::Spam,
            text: text.into(),
        }
    }
}

/// Who a hitsplat landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitsplatTarget {
    /// The local player was hit.
    SelfActor,
    /// Something the local player hit.
    Other,
}

/// Hitsplat categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HitsplatKind {
    #[default]
    Damage,
    Block,
    Poison,
    Venom,
    Heal,
    Other,
}

/// A combat hitsplat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hitsplat {
    pub target: HitsplatTarget,
    pub amount: i32,
    #[serde(default)]
    pub kind: HitsplatKind,
}

/// One stack in a container snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: ItemId,
    pub quantity: i64,
}

/// Full contents of a host container at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSnapshot {
    pub container: ContainerId,
    pub items: Vec<ItemStack>,
}

impl ContainerSnapshot {
    pub fn new(container: ContainerId, items: impl IntoIterator<Item = (i32, i64)>) -> Self {
        Self {
            container,
            items: items
                .into_iter()
                .map(|(item, quantity)| ItemStack {
                    item: ItemId(item),
                    quantity,
                })
                .collect(),
        }
    }

    /// Total quantity per item, merging split stacks.
    pub fn totals(&self) -> BTreeMap<ItemId, i64> {
        let mut totals = BTreeMap::new();
        for stack in &self.items {
            if stack.quantity > 0 {
                *totals.entry(stack.item).or_insert(0) += stack.quantity;
            }
        }
        totals
    }

    pub fn contains(&self, item: ItemId) -> bool {
        self.items
            .iter()
            .any(|stack| stack.item == item && stack.quantity > 0)
    }
}

/// Dialog widget a menu click landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogWidget {
    /// "Click here to continue".
    Continue,
    /// A numbered option in an options dialog (zero-based).
    Option(usize),
}

/// A menu-action click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuAction {
    /// Menu option text, e.g. "Check", "Fill", "Use".
    pub option: String,
    /// Menu target text, e.g. "Herb sack" or "Death rune -> Trident".
    #[serde(default)]
    pub target: String,
    /// Item the option was invoked on.
    #[serde(default)]
    pub item: Option<ItemId>,
    /// Second item of a "use X on Y" action.
    #[serde(default)]
    pub target_item: Option<ItemId>,
    /// Dialog widget, for clicks inside a dialog.
    #[serde(default)]
    pub widget: Option<DialogWidget>,
}

impl MenuAction {
    /// A click on an item's menu option.
    pub fn item(option: &str, item: i32) -> Self {
        Self {
            option: option.to_string(),
            target: String::new(),
            item: Some(ItemId(item)),
            target_item: None,
            widget: None,
        }
    }

    /// A "use X on Y" click.
    pub fn use_on(item: i32, target_item: i32) -> Self {
        Self {
            option: "Use".to_string(),
            target: String::new(),
            item: Some(ItemId(item)),
            target_item: Some(ItemId(target_item)),
            widget: None,
        }
    }

    /// A click on a dialog widget.
    pub fn dialog(widget: DialogWidget) -> Self {
        Self {
            option: "Continue".to_string(),
            target: String::new(),
            item: None,
            target_item: None,
            widget: Some(widget),
        }
    }

    pub fn option_is(&self, option: &str) -> bool {
        self.option.trim().eq_ignore_ascii_case(option.trim())
    }
}

/// An NPC speaking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcWidget {
    pub name: String,
    pub text: String,
}

/// A multi-choice options box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionsWidget {
    #[serde(default)]
    pub title: String,
    pub options: Vec<String>,
}

/// An item sprite with a caption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteWidget {
    #[serde(default)]
    pub item: Option<ItemId>,
    pub text: String,
}

/// A free-text or numeric input prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputWidget {
    pub title: String,
    #[serde(default)]
    pub text: String,
}

/// Raw dialog UI state for one tick, straight from the host widgets.
///
/// Text may still contain markup; it is normalized when converted into a
/// [`crate::DialogState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DialogWidgets {
    #[serde(default)]
    pub npc: Option<NpcWidget>,
    #[serde(default)]
    pub player: Option<String>,
    #[serde(default)]
    pub options: Option<OptionsWidget>,
    #[serde(default)]
    pub sprite: Option<SpriteWidget>,
    #[serde(default)]
    pub input: Option<InputWidget>,
}

/// Host-side dialog script notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogScript {
    /// The "processing/continue" script ran.
    Continue,
    /// An option was chosen via keyboard (zero-based).
    OptionChosen(usize),
    /// Free-text or numeric input was submitted.
    InputSubmitted(String),
}

/// A single observed domain event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Signal {
    Chat(ChatMessage),
    Animation { animation: i32 },
    Hitsplat(Hitsplat),
    Container(ContainerSnapshot),
    Menu(MenuAction),
    Dialog(DialogWidgets),
    DialogScript { script: DialogScript },
}

impl Signal {
    /// The processing phase this signal belongs to.
    pub fn phase(&self) -> Phase {
        match self {
            Signal::Menu(_) => Phase::Input,
            Signal::Chat(_) => Phase::Chat,
            Signal::Dialog(_) | Signal::DialogScript { .. } => Phase::Dialog,
            Signal::Animation { .. } => Phase::Animation,
            Signal::Container(_) => Phase::Container,
            Signal::Hitsplat(_) => Phase::Combat,
        }
    }
}

/// A signal stamped with when it was observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedSignal {
    pub tick: Tick,
    #[serde(default)]
    pub seq: u32,
    pub signal: Signal,
}

impl TimedSignal {
    pub fn new(tick: Tick, seq: u32, signal: Signal) -> Self {
        Self { tick, seq, signal }
    }
}

/// Per-tick processing phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Menu clicks.
    Input,
    Chat,
    Dialog,
    Animation,
    /// Application of effects deferred until equipment is final.
    DeferredFlush,
    Container,
    Combat,
    TickEnd,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_totals_merge_stacks() {
        let snapshot = ContainerSnapshot::new(
            ContainerId::Inventory,
            [(207, 1), (207, 1), (560, 100), (995, 0)],
        );
        let totals = snapshot.totals();
        assert_eq!(totals.get(&ItemId(207)), Some(&2));
        assert_eq!(totals.get(&ItemId(560)), Some(&100));
        assert!(!totals.contains_key(&ItemId(995)));
        assert!(!snapshot.contains(ItemId(995)));
    }

    #[test]
    fn test_signal_phases() {
        assert_eq!(Signal::Chat(ChatMessage::game("hi")).phase(), Phase::Chat);
        assert_eq!(Signal::Menu(MenuAction::item("Check", 1)).phase(), Phase::Input);
        assert_eq!(
            Signal::DialogScript {
                script: DialogScript::Continue
            }
            .phase(),
            Phase::Dialog
        );
        assert_eq!(Signal::Animation { animation: 1167 }.phase(), Phase::Animation);
    }

    #[test]
    fn test_signal_json_shape() {
        let signal = TimedSignal::new(
            12,
            0,
            Signal::Chat(ChatMessage::game("Your trident has 1 charge left.")),
        );
        let json = serde_json::to_string(&signal).unwrap();
        assert!(json.contains("\"type\":\"chat\""));

        let parsed: TimedSignal = serde_json::from_str(
            r#"{"tick":3,"signal":{"type":"animation","animation":1167}}"#,
        )
        .unwrap();
        assert_eq!(parsed.seq, 0);
        assert_eq!(parsed.signal, Signal::Animation { animation: 1167 });
    }

    #[test]
    fn test_menu_option_compare() {
        let action = MenuAction::item("fill", 13226);
        assert!(action.option_is("Fill"));
        assert!(!action.option_is("Empty"));
    }
}
