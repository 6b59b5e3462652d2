//! Dialog state - the tagged union the dialog state machine works on.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::items::ItemId;
use crate::signals::DialogWidgets;

/// Discriminant of a [`DialogState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogKind {
    NoDialog,
    Npc,
    Player,
    Options,
    Sprite,
    Input,
}

/// The dialog currently on screen, with markup already normalized.
///
/// Equality is structural: a new state equal to the previous one is not a
/// transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DialogState {
    #[default]
    NoDialog,
    Npc {
        name: String,
        text: String,
    },
    Player {
        text: String,
    },
    Options {
        title: String,
        options: Vec<String>,
    },
    Sprite {
        item: Option<ItemId>,
        text: String,
    },
    Input {
        title: String,
        text: String,
    },
}

impl DialogState {
    /// Build the state from raw widgets.
    ///
    /// When several widgets are visible at once the topmost wins: input
    /// prompts, then options, then sprite, NPC and player boxes.
    pub fn from_widgets(widgets: &DialogWidgets) -> Self {
        if let Some(input) = &widgets.input {
            return DialogState::Input {
                title: normalize_text(&input.title),
                text: normalize_text(&input.text),
            };
        }
        if let Some(options) = &widgets.options {
            return DialogState::Options {
                title: normalize_text(&options.title),
                options: options.options.iter().map(|o| normalize_text(o)).collect(),
            };
        }
        if let Some(sprite) = &widgets.sprite {
            return DialogState::Sprite {
                item: sprite.item,
                text: normalize_text(&sprite.text),
            };
        }
        if let Some(npc) = &widgets.npc {
            return DialogState::Npc {
                name: normalize_text(&npc.name),
                text: normalize_text(&npc.text),
            };
        }
        if let Some(player) = &widgets.player {
            return DialogState::Player {
                text: normalize_text(player),
            };
        }
        DialogState::NoDialog
    }

    pub fn kind(&self) -> DialogKind {
        match self {
            DialogState::NoDialog => DialogKind::NoDialog,
            DialogState::Npc { .. } => DialogKind::Npc,
            DialogState::Player { .. } => DialogKind::Player,
            DialogState::Options { .. } => DialogKind::Options,
            DialogState::Sprite { .. } => DialogKind::Sprite,
            DialogState::Input { .. } => DialogKind::Input,
        }
    }

    /// The text rules match against: body text, or the title for options
    /// and input prompts.
    pub fn text(&self) -> &str {
        match self {
            DialogState::NoDialog => "",
            DialogState::Npc { text, .. }
            | DialogState::Player { text }
            | DialogState::Sprite { text, .. } => text,
            DialogState::Options { title, .. } | DialogState::Input { title, .. } => title,
        }
    }

    /// Text of a numbered option (zero-based).
    pub fn option(&self, index: usize) -> Option<&str> {
        match self {
            DialogState::Options { options, .. } => options.get(index).map(String::as_str),
            _ => None,
        }
    }

    pub fn sprite_item(&self) -> Option<ItemId> {
        match self {
            DialogState::Sprite { item, .. } => *item,
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, DialogState::NoDialog)
    }
}

fn line_break_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("line break pattern is valid"))
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^<>]*>").expect("tag pattern is valid"))
}

/// Strip widget markup: `<br>` becomes a space, other tags are removed, and
/// whitespace is collapsed.
pub fn normalize_text(raw: &str) -> String {
    let spaced = line_break_pattern().replace_all(raw, " ");
    let stripped = tag_pattern().replace_all(&spaced, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::{InputWidget, NpcWidget, OptionsWidget, SpriteWidget};

    #[test]
    fn test_normalize_text() {
        assert_eq!(
            normalize_text("Your trident has<br>500 charges."),
            "Your trident has 500 charges."
        );
        assert_eq!(
            normalize_text("<col=ff0000>Warning</col>:<br/>  low   charges"),
            "Warning: low charges"
        );
        assert_eq!(normalize_text("a < b"), "a < b");
        assert_eq!(
            normalize_text("Really uncharge the<BR />trident?"),
            "Really uncharge the trident?"
        );
    }

    #[test]
    fn test_from_widgets_priority() {
        let widgets = DialogWidgets {
            npc: Some(NpcWidget {
                name: "Bob".to_string(),
                text: "Hello".to_string(),
            }),
            options: Some(OptionsWidget {
                title: "Really uncharge the<br>trident?".to_string(),
                options: vec!["Yes".to_string(), "No".to_string()],
            }),
            ..Default::default()
        };
        let state = DialogState::from_widgets(&widgets);
        assert_eq!(state.kind(), DialogKind::Options);
        assert_eq!(state.text(), "Really uncharge the trident?");
        assert_eq!(state.option(1), Some("No"));
    }

    #[test]
    fn test_empty_widgets_are_no_dialog() {
        let state = DialogState::from_widgets(&DialogWidgets::default());
        assert_eq!(state, DialogState::NoDialog);
        assert!(!state.is_open());
    }

    #[test]
    fn test_structural_equality() {
        let widgets = DialogWidgets {
            sprite: Some(SpriteWidget {
                item: Some(ItemId(11907)),
                text: "You add<br>a charge.".to_string(),
            }),
            ..Default::default()
        };
        let a = DialogState::from_widgets(&widgets);
        let b = DialogState::from_widgets(&widgets);
        assert_eq!(a, b);
        assert_eq!(a.sprite_item(), Some(ItemId(11907)));

        let input = DialogState::from_widgets(&DialogWidgets {
            input: Some(InputWidget {
                title: "How many charges?".to_string(),
                text: "12".to_string(),
            }),
            ..Default::default()
        });
        assert_ne!(a, input);
    }
}
