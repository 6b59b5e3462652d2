//! Dialog rules.

use regex::Regex;

use super::effect::EffectTemplate;
use super::quantity::Bindings;
use super::RuleError;
use crate::dialog::{DialogKind, DialogState};
use crate::items::ItemId;

/// Which dialog notification a rule listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogTrigger {
    StateChanged,
    OptionSelected,
}

/// A rule over dialog state and, for selections, the chosen option.
#[derive(Debug, Clone)]
pub struct DialogRule {
    pub trigger: DialogTrigger,
    pub kind: DialogKind,
    text: Regex,
    choice: Option<Regex>,
    /// Only match sprite dialogs showing one of these items.
    pub sprite_items: Vec<ItemId>,
    pub effect: EffectTemplate,
}

fn compile(pattern: &str) -> Result<Regex, RuleError> {
    Regex::new(pattern).map_err(|source| RuleError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

impl DialogRule {
    /// Match when a dialog of `kind` with matching text appears.
    pub fn on_state(
        kind: DialogKind,
        text: &str,
        effect: EffectTemplate,
    ) -> Result<Self, RuleError> {
        Ok(Self {
            trigger: DialogTrigger::StateChanged,
            kind,
            text: compile(text)?,
            choice: None,
            sprite_items: Vec::new(),
            effect,
        })
    }

    /// Match when an option is selected in a dialog of `kind` with matching
    /// text and the chosen option matches `choice`.
    pub fn on_option(
        kind: DialogKind,
        text: &str,
        choice: &str,
        effect: EffectTemplate,
    ) -> Result<Self, RuleError> {
        Ok(Self {
            trigger: DialogTrigger::OptionSelected,
            kind,
            text: compile(text)?,
            choice: Some(compile(choice)?),
            sprite_items: Vec::new(),
            effect,
        })
    }

    /// Match a "click to continue" on a dialog of `kind` with matching text.
    pub fn on_continue(
        kind: DialogKind,
        text: &str,
        effect: EffectTemplate,
    ) -> Result<Self, RuleError> {
        Ok(Self {
            trigger: DialogTrigger::OptionSelected,
            kind,
            text: compile(text)?,
            choice: None,
            sprite_items: Vec::new(),
            effect,
        })
    }

    pub fn for_sprites(mut self, items: impl IntoIterator<Item = i32>) -> Self {
        self.sprite_items = items.into_iter().map(ItemId).collect();
        self
    }

    /// Test the rule against a notification.
    ///
    /// Captures from the dialog text and the chosen option are merged; the
    /// choice wins on name collisions.
    pub fn matches(
        &self,
        trigger: DialogTrigger,
        state: &DialogState,
        choice: Option<&str>,
    ) -> Option<Bindings> {
        if trigger != self.trigger || state.kind() != self.kind {
            return None;
        }
        if !self.sprite_items.is_empty() {
            let item = state.sprite_item()?;
            if !self.sprite_items.contains(&item) {
                return None;
            }
        }

        let captures = self.text.captures(state.text())?;
        let mut bindings = Bindings::from_captures(&self.text, &captures);

        if let Some(pattern) = &self.choice {
            let choice = choice?;
            let captures = pattern.captures(choice.trim())?;
            bindings.merge(Bindings::from_captures(pattern, &captures));
        }
        Some(bindings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Quantity;

    fn input_state() -> DialogState {
        DialogState::Input {
            title: "How many charges would you like to add? (0 - 2,500)".to_string(),
            text: String::new(),
        }
    }

    #[test]
    fn test_option_rule_captures_choice() {
        let rule = DialogRule::on_option(
            DialogKind::Input,
            r"^How many charges would you like to add\?",
            r"^(?P<charges>[\d,]+)$",
            EffectTemplate::Increase(Quantity::captured("charges")),
        )
        .unwrap();

        let bindings = rule
            .matches(DialogTrigger::OptionSelected, &input_state(), Some("1,000"))
            .unwrap();
        assert_eq!(bindings.get("charges"), Some("1,000"));

        // Wrong trigger or missing choice
        assert!(rule
            .matches(DialogTrigger::StateChanged, &input_state(), Some("5"))
            .is_none());
        assert!(rule
            .matches(DialogTrigger::OptionSelected, &input_state(), None)
            .is_none());
    }

    #[test]
    fn test_sprite_filter() {
        let rule = DialogRule::on_state(
            DialogKind::Sprite,
            r"^You uncharge",
            EffectTemplate::Set(Quantity::Fixed(0)),
        )
        .unwrap()
        .for_sprites([11908]);

        let matching = DialogState::Sprite {
            item: Some(ItemId(11908)),
            text: "You uncharge your trident.".to_string(),
        };
        let other = DialogState::Sprite {
            item: Some(ItemId(22481)),
            text: "You uncharge your staff.".to_string(),
        };
        assert!(rule
            .matches(DialogTrigger::StateChanged, &matching, None)
            .is_some());
        assert!(rule.matches(DialogTrigger::StateChanged, &other, None).is_none());
    }

    #[test]
    fn test_continue_rule_has_no_choice_requirement() {
        let rule = DialogRule::on_continue(
            DialogKind::Npc,
            "charged your",
            EffectTemplate::Set(Quantity::Fixed(100)),
        )
        .unwrap();
        let state = DialogState::Npc {
            name: "Wizard".to_string(),
            text: "I have charged your amulet.".to_string(),
        };
        assert!(rule
            .matches(DialogTrigger::OptionSelected, &state, None)
            .is_some());
    }
}
