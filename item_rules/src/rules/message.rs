//! Chat message rules.

use regex::Regex;

use super::effect::EffectTemplate;
use super::quantity::Bindings;
use super::{PresenceRequirement, RuleError};
use crate::signals::{ChatKind, ChatMessage};

/// Which of a family's two message lists a rule belongs to.
///
/// Check messages report the value before this tick's action; update
/// messages report it after. Keeping them apart avoids one-tick-early or
/// one-tick-stale counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageFamily {
    Check,
    Update,
}

/// A regex rule over chat text.
#[derive(Debug, Clone)]
pub struct MessageRule {
    pattern: Regex,
    pub family: MessageFamily,
    pub effect: EffectTemplate,
    /// Restrict to one chat channel.
    pub channel: Option<ChatKind>,
    pub requires: PresenceRequirement,
    /// Resolve the target only after this tick's equipment changes settle.
    pub deferred: bool,
    /// Capture group naming the item the message is about, if any.
    pub names_item: Option<String>,
}

impl MessageRule {
    fn build(
        pattern: &str,
        family: MessageFamily,
        effect: EffectTemplate,
    ) -> Result<Self, RuleError> {
        let pattern = Regex::new(pattern).map_err(|source| RuleError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            pattern,
            family,
            effect,
            channel: None,
            requires: PresenceRequirement::Unconstrained,
            deferred: false,
            names_item: None,
        })
    }

    /// A rule matching explicit-check output.
    pub fn check(pattern: &str, effect: EffectTemplate) -> Result<Self, RuleError> {
        Self::build(pattern, MessageFamily::Check, effect)
    }

    /// A rule matching side-effect updates.
    pub fn update(pattern: &str, effect: EffectTemplate) -> Result<Self, RuleError> {
        Self::build(pattern, MessageFamily::Update, effect)
    }

    pub fn on_channel(mut self, channel: ChatKind) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn requiring(mut self, requires: PresenceRequirement) -> Self {
        self.requires = requires;
        self
    }

    /// Require the item to be worn.
    pub fn worn(self) -> Self {
        self.requiring(PresenceRequirement::Worn)
    }

    /// Require the item to be worn or carried.
    pub fn present(self) -> Self {
        self.requiring(PresenceRequirement::WornOrCarried)
    }

    pub fn deferred(mut self) -> Self {
        self.deferred = true;
        self
    }

    /// Declare the capture group naming the item.
    pub fn naming(mut self, group: &str) -> Self {
        self.names_item = Some(group.to_string());
        self
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Test the rule against a chat line.
    pub fn matches(&self, message: &ChatMessage) -> Option<Bindings> {
        if let Some(channel) = self.channel {
            if channel != message.kind {
                return None;
            }
        }
        let captures = self.pattern.captures(message.text.trim())?;
        Some(Bindings::from_captures(&self.pattern, &captures))
    }

    /// The item name captured by a match, for rules that name their item.
    pub fn named_item<'a>(&self, bindings: &'a Bindings) -> Option<&'a str> {
        self.names_item
            .as_deref()
            .and_then(|group| bindings.get(group))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Quantity;

    #[test]
    fn test_match_extracts_bindings() {
        let rule = MessageRule::check(
            r"^Your (?P<item>.+?) has (?P<charges>one|[\d,]+) charges? left\.$",
            EffectTemplate::Set(Quantity::captured("charges")),
        )
        .unwrap()
        .naming("item");

        let bindings = rule
            .matches(&ChatMessage::game("Your trident has 1,250 charges left."))
            .unwrap();
        assert_eq!(bindings.get("charges"), Some("1,250"));
        assert_eq!(rule.named_item(&bindings), Some("trident"));
        assert_eq!(rule.family, MessageFamily::Check);
    }

    #[test]
    fn test_channel_filter() {
        let rule = MessageRule::update(
            r"^The herb sack is empty\.$",
            EffectTemplate::Clear,
        )
        .unwrap()
        .on_channel(ChatKind::Game);

        assert!(rule
            .matches(&ChatMessage::game("The herb sack is empty."))
            .is_some());
        assert!(rule
            .matches(&ChatMessage::spam("The herb sack is empty."))
            .is_none());
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let err = MessageRule::update("(unclosed", EffectTemplate::Clear).unwrap_err();
        assert!(matches!(err, RuleError::InvalidPattern { .. }));
    }

    #[test]
    fn test_builder_flags() {
        let rule = MessageRule::update("run out", EffectTemplate::Set(Quantity::Fixed(0)))
            .unwrap()
            .present()
            .deferred();
        assert!(rule.deferred);
        assert_eq!(rule.requires, PresenceRequirement::WornOrCarried);
        assert_eq!(rule.pattern(), "run out");
    }
}
