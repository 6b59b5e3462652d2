//! Animation rules.

use super::PresenceRequirement;

/// Fires when the local actor starts one of the listed animations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationRule {
    pub animations: Vec<i32>,
    pub requires: PresenceRequirement,
    /// Amount consumed per firing (uses, for dual-resource items).
    pub delta: i64,
    /// While the animation persists, fire again every `cadence` ticks.
    pub cadence: Option<u64>,
}

impl AnimationRule {
    /// Consume `delta` per firing while the item is worn.
    pub fn new(animations: impl IntoIterator<Item = i32>, delta: i64) -> Self {
        Self {
            animations: animations.into_iter().collect(),
            requires: PresenceRequirement::Worn,
            delta,
            cadence: None,
        }
    }

    pub fn requiring(mut self, requires: PresenceRequirement) -> Self {
        self.requires = requires;
        self
    }

    pub fn with_cadence(mut self, ticks: u64) -> Self {
        self.cadence = Some(ticks.max(1));
        self
    }

    pub fn matches(&self, animation: i32) -> bool {
        self.animations.contains(&animation)
    }
}
