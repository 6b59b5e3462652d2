//! Container-diff rules.

use super::effect::DiffDirection;
use crate::items::ContainerId;

/// Attributes a snapshot diff to a family when the player recently clicked
/// the matching menu option on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerDiffRule {
    pub container: ContainerId,
    /// Menu option that opens the window, e.g. "Fill" or "Empty".
    pub menu_option: String,
    pub direction: DiffDirection,
}

impl ContainerDiffRule {
    pub fn fill(menu_option: &str) -> Self {
        Self {
            container: ContainerId::Inventory,
            menu_option: menu_option.to_string(),
            direction: DiffDirection::Fill,
        }
    }

    pub fn empty(menu_option: &str) -> Self {
        Self {
            container: ContainerId::Inventory,
            menu_option: menu_option.to_string(),
            direction: DiffDirection::Empty,
        }
    }

    pub fn on_container(mut self, container: ContainerId) -> Self {
        self.container = container;
        self
    }
}
