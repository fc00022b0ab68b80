use serde::{Deserialize, Serialize};

/// A collapsible field group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupDeclaration {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub collapsed_by_default: bool,
}

/// Collapsed state of every declared group, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupController {
    groups: Vec<(String, bool)>,
}

impl GroupController {
    pub fn new(declarations: &[GroupDeclaration]) -> Self {
        GroupController {
            groups: declarations
                .iter()
                .map(|g| (g.id.clone(), g.collapsed_by_default))
                .collect(),
        }
    }

    /// Whether `id` is collapsed; unknown groups report `None`.
    pub fn is_collapsed(&self, id: &str) -> Option<bool> {
        self.groups.iter().find(|(g, _)| g == id).map(|(_, c)| *c)
    }

    /// Flips `id` and returns its new state; unknown groups are left alone.
    pub fn toggle(&mut self, id: &str) -> Option<bool> {
        let (_, collapsed) = self.groups.iter_mut().find(|(g, _)| g == id)?;
        *collapsed = !*collapsed;
        Some(*collapsed)
    }

    pub(crate) fn reset(&mut self, declarations: &[GroupDeclaration]) {
        *self = GroupController::new(declarations);
    }
}
