//! Label entity binding

use crate::model::EntityKind;
use crate::store::Entity;

/// A repository label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub name: String,
    /// Color hex string without `#` prefix (e.g. "fc2929")
    pub color: String,
    pub description: Option<String>,
}

impl Label {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl Entity for Label {
    const KIND: EntityKind = EntityKind::Labels;
    const NOUN: &'static str = "label";

    fn display_name(&self) -> &str {
        &self.name
    }

    // GitHub treats label names case-insensitively
    fn same_identity(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
    }

    fn same_value(&self, other: &Self) -> bool {
        self.color.eq_ignore_ascii_case(&other.color)
    }

    fn describe_change(&self, other: &Self) -> String {
        format!(
            "Same label but different name/color for {} ({} -> {}, {} -> {})",
            self.name, self.name, other.name, self.color, other.color
        )
    }

    fn update_question() -> String {
        "Do you want to update the name and color of the label?".to_string()
    }
}
