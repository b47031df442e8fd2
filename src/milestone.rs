//! Milestone entity binding

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::EntityKind;
use crate::store::Entity;

/// Milestone state as reported by GitHub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneState {
    #[default]
    Open,
    Closed,
}

impl MilestoneState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MilestoneState::Open => "open",
            MilestoneState::Closed => "closed",
        }
    }
}

impl fmt::Display for MilestoneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A repository milestone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Milestone {
    pub title: String,
    pub state: MilestoneState,
    /// Remote-assigned identifier, only meaningful for the repository it was fetched from
    pub number: u64,
    pub description: Option<String>,
}

impl Milestone {
    pub fn new(title: impl Into<String>, state: MilestoneState, number: u64) -> Self {
        Self {
            title: title.into(),
            state,
            number,
            description: None,
        }
    }
}

// No value comparator: only presence is synchronized, state differences are ignored.
impl Entity for Milestone {
    const KIND: EntityKind = EntityKind::Milestones;
    const NOUN: &'static str = "milestone";

    fn display_name(&self) -> &str {
        &self.title
    }

    fn same_identity(&self, other: &Self) -> bool {
        self.title == other.title
    }
}
