//! Action policy - decides whether a proposed change is applied
//!
//! Every reported difference proposes one mutating action. In interactive
//! mode the operator is asked first (Enter means yes); in force mode every
//! action is treated as confirmed. Failures of the action itself are reported
//! and recorded, never propagated, so one bad item cannot stop a batch.

use anyhow::Result;
use console::style;
use dialoguer::Confirm;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{SyncError, SyncResult};
use crate::model::{EntityKind, RepositoryRef};

/// How a report line should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Section header, e.g. "Synchronizing labels from a/b to c/d"
    Heading,
    /// A reported difference
    Item,
    /// An action that was applied
    Success,
    /// An action or read that failed
    Failure,
}

/// The human side of a run: receives the report and answers confirmations
#[cfg_attr(test, mockall::automock)]
pub trait Operator: Send + Sync {
    fn report(&self, tone: Tone, message: &str);

    fn confirm(&self, question: &str) -> Result<bool>;
}

/// Terminal operator: styled output on stdout, dialoguer prompts
#[derive(Debug, Default)]
pub struct ConsoleOperator;

impl Operator for ConsoleOperator {
    fn report(&self, tone: Tone, message: &str) {
        match tone {
            Tone::Heading => println!("{}", style(message).yellow()),
            Tone::Item => println!("{}", message),
            Tone::Success => println!("{}", style(message).green()),
            Tone::Failure => println!("{}", style(message).red()),
        }
    }

    fn confirm(&self, question: &str) -> Result<bool> {
        let answer = Confirm::new()
            .with_prompt(question)
            .default(true)
            .interact()?;
        Ok(answer)
    }
}

/// Whether the operator is consulted before each action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfirmMode {
    #[default]
    Interactive,
    /// Every action is pre-confirmed
    Force,
}

/// Mutating action proposed for a reported difference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    Delete,
}

/// What happened to a proposed action
#[derive(Debug)]
pub enum Outcome {
    Applied,
    SkippedByUser,
    SkippedOnError(SyncError),
}

/// Per-item record of one run
#[derive(Debug)]
pub struct ItemReport {
    pub target: RepositoryRef,
    pub kind: EntityKind,
    pub name: String,
    pub action: Action,
    pub outcome: Outcome,
}

impl ItemReport {
    /// The action that actually reached GitHub, if any
    pub fn action_taken(&self) -> Option<Action> {
        match self.outcome {
            Outcome::Applied => Some(self.action),
            _ => None,
        }
    }

    /// Error detail for items skipped on error
    pub fn error(&self) -> Option<&SyncError> {
        match &self.outcome {
            Outcome::SkippedOnError(err) => Some(err),
            _ => None,
        }
    }
}

/// Confirmation policy bound to an operator
#[derive(Clone)]
pub struct ActionPolicy {
    mode: ConfirmMode,
    operator: Arc<dyn Operator>,
}

impl ActionPolicy {
    pub fn new(mode: ConfirmMode, operator: Arc<dyn Operator>) -> Self {
        Self { mode, operator }
    }

    pub fn mode(&self) -> ConfirmMode {
        self.mode
    }

    pub fn operator(&self) -> &dyn Operator {
        self.operator.as_ref()
    }

    /// Ask (or in force mode assume) approval for an action
    pub fn approve(&self, question: &str) -> bool {
        match self.mode {
            ConfirmMode::Force => true,
            ConfirmMode::Interactive => match self.operator.confirm(question) {
                Ok(answer) => answer,
                Err(e) => {
                    warn!("Confirmation prompt failed, treating as declined: {}", e);
                    false
                }
            },
        }
    }

    /// Run `mutation` if approved and turn its result into an outcome.
    ///
    /// `subject` names the entity and repository in failure messages. The
    /// mutation future is only awaited after approval.
    pub async fn apply<F>(&self, question: &str, subject: &str, success: &str, mutation: F) -> Outcome
    where
        F: Future<Output = SyncResult<()>> + Send,
    {
        if !self.approve(question) {
            debug!("Operator declined action for {}", subject);
            return Outcome::SkippedByUser;
        }

        match mutation.await {
            Ok(()) => {
                self.operator.report(Tone::Success, success);
                Outcome::Applied
            }
            Err(e) => {
                warn!("Action failed for {}: {}", subject, e);
                self.operator
                    .report(Tone::Failure, &format!("Skipped {}: {}", subject, e));
                Outcome::SkippedOnError(e)
            }
        }
    }
}
