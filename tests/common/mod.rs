//! Common test utilities and helpers for ghsync tests
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use ghsync::discovery::RepositoryDirectory;
use ghsync::policy::{ActionPolicy, ConfirmMode, Operator, Tone};
use ghsync::{
    EntityKind, EntityStore, Label, LabelSynchronizer, Milestone, MilestoneState,
    MilestoneSynchronizer, RepositoryRef, SyncEngine, SyncError, SyncOptions, SyncResult,
};

/// Every call that reached the fake GitHub
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListLabels(String),
    CreateLabel { repo: String, name: String, color: String },
    UpdateLabel { repo: String, current: String, name: String, color: String },
    DeleteLabel { repo: String, name: String },
    ListMilestones(String),
    CreateMilestone { repo: String, title: String, state: MilestoneState },
    DeleteMilestone { repo: String, number: u64 },
    ListRepositories,
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Call::ListLabels(_) | Call::ListMilestones(_) | Call::ListRepositories
        )
    }
}

/// In-memory GitHub: keeps state, records calls, injects failures
#[derive(Default)]
pub struct MemoryGitHub {
    anonymous: bool,
    labels: Mutex<HashMap<String, Vec<Label>>>,
    milestones: Mutex<HashMap<String, Vec<Milestone>>>,
    repositories: Vec<String>,
    rejected: HashSet<String>,
    unreadable: HashSet<String>,
    calls: Mutex<Vec<Call>>,
}

impl MemoryGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Behave like a client without credentials
    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    pub fn with_labels(self, repo: &str, labels: Vec<Label>) -> Self {
        self.labels.lock().unwrap().insert(repo.to_string(), labels);
        self
    }

    pub fn with_milestones(self, repo: &str, milestones: Vec<Milestone>) -> Self {
        self.milestones
            .lock()
            .unwrap()
            .insert(repo.to_string(), milestones);
        self
    }

    pub fn with_repositories(mut self, names: &[&str]) -> Self {
        self.repositories = names.iter().map(|name| name.to_string()).collect();
        self
    }

    /// Refuse any mutation of the entity with this name or title
    pub fn reject(mut self, name: &str) -> Self {
        self.rejected.insert(name.to_string());
        self
    }

    /// Fail every list call for this repository
    pub fn unreadable(mut self, repo: &str) -> Self {
        self.unreadable.insert(repo.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn labels_of(&self, repo: &str) -> Vec<Label> {
        self.labels
            .lock()
            .unwrap()
            .get(repo)
            .cloned()
            .unwrap_or_default()
    }

    pub fn milestones_of(&self, repo: &str) -> Vec<Milestone> {
        self.milestones
            .lock()
            .unwrap()
            .get(repo)
            .cloned()
            .unwrap_or_default()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_read(&self, repo: &RepositoryRef) -> SyncResult<()> {
        if self.unreadable.contains(&repo.full_name()) {
            return Err(SyncError::RemoteRejected {
                status: 404,
                message: "Not Found".to_string(),
            });
        }
        Ok(())
    }

    fn check_write(&self, name: &str) -> SyncResult<()> {
        if self.anonymous {
            return Err(SyncError::AuthenticationRequired);
        }
        if self.rejected.contains(name) {
            return Err(SyncError::RemoteRejected {
                status: 422,
                message: "Validation Failed".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl EntityStore<Label> for MemoryGitHub {
    async fn list(&self, repo: &RepositoryRef) -> SyncResult<Vec<Label>> {
        self.record(Call::ListLabels(repo.full_name()));
        self.check_read(repo)?;
        Ok(self.labels_of(&repo.full_name()))
    }

    async fn create(&self, repo: &RepositoryRef, label: &Label) -> SyncResult<()> {
        self.record(Call::CreateLabel {
            repo: repo.full_name(),
            name: label.name.clone(),
            color: label.color.clone(),
        });
        self.check_write(&label.name)?;
        self.labels
            .lock()
            .unwrap()
            .entry(repo.full_name())
            .or_default()
            .push(label.clone());
        Ok(())
    }

    async fn update(&self, repo: &RepositoryRef, current: &Label, desired: &Label) -> SyncResult<()> {
        self.record(Call::UpdateLabel {
            repo: repo.full_name(),
            current: current.name.clone(),
            name: desired.name.clone(),
            color: desired.color.clone(),
        });
        self.check_write(&current.name)?;
        if let Some(labels) = self.labels.lock().unwrap().get_mut(&repo.full_name()) {
            for label in labels.iter_mut().filter(|label| label.name == current.name) {
                label.name = desired.name.clone();
                label.color = desired.color.clone();
            }
        }
        Ok(())
    }

    async fn delete(&self, repo: &RepositoryRef, label: &Label) -> SyncResult<()> {
        self.record(Call::DeleteLabel {
            repo: repo.full_name(),
            name: label.name.clone(),
        });
        self.check_write(&label.name)?;
        if let Some(labels) = self.labels.lock().unwrap().get_mut(&repo.full_name()) {
            labels.retain(|existing| existing.name != label.name);
        }
        Ok(())
    }
}

#[async_trait]
impl EntityStore<Milestone> for MemoryGitHub {
    async fn list(&self, repo: &RepositoryRef) -> SyncResult<Vec<Milestone>> {
        self.record(Call::ListMilestones(repo.full_name()));
        self.check_read(repo)?;
        Ok(self.milestones_of(&repo.full_name()))
    }

    async fn create(&self, repo: &RepositoryRef, milestone: &Milestone) -> SyncResult<()> {
        self.record(Call::CreateMilestone {
            repo: repo.full_name(),
            title: milestone.title.clone(),
            state: milestone.state,
        });
        self.check_write(&milestone.title)?;

        let mut milestones = self.milestones.lock().unwrap();
        let existing = milestones.entry(repo.full_name()).or_default();
        let number = existing.iter().map(|m| m.number).max().unwrap_or(0) + 1;
        existing.push(Milestone {
            number,
            ..milestone.clone()
        });
        Ok(())
    }

    async fn delete(&self, repo: &RepositoryRef, milestone: &Milestone) -> SyncResult<()> {
        self.record(Call::DeleteMilestone {
            repo: repo.full_name(),
            number: milestone.number,
        });
        self.check_write(&milestone.title)?;
        if let Some(milestones) = self.milestones.lock().unwrap().get_mut(&repo.full_name()) {
            milestones.retain(|existing| existing.number != milestone.number);
        }
        Ok(())
    }
}

#[async_trait]
impl RepositoryDirectory for MemoryGitHub {
    async fn list_accessible_repository_full_names(&self) -> SyncResult<Vec<String>> {
        self.record(Call::ListRepositories);
        if self.anonymous {
            return Err(SyncError::AuthenticationRequired);
        }
        Ok(self.repositories.clone())
    }
}

/// Operator double: records the report and answers from a script (yes when exhausted)
#[derive(Default)]
pub struct ScriptedOperator {
    answers: Mutex<VecDeque<bool>>,
    lines: Mutex<Vec<(Tone, String)>>,
    questions: Mutex<Vec<String>>,
}

impl ScriptedOperator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answering(answers: &[bool]) -> Self {
        let operator = Self::default();
        operator.answers.lock().unwrap().extend(answers.iter().copied());
        operator
    }

    pub fn lines(&self) -> Vec<(Tone, String)> {
        self.lines.lock().unwrap().clone()
    }

    pub fn messages(&self, tone: Tone) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(t, _)| *t == tone)
            .map(|(_, message)| message)
            .collect()
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }
}

impl Operator for ScriptedOperator {
    fn report(&self, tone: Tone, message: &str) {
        self.lines.lock().unwrap().push((tone, message.to_string()));
    }

    fn confirm(&self, question: &str) -> anyhow::Result<bool> {
        self.questions.lock().unwrap().push(question.to_string());
        Ok(self.answers.lock().unwrap().pop_front().unwrap_or(true))
    }
}

/// Build an engine over the fake with both kinds registered
pub fn engine(
    github: &Arc<MemoryGitHub>,
    mode: ConfirmMode,
    operator: &Arc<ScriptedOperator>,
) -> SyncEngine {
    let operator: Arc<dyn Operator> = operator.clone();
    let policy = ActionPolicy::new(mode, operator.clone());
    let labels: Arc<dyn EntityStore<Label>> = github.clone();
    let milestones: Arc<dyn EntityStore<Milestone>> = github.clone();

    SyncEngine::new(
        github.clone(),
        vec![
            Box::new(LabelSynchronizer::new(labels, policy.clone())),
            Box::new(MilestoneSynchronizer::new(milestones, policy)),
        ],
        operator,
    )
}

pub fn options(from: &str, targets: &[&str]) -> SyncOptions {
    SyncOptions {
        from: from.to_string(),
        targets: targets.iter().map(|t| t.to_string()).collect(),
        kinds: EntityKind::ALL.to_vec(),
    }
}

pub fn labels_only(from: &str, targets: &[&str]) -> SyncOptions {
    SyncOptions {
        kinds: vec![EntityKind::Labels],
        ..options(from, targets)
    }
}
