//! Sync Engine - Orchestrates synchronization across targets and kinds
//!
//! The engine resolves the target list, then walks every target in order and
//! runs each enabled kind to completion (labels before milestones) before
//! moving on. Everything is strictly sequential: the operator sees one item
//! at a time and a later step may read state an earlier step changed.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::discovery::{RepositoryDirectory, TargetSpec};
use crate::error::{SyncError, SyncResult};
use crate::github::GitHubClient;
use crate::label::Label;
use crate::milestone::Milestone;
use crate::model::{EntityKind, RepositoryRef};
use crate::policy::{ActionPolicy, ConfirmMode, ItemReport, Operator, Outcome, Tone};
use crate::store::EntityStore;
use crate::synchronizer::{EntitySynchronizer, KindReport, Synchronizer};

/// Resolved run configuration handed to the engine
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Repository holding the reference labels and milestones
    pub from: String,
    /// Target tokens: literal identifiers or a single wildcard pattern
    pub targets: Vec<String>,
    /// Enabled kinds; processing order is fixed regardless of this order
    pub kinds: Vec<EntityKind>,
}

/// A (target, kind) pair that could not be compared
#[derive(Debug)]
pub struct KindFailure {
    pub target: RepositoryRef,
    pub kind: EntityKind,
    pub error: SyncError,
}

/// Results from a complete sync operation
#[derive(Debug)]
pub struct SyncSummary {
    pub total_repositories: usize,
    pub applied_operations: usize,
    pub declined_operations: usize,
    pub failed_operations: usize,
    pub duration: Duration,
    pub reports: Vec<KindReport>,
    pub failures: Vec<KindFailure>,
}

impl SyncSummary {
    fn compile(
        total_repositories: usize,
        reports: Vec<KindReport>,
        failures: Vec<KindFailure>,
        duration: Duration,
    ) -> Self {
        let mut applied_operations = 0;
        let mut declined_operations = 0;
        let mut failed_operations = 0;

        for item in reports.iter().flat_map(|report| report.items.iter()) {
            match item.outcome {
                Outcome::Applied => applied_operations += 1,
                Outcome::SkippedByUser => declined_operations += 1,
                Outcome::SkippedOnError(_) => failed_operations += 1,
            }
        }

        Self {
            total_repositories,
            applied_operations,
            declined_operations,
            failed_operations,
            duration,
            reports,
            failures,
        }
    }

    /// Every per-item record, in processing order
    pub fn items(&self) -> impl Iterator<Item = &ItemReport> {
        self.reports.iter().flat_map(|report| report.items.iter())
    }

    /// One-line run report
    pub fn line(&self) -> String {
        format!(
            "Finished: {} applied, {} skipped by user, {} failed, {} sync errors across {} repositories",
            self.applied_operations,
            self.declined_operations,
            self.failed_operations,
            self.failures.len(),
            self.total_repositories
        )
    }
}

/// The main sync engine that fans synchronizers out over targets
pub struct SyncEngine {
    directory: Arc<dyn RepositoryDirectory>,
    synchronizers: Vec<Box<dyn Synchronizer>>,
    operator: Arc<dyn Operator>,
}

impl SyncEngine {
    pub fn new(
        directory: Arc<dyn RepositoryDirectory>,
        synchronizers: Vec<Box<dyn Synchronizer>>,
        operator: Arc<dyn Operator>,
    ) -> Self {
        Self {
            directory,
            synchronizers,
            operator,
        }
    }

    /// Wire label and milestone synchronizers onto one GitHub client, sharing
    /// one confirmation policy
    pub fn github(client: Arc<GitHubClient>, mode: ConfirmMode, operator: Arc<dyn Operator>) -> Self {
        let policy = ActionPolicy::new(mode, operator.clone());
        let labels: Arc<dyn EntityStore<Label>> = client.clone();
        let milestones: Arc<dyn EntityStore<Milestone>> = client.clone();

        Self::new(
            client,
            vec![
                Box::new(EntitySynchronizer::new(labels, policy.clone())),
                Box::new(EntitySynchronizer::new(milestones, policy)),
            ],
            operator,
        )
    }

    /// Run a complete sync operation.
    ///
    /// Fails only when the run cannot start: a malformed identifier or a
    /// wildcard that cannot be expanded. Everything after that is recorded in
    /// the summary.
    pub async fn run(&self, options: &SyncOptions) -> SyncResult<SyncSummary> {
        let start_time = Instant::now();

        let from: RepositoryRef = options.from.parse()?;
        let targets = TargetSpec::from_tokens(&options.targets)
            .resolve(self.directory.as_ref())
            .await?;

        info!("Synchronizing {} into {} repositories", from, targets.len());

        let mut reports = Vec::new();
        let mut failures = Vec::new();

        for target in &targets {
            if *target == from {
                warn!("Skipping {}: it is the source repository", target);
                continue;
            }

            for kind in EntityKind::ALL {
                if !options.kinds.contains(&kind) {
                    continue;
                }
                let Some(synchronizer) = self.synchronizer(kind) else {
                    warn!("No synchronizer registered for {}", kind);
                    continue;
                };

                self.operator.report(
                    Tone::Heading,
                    &format!("Synchronizing {} from {} to {}", kind, from, target),
                );

                match synchronizer.synchronize(&from, target).await {
                    Ok(report) => reports.push(report),
                    Err(e) => {
                        error!("Failed to synchronize {} into {}: {}", kind, target, e);
                        self.operator.report(
                            Tone::Failure,
                            &format!("Error getting {} from {} or {}: {}", kind, from, target, e),
                        );
                        failures.push(KindFailure {
                            target: target.clone(),
                            kind,
                            error: e,
                        });
                    }
                }
            }
        }

        let summary = SyncSummary::compile(targets.len(), reports, failures, start_time.elapsed());

        info!(
            "Sync completed in {:.2}s: {} applied, {} declined, {} failed",
            summary.duration.as_secs_f64(),
            summary.applied_operations,
            summary.declined_operations,
            summary.failed_operations
        );
        self.operator.report(Tone::Heading, &summary.line());

        Ok(summary)
    }

    fn synchronizer(&self, kind: EntityKind) -> Option<&dyn Synchronizer> {
        self.synchronizers
            .iter()
            .find(|synchronizer| synchronizer.kind() == kind)
            .map(|synchronizer| synchronizer.as_ref())
    }
}
