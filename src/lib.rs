//! ghsync - Synchronize GitHub labels and milestones between repositories
//!
//! ghsync compares a source repository with one or more targets and proposes
//! the actions that make each target match: create what is missing, update
//! what differs, delete what is extra. Every action is confirmed by the
//! operator unless the run is forced.
//!
//! ## Core Features
//!
//! - **Reconciliation**: generic classification of two entity collections
//! - **Confirmation policy**: interactive prompts or unattended force mode
//! - **Fan-out**: many targets, including wildcard patterns such as `org/*`
//! - **Partial failure**: one rejected item never stops the run
//!
//! ## Modules
//!
//! - [`reconcile`]: the pure comparison engine
//! - [`policy`]: confirmation and outcome recording
//! - [`synchronizer`]: per-kind reconcile/confirm/apply cycle
//! - [`sync`]: orchestration across targets and kinds
//! - [`github`]: GitHub API integration and authentication

pub mod config;
pub mod discovery;
pub mod error;
pub mod github;
pub mod label;
pub mod milestone;
pub mod model;
pub mod policy;
pub mod reconcile;
pub mod store;
pub mod sync;
pub mod synchronizer;

pub use config::Config;
pub use error::{SyncError, SyncResult};
pub use github::{Credentials, GitHubClient};
pub use label::Label;
pub use milestone::{Milestone, MilestoneState};
pub use model::{EntityKind, RepositoryRef};
pub use policy::{ActionPolicy, ConfirmMode, ConsoleOperator, Operator};
pub use reconcile::{reconcile, Diff, DiffItem};
pub use store::{Entity, EntityStore};
pub use sync::{SyncEngine, SyncOptions, SyncSummary};
pub use synchronizer::{EntitySynchronizer, LabelSynchronizer, MilestoneSynchronizer, Synchronizer};
