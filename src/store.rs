//! Entity store abstraction
//!
//! An entity store fetches and mutates one kind of entity in a remote
//! repository. The GitHub client implements it for every kind; tests plug in
//! an in-memory store.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::{SyncError, SyncResult};
use crate::model::{EntityKind, RepositoryRef};

/// A configuration object that can be reconciled between repositories
pub trait Entity: Clone + Debug + Send + Sync + 'static {
    /// Which kind this entity belongs to
    const KIND: EntityKind;

    /// Singular noun used in operator messages ("label")
    const NOUN: &'static str;

    /// Name shown to the operator
    fn display_name(&self) -> &str;

    /// Whether `other` is the same logical entity
    fn same_identity(&self, other: &Self) -> bool;

    /// Whether a same-identity pair needs no action. Kinds without
    /// comparable fields keep the default.
    fn same_value(&self, _other: &Self) -> bool {
        true
    }

    /// Line reported for a same-identity pair whose values differ
    fn describe_change(&self, other: &Self) -> String {
        format!(
            "Same {} but different values for {}",
            Self::NOUN,
            other.display_name()
        )
    }

    /// Question asked before updating a changed entity
    fn update_question() -> String {
        format!("Do you want to update this {}?", Self::NOUN)
    }
}

/// Remote storage for one entity kind
#[async_trait]
pub trait EntityStore<E: Entity>: Send + Sync {
    /// Fetch every entity of the repository in remote order
    async fn list(&self, repo: &RepositoryRef) -> SyncResult<Vec<E>>;

    /// Create `entity` in the repository
    async fn create(&self, repo: &RepositoryRef, entity: &E) -> SyncResult<()>;

    /// Rewrite `current` so that it matches `desired`
    async fn update(&self, _repo: &RepositoryRef, _current: &E, _desired: &E) -> SyncResult<()> {
        Err(SyncError::UnsupportedOperation(format!(
            "Updating {}",
            E::KIND
        )))
    }

    /// Remove `entity` from the repository
    async fn delete(&self, repo: &RepositoryRef, entity: &E) -> SyncResult<()>;
}
