//! Entity synchronizer - one reconcile/confirm/apply cycle for one kind
//!
//! The synchronizer fetches both sides from its store, classifies them with
//! the entity's identity and value comparators, reports every difference to
//! the operator and lets the action policy decide what to apply.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::SyncResult;
use crate::label::Label;
use crate::milestone::Milestone;
use crate::model::{EntityKind, RepositoryRef};
use crate::policy::{Action, ActionPolicy, ItemReport, Outcome, Tone};
use crate::reconcile::{reconcile, DiffItem};
use crate::store::{Entity, EntityStore};

/// Result of synchronizing one kind into one target
#[derive(Debug)]
pub struct KindReport {
    pub kind: EntityKind,
    pub target: RepositoryRef,
    pub matched: usize,
    pub items: Vec<ItemReport>,
}

impl KindReport {
    /// Number of items whose outcome satisfies `predicate`
    pub fn count(&self, predicate: impl Fn(&Outcome) -> bool) -> usize {
        self.items
            .iter()
            .filter(|item| predicate(&item.outcome))
            .count()
    }
}

/// Kind-erased view so the orchestrator can iterate every kind
#[async_trait]
pub trait Synchronizer: Send + Sync {
    fn kind(&self) -> EntityKind;

    /// Reconcile `to` against `from` and apply approved actions.
    ///
    /// Read failures are returned; mutation failures are recorded per item.
    async fn synchronize(&self, from: &RepositoryRef, to: &RepositoryRef) -> SyncResult<KindReport>;
}

/// Synchronizer for any entity kind backed by an [`EntityStore`]
pub struct EntitySynchronizer<E: Entity> {
    store: Arc<dyn EntityStore<E>>,
    policy: ActionPolicy,
}

pub type LabelSynchronizer = EntitySynchronizer<Label>;
pub type MilestoneSynchronizer = EntitySynchronizer<Milestone>;

impl<E: Entity> EntitySynchronizer<E> {
    pub fn new(store: Arc<dyn EntityStore<E>>, policy: ActionPolicy) -> Self {
        Self { store, policy }
    }

    async fn handle(&self, to: &RepositoryRef, item: DiffItem<E>) -> ItemReport {
        let operator = self.policy.operator();
        let repo = to.full_name();

        let (name, action, outcome) = match item {
            DiffItem::Changed { left, right } => {
                operator.report(Tone::Item, &left.describe_change(&right));
                let subject = format!("{} {} in {}", E::NOUN, right.display_name(), repo);
                let outcome = self
                    .policy
                    .apply(
                        &E::update_question(),
                        &subject,
                        &format!("{} updated", capitalize(E::NOUN)),
                        self.store.update(to, &right, &left),
                    )
                    .await;
                (right.display_name().to_string(), Action::Update, outcome)
            }
            DiffItem::MissingRight(entity) => {
                operator.report(
                    Tone::Item,
                    &format!("Missing {} {} from {}", E::NOUN, entity.display_name(), repo),
                );
                let subject = format!("{} {} in {}", E::NOUN, entity.display_name(), repo);
                let outcome = self
                    .policy
                    .apply(
                        &format!("Do you want to create this missing {}?", E::NOUN),
                        &subject,
                        &format!("{} created", capitalize(E::NOUN)),
                        self.store.create(to, &entity),
                    )
                    .await;
                (entity.display_name().to_string(), Action::Create, outcome)
            }
            DiffItem::MissingLeft(entity) => {
                operator.report(
                    Tone::Item,
                    &format!("Extra {} {} in {}", E::NOUN, entity.display_name(), repo),
                );
                let subject = format!("{} {} in {}", E::NOUN, entity.display_name(), repo);
                let outcome = self
                    .policy
                    .apply(
                        &format!("Do you want to delete this extra {}?", E::NOUN),
                        &subject,
                        &format!("{} deleted", capitalize(E::NOUN)),
                        self.store.delete(to, &entity),
                    )
                    .await;
                (entity.display_name().to_string(), Action::Delete, outcome)
            }
        };

        ItemReport {
            target: to.clone(),
            kind: E::KIND,
            name,
            action,
            outcome,
        }
    }
}

#[async_trait]
impl<E: Entity> Synchronizer for EntitySynchronizer<E> {
    fn kind(&self) -> EntityKind {
        E::KIND
    }

    async fn synchronize(&self, from: &RepositoryRef, to: &RepositoryRef) -> SyncResult<KindReport> {
        let from_entities = self.store.list(from).await?;
        let to_entities = self.store.list(to).await?;

        debug!(
            "Comparing {} {} from {} with {} in {}",
            from_entities.len(),
            E::KIND,
            from,
            to_entities.len(),
            to
        );

        let diff = reconcile(from_entities, to_entities, E::same_identity, E::same_value);
        let matched = diff.matched;

        info!(
            "{} {} in sync, {} differences between {} and {}",
            matched,
            E::KIND,
            diff.len(),
            from,
            to
        );

        let mut items = Vec::with_capacity(diff.len());
        for item in diff {
            items.push(self.handle(to, item).await);
        }

        Ok(KindReport {
            kind: E::KIND,
            target: to.clone(),
            matched,
            items,
        })
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
