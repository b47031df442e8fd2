//! Target discovery - turns the operator's target tokens into repositories
//!
//! A single token containing `*` is a pattern matched against every
//! repository the authenticated operator can access. Anything else is a list
//! of literal `owner/name` identifiers.

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::{SyncError, SyncResult};
use crate::model::RepositoryRef;

const WILDCARD: char = '*';

/// Source of the repository names the operator can access
#[async_trait]
pub trait RepositoryDirectory: Send + Sync {
    /// Full names (`owner/name`) of every accessible repository.
    ///
    /// Requires authentication.
    async fn list_accessible_repository_full_names(&self) -> SyncResult<Vec<String>>;
}

/// What the operator asked to synchronize into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSpec {
    /// Literal identifiers, used verbatim
    Explicit(Vec<String>),
    /// One wildcard pattern to expand
    Pattern(String),
}

impl TargetSpec {
    pub fn from_tokens(tokens: &[String]) -> Self {
        match tokens {
            [single] if single.contains(WILDCARD) => TargetSpec::Pattern(single.clone()),
            _ => TargetSpec::Explicit(tokens.to_vec()),
        }
    }

    /// Resolve into concrete repositories, in resolution order.
    ///
    /// Explicit tokens are parsed without touching the directory. A pattern
    /// that matches nothing resolves to an empty list.
    pub async fn resolve(&self, directory: &dyn RepositoryDirectory) -> SyncResult<Vec<RepositoryRef>> {
        match self {
            TargetSpec::Explicit(tokens) => tokens.iter().map(|token| token.parse()).collect(),
            TargetSpec::Pattern(pattern) => {
                let matcher = glob_to_regex(pattern)?;
                let names = directory.list_accessible_repository_full_names().await?;
                debug!("Matching {} accessible repositories against {}", names.len(), pattern);

                let targets: Vec<RepositoryRef> = names
                    .iter()
                    .filter(|name| matcher.is_match(name))
                    .filter_map(|name| match name.parse() {
                        Ok(repo) => Some(repo),
                        Err(e) => {
                            warn!("Ignoring repository {}: {}", name, e);
                            None
                        }
                    })
                    .collect();

                info!("Pattern {} matched {} repositories", pattern, targets.len());
                Ok(targets)
            }
        }
    }
}

/// Translate a pattern into an anchored, case-sensitive regex where `*`
/// stands for one or more characters and everything else is literal.
pub fn glob_to_regex(pattern: &str) -> SyncResult<Regex> {
    let body = pattern
        .split(WILDCARD)
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".+");

    Regex::new(&format!("^{}$", body)).map_err(|_| SyncError::MalformedRepository(pattern.to_string()))
}
