use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::env;
use std::fmt;
use std::process::Command;
use tracing::{debug, info, warn};

use crate::config::AuthMethod;
use crate::discovery::RepositoryDirectory;
use crate::error::{SyncError, SyncResult};
use crate::label::Label;
use crate::milestone::{Milestone, MilestoneState};
use crate::model::RepositoryRef;
use crate::store::EntityStore;

const PER_PAGE: u8 = 100;

/// Capability to perform authenticated calls
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Anonymous,
    Authenticated(String),
}

impl Credentials {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Credentials::Authenticated(_))
    }
}

// Never print the token itself
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Anonymous => f.write_str("Anonymous"),
            Credentials::Authenticated(_) => f.write_str("Authenticated(***)"),
        }
    }
}

/// GitHub authentication strategies
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStrategy {
    /// Token passed with `--token`
    CommandLine,
    /// Use GitHub CLI authentication
    GitHubCLI,
    /// Use environment variable token
    EnvironmentToken,
    /// No credentials: read-only access to public repositories
    Anonymous,
}

/// GitHub client wrapper holding the credential capability
pub struct GitHubClient {
    client: Octocrab,
    credentials: Credentials,
}

impl GitHubClient {
    /// Create a client for `credentials` against api.github.com
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::connect(credentials, None)
    }

    /// Create a client against another API root (GitHub Enterprise, mock servers)
    pub fn with_base_uri(credentials: Credentials, base_uri: &str) -> Result<Self> {
        Self::connect(credentials, Some(base_uri))
    }

    fn connect(credentials: Credentials, base_uri: Option<&str>) -> Result<Self> {
        let mut builder = Octocrab::builder();
        if let Some(uri) = base_uri {
            builder = builder
                .base_uri(uri)
                .with_context(|| format!("Invalid GitHub API base URI: {}", uri))?;
        }

        let client = match &credentials {
            Credentials::Authenticated(token) => builder.personal_token(token.clone()).build(),
            Credentials::Anonymous => builder.build(),
        }
        .context("Failed to create GitHub client")?;

        Ok(Self {
            client,
            credentials,
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Resolve credentials: explicit token, then the configured method.
    ///
    /// `auto` falls back to anonymous access when nothing is found; the
    /// explicit methods fail instead.
    pub fn detect_credentials(
        method: &AuthMethod,
        token: Option<String>,
    ) -> Result<(AuthStrategy, Credentials)> {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            return Ok((AuthStrategy::CommandLine, Credentials::Authenticated(token)));
        }

        match method {
            AuthMethod::Auto => {
                if let Ok(token) = Self::try_environment_token() {
                    Ok((AuthStrategy::EnvironmentToken, Credentials::Authenticated(token)))
                } else if let Ok(token) = Self::try_github_cli() {
                    Ok((AuthStrategy::GitHubCLI, Credentials::Authenticated(token)))
                } else {
                    info!("No GitHub credentials found, continuing without authentication");
                    Ok((AuthStrategy::Anonymous, Credentials::Anonymous))
                }
            }
            AuthMethod::GhCli => {
                let token = Self::try_github_cli()
                    .context("GitHub CLI authentication failed. Run: gh auth login")?;
                Ok((AuthStrategy::GitHubCLI, Credentials::Authenticated(token)))
            }
            AuthMethod::Token => {
                let token = Self::try_environment_token()
                    .context("GITHUB_TOKEN environment variable not found or invalid")?;
                Ok((AuthStrategy::EnvironmentToken, Credentials::Authenticated(token)))
            }
            AuthMethod::None => Ok((AuthStrategy::Anonymous, Credentials::Anonymous)),
        }
    }

    /// Try to get token from GitHub CLI
    fn try_github_cli() -> Result<String> {
        debug!("Attempting GitHub CLI authentication");

        let token_output = Command::new("gh")
            .args(["auth", "token"])
            .output()
            .context("GitHub CLI (gh) is not installed")?;

        if !token_output.status.success() {
            return Err(anyhow!(
                "Failed to retrieve token from GitHub CLI: {}",
                String::from_utf8_lossy(&token_output.stderr)
            ));
        }

        let token = String::from_utf8(token_output.stdout)
            .context("GitHub CLI token is not valid UTF-8")?
            .trim()
            .to_string();

        if token.is_empty() {
            return Err(anyhow!("GitHub CLI returned empty token"));
        }

        debug!("Successfully obtained token from GitHub CLI");
        Ok(token)
    }

    /// Try to get token from environment variable
    fn try_environment_token() -> Result<String> {
        debug!("Attempting environment variable authentication");

        let token = env::var("GITHUB_TOKEN").context("GITHUB_TOKEN environment variable not set")?;

        if token.is_empty() {
            return Err(anyhow!("GITHUB_TOKEN is empty"));
        }

        if !token.starts_with("ghp_")
            && !token.starts_with("gho_")
            && !token.starts_with("ghs_")
            && !token.starts_with("github_pat_")
        {
            warn!("GITHUB_TOKEN doesn't look like a valid GitHub token");
        }

        debug!("Successfully found GITHUB_TOKEN environment variable");
        Ok(token)
    }

    /// Checked precondition for calls that need credentials
    fn require_authentication(&self) -> SyncResult<()> {
        if self.credentials.is_authenticated() {
            Ok(())
        } else {
            Err(SyncError::AuthenticationRequired)
        }
    }

    async fn delete_route(&self, route: &str) -> SyncResult<()> {
        let response = self.client._delete(route, None::<&()>).await?;
        let status = response.status();

        if status.is_success() {
            Ok(())
        } else if status.as_u16() == 401 {
            Err(SyncError::AuthenticationRequired)
        } else {
            Err(SyncError::RemoteRejected {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Request failed").to_string(),
            })
        }
    }
}

fn labels_route(repo: &RepositoryRef) -> String {
    format!("/repos/{}/{}/labels", repo.owner, repo.name)
}

fn label_route(repo: &RepositoryRef, name: &str) -> String {
    format!("{}/{}", labels_route(repo), urlencoding::encode(name))
}

fn milestones_route(repo: &RepositoryRef) -> String {
    format!("/repos/{}/{}/milestones", repo.owner, repo.name)
}

#[async_trait]
impl EntityStore<Label> for GitHubClient {
    async fn list(&self, repo: &RepositoryRef) -> SyncResult<Vec<Label>> {
        debug!("Fetching labels for: {}", repo);

        let mut labels = Vec::new();
        let mut page = 1u8;

        loop {
            let page_labels = self
                .client
                .issues(&repo.owner, &repo.name)
                .list_labels_for_repo()
                .per_page(PER_PAGE)
                .page(page)
                .send()
                .await?;

            let items = page_labels.items;
            if items.is_empty() {
                break;
            }

            labels.extend(items.into_iter().map(|label| Label {
                name: label.name,
                color: label.color,
                description: label.description,
            }));

            if page == u8::MAX {
                warn!("Reached maximum pagination limit (255 pages) for labels of {}", repo);
                break;
            }
            page += 1;
        }

        debug!("Found {} labels in {}", labels.len(), repo);
        Ok(labels)
    }

    async fn create(&self, repo: &RepositoryRef, label: &Label) -> SyncResult<()> {
        self.require_authentication()?;

        let mut body = json!({ "name": label.name, "color": label.color });
        if let Some(description) = &label.description {
            body["description"] = json!(description);
        }

        let _: serde_json::Value = self.client.post(labels_route(repo), Some(&body)).await?;
        Ok(())
    }

    async fn update(&self, repo: &RepositoryRef, current: &Label, desired: &Label) -> SyncResult<()> {
        self.require_authentication()?;

        let body = json!({ "new_name": desired.name, "color": desired.color });
        let _: serde_json::Value = self
            .client
            .patch(label_route(repo, &current.name), Some(&body))
            .await?;
        Ok(())
    }

    async fn delete(&self, repo: &RepositoryRef, label: &Label) -> SyncResult<()> {
        self.require_authentication()?;
        self.delete_route(&label_route(repo, &label.name)).await
    }
}

/// Wire shape of a milestone
#[derive(Debug, Deserialize)]
struct MilestoneRecord {
    number: u64,
    title: String,
    #[serde(default)]
    state: MilestoneState,
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct MilestoneQuery {
    state: &'static str,
    per_page: u8,
    page: u8,
}

#[async_trait]
impl EntityStore<Milestone> for GitHubClient {
    async fn list(&self, repo: &RepositoryRef) -> SyncResult<Vec<Milestone>> {
        debug!("Fetching milestones for: {}", repo);

        let mut milestones = Vec::new();
        let mut page = 1u8;

        loop {
            let query = MilestoneQuery {
                state: "all",
                per_page: PER_PAGE,
                page,
            };
            let items: Vec<MilestoneRecord> = self
                .client
                .get(milestones_route(repo), Some(&query))
                .await?;

            if items.is_empty() {
                break;
            }

            milestones.extend(items.into_iter().map(|record| Milestone {
                title: record.title,
                state: record.state,
                number: record.number,
                description: record.description,
            }));

            if page == u8::MAX {
                warn!("Reached maximum pagination limit (255 pages) for milestones of {}", repo);
                break;
            }
            page += 1;
        }

        debug!("Found {} milestones in {}", milestones.len(), repo);
        Ok(milestones)
    }

    async fn create(&self, repo: &RepositoryRef, milestone: &Milestone) -> SyncResult<()> {
        self.require_authentication()?;

        let mut body = json!({ "title": milestone.title, "state": milestone.state });
        if let Some(description) = &milestone.description {
            body["description"] = json!(description);
        }

        let _: serde_json::Value = self
            .client
            .post(milestones_route(repo), Some(&body))
            .await?;
        Ok(())
    }

    async fn delete(&self, repo: &RepositoryRef, milestone: &Milestone) -> SyncResult<()> {
        self.require_authentication()?;
        self.delete_route(&format!("{}/{}", milestones_route(repo), milestone.number))
            .await
    }
}

#[async_trait]
impl RepositoryDirectory for GitHubClient {
    async fn list_accessible_repository_full_names(&self) -> SyncResult<Vec<String>> {
        self.require_authentication()?;

        let mut names = Vec::new();
        let mut page = 1u8;

        loop {
            let page_repos = self
                .client
                .current()
                .list_repos_for_authenticated_user()
                .per_page(PER_PAGE)
                .page(page)
                .send()
                .await?;

            let items = page_repos.items;
            if items.is_empty() {
                break;
            }

            names.extend(items.into_iter().filter_map(|repo| repo.full_name));

            if page == u8::MAX {
                warn!("Reached maximum pagination limit (255 pages)");
                break;
            }
            page += 1;
        }

        info!("Found {} accessible repositories", names.len());
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_credentials_debug_hides_token() {
        let credentials = Credentials::Authenticated("ghp_secret".to_string());
        assert_eq!(format!("{:?}", credentials), "Authenticated(***)");
        assert!(credentials.is_authenticated());
        assert!(!Credentials::Anonymous.is_authenticated());
    }

    #[test]
    #[serial]
    fn test_explicit_token_wins() {
        env::set_var("GITHUB_TOKEN", "ghp_from_env");
        let (strategy, credentials) =
            GitHubClient::detect_credentials(&AuthMethod::Auto, Some("ghp_flag".to_string()))
                .unwrap();
        env::remove_var("GITHUB_TOKEN");

        assert_eq!(strategy, AuthStrategy::CommandLine);
        assert_eq!(credentials, Credentials::Authenticated("ghp_flag".to_string()));
    }

    #[test]
    #[serial]
    fn test_environment_token_used_by_auto() {
        env::set_var("GITHUB_TOKEN", "ghp_from_env");
        let (strategy, credentials) =
            GitHubClient::detect_credentials(&AuthMethod::Auto, None).unwrap();
        env::remove_var("GITHUB_TOKEN");

        assert_eq!(strategy, AuthStrategy::EnvironmentToken);
        assert_eq!(credentials, Credentials::Authenticated("ghp_from_env".to_string()));
    }

    #[test]
    #[serial]
    fn test_none_method_is_anonymous() {
        env::set_var("GITHUB_TOKEN", "ghp_from_env");
        let (strategy, credentials) =
            GitHubClient::detect_credentials(&AuthMethod::None, None).unwrap();
        env::remove_var("GITHUB_TOKEN");

        assert_eq!(strategy, AuthStrategy::Anonymous);
        assert_eq!(credentials, Credentials::Anonymous);
    }

    #[test]
    #[serial]
    fn test_token_method_without_env_fails() {
        env::remove_var("GITHUB_TOKEN");
        assert!(GitHubClient::detect_credentials(&AuthMethod::Token, None).is_err());
    }

    #[test]
    fn test_label_route_encodes_name() {
        let repo = RepositoryRef::new("org", "a");
        assert_eq!(
            label_route(&repo, "good first issue"),
            "/repos/org/a/labels/good%20first%20issue"
        );
    }
}
