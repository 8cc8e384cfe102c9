//! Fork management port.

use async_trait::async_trait;

use super::GitHubPortResult;
use crate::domain::RepositoryDetails;

/// Forking source repositories into the scanning organization.
#[async_trait]
pub trait ForkManagerPort: Send + Sync {
    /// Repository details, `None` when it does not exist.
    async fn get_repository(
        &self,
        owner: &str,
        repo: &str,
    ) -> GitHubPortResult<Option<RepositoryDetails>>;

    /// Start forking `source_owner/source_repo` into `org` as `name`.
    ///
    /// Forking is asynchronous on GitHub's side; the fork may not be ready
    /// when this returns.
    async fn create_fork(
        &self,
        source_owner: &str,
        source_repo: &str,
        org: &str,
        name: &str,
    ) -> GitHubPortResult<()>;

    /// Enable vulnerability alerts, secret scanning and code scanning default setup.
    async fn enable_security_features(&self, owner: &str, repo: &str) -> GitHubPortResult<()>;

    /// Whether `.github/dependabot.yml` exists.
    async fn has_dependabot_config(&self, owner: &str, repo: &str) -> GitHubPortResult<bool>;
}
