//! Repository listing and custom property port.

use async_trait::async_trait;

use super::GitHubPortResult;
use crate::domain::{PropertyMap, RateLimitStatus, RepositoryProperties, RepositorySummary};

/// Organization repositories and their custom properties.
///
/// # Design
///
/// - Uses core-owned DTOs, not GitHub API types
/// - Listing methods return every page
/// - Property values are strings; `null` values are omitted
#[async_trait]
pub trait RepositoryMetadataPort: Send + Sync {
    /// List the forked repositories of an organization.
    async fn list_org_forks(&self, org: &str) -> GitHubPortResult<Vec<RepositorySummary>>;

    /// Custom property values for every repository of an organization.
    async fn list_org_properties(&self, org: &str)
    -> GitHubPortResult<Vec<RepositoryProperties>>;

    /// Custom property values of a single repository.
    async fn get_repository_properties(
        &self,
        owner: &str,
        repo: &str,
    ) -> GitHubPortResult<PropertyMap>;

    /// Create or update custom property values on a repository.
    ///
    /// Every property must already be defined at the organization level.
    async fn update_repository_properties(
        &self,
        owner: &str,
        repo: &str,
        properties: &PropertyMap,
    ) -> GitHubPortResult<()>;

    /// Current core API quota.
    async fn rate_limit(&self) -> GitHubPortResult<RateLimitStatus>;
}
