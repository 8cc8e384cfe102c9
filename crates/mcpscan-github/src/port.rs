//! Core port implementations.
//!
//! Converts API payloads to domain types and internal errors to
//! [`GitHubPortError`] so nothing above this crate sees reqwest or raw JSON.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mcpscan_core::{
    AlertSourcePort, CatalogSourcePort, CodeScanningAlert, DependabotAlert, ForkManagerPort, GitHubPortError,
    GitHubPortResult, IssueTrackerPort, NewIssue, PropertyMap, RateLimitStatus,
    RepositoryDetails, RepositoryFetcherPort, RepositoryMetadataPort, RepositoryProperties,
    RepositorySummary, SecretScanningAlert,
};

use crate::client::GitHubClient;
use crate::error::GitHubError;
use crate::http::HttpBackend;
use crate::models::{ApiPropertyValue, ApiRate, ApiRepository, ApiRepositoryProperties};

/// Branch assumed when the API omits `default_branch`.
const FALLBACK_BRANCH: &str = "main";

// ============================================================================
// Error mapping
// ============================================================================

/// Map internal errors to port errors.
fn map_error(err: GitHubError) -> GitHubPortError {
    match err {
        GitHubError::NotFound { url } => GitHubPortError::NotFound { resource: url },
        GitHubError::RateLimited { .. } => GitHubPortError::RateLimited,
        GitHubError::ApiRequestFailed {
            status: 401 | 403,
            message,
            ..
        } => GitHubPortError::AuthRequired { message },
        GitHubError::ApiRequestFailed {
            status: 422,
            message,
            ..
        } => GitHubPortError::Unprocessable { message },
        GitHubError::ApiRequestFailed {
            status,
            url,
            message,
        } => GitHubPortError::Network {
            message: format!("HTTP {status} from {url}: {message}"),
        },
        GitHubError::InvalidResponse { message } => GitHubPortError::InvalidResponse { message },
        GitHubError::Archive { message } => GitHubPortError::Archive { message },
        GitHubError::Network(e) => GitHubPortError::Network {
            message: e.to_string(),
        },
        GitHubError::InvalidUrl(e) => GitHubPortError::Configuration {
            message: format!("invalid URL: {e}"),
        },
        GitHubError::JsonParse(e) => GitHubPortError::InvalidResponse {
            message: e.to_string(),
        },
        GitHubError::Io(e) => GitHubPortError::Archive {
            message: e.to_string(),
        },
    }
}

// ============================================================================
// Conversions
// ============================================================================

fn to_summary(repo: ApiRepository) -> RepositorySummary {
    RepositorySummary {
        name: repo.name,
        full_name: repo.full_name,
        owner: repo.owner.login,
        fork: repo.fork,
        default_branch: repo
            .default_branch
            .unwrap_or_else(|| FALLBACK_BRANCH.to_string()),
    }
}

fn to_details(repo: ApiRepository) -> RepositoryDetails {
    RepositoryDetails {
        full_name: repo.full_name,
        fork: repo.fork,
        parent_full_name: repo.parent.map(|p| p.full_name),
    }
}

/// Unset properties (`null` values) are left out of the map.
fn to_property_map(values: Vec<ApiPropertyValue>) -> PropertyMap {
    values
        .into_iter()
        .filter_map(|p| {
            let value = p.value_string()?;
            Some((p.property_name, value))
        })
        .collect()
}

fn to_repository_properties(entry: ApiRepositoryProperties) -> RepositoryProperties {
    RepositoryProperties {
        repository_name: entry.repository_name,
        repository_full_name: entry.repository_full_name,
        properties: to_property_map(entry.properties),
    }
}

fn to_rate_limit(rate: &ApiRate) -> RateLimitStatus {
    RateLimitStatus {
        limit: rate.limit,
        remaining: rate.remaining,
        used: rate.used,
        reset: DateTime::from_timestamp(rate.reset, 0).unwrap_or_else(Utc::now),
    }
}

// ============================================================================
// Port implementations
// ============================================================================

#[async_trait]
impl<B: HttpBackend> RepositoryMetadataPort for GitHubClient<B> {
    async fn list_org_forks(&self, org: &str) -> GitHubPortResult<Vec<RepositorySummary>> {
        let repos = Self::list_org_forks(self, org).await.map_err(map_error)?;
        Ok(repos.into_iter().map(to_summary).collect())
    }

    async fn list_org_properties(
        &self,
        org: &str,
    ) -> GitHubPortResult<Vec<RepositoryProperties>> {
        let entries = Self::list_org_properties(self, org)
            .await
            .map_err(map_error)?;
        Ok(entries.into_iter().map(to_repository_properties).collect())
    }

    async fn get_repository_properties(
        &self,
        owner: &str,
        repo: &str,
    ) -> GitHubPortResult<PropertyMap> {
        let values = Self::get_repository_properties(self, owner, repo)
            .await
            .map_err(map_error)?;
        Ok(to_property_map(values))
    }

    async fn update_repository_properties(
        &self,
        owner: &str,
        repo: &str,
        properties: &PropertyMap,
    ) -> GitHubPortResult<()> {
        Self::update_repository_properties(self, owner, repo, properties)
            .await
            .map_err(map_error)
    }

    async fn rate_limit(&self) -> GitHubPortResult<RateLimitStatus> {
        let rate = Self::rate_limit(self).await.map_err(map_error)?;
        Ok(to_rate_limit(&rate))
    }
}

#[async_trait]
impl<B: HttpBackend> AlertSourcePort for GitHubClient<B> {
    async fn code_scanning_alerts(
        &self,
        owner: &str,
        repo: &str,
    ) -> GitHubPortResult<Vec<CodeScanningAlert>> {
        let alerts = Self::code_scanning_alerts(self, owner, repo)
            .await
            .map_err(map_error)?;
        Ok(alerts
            .into_iter()
            .map(|a| CodeScanningAlert {
                number: a.number,
                rule_severity: a.rule.severity,
            })
            .collect())
    }

    async fn secret_scanning_alerts(
        &self,
        owner: &str,
        repo: &str,
    ) -> GitHubPortResult<Vec<SecretScanningAlert>> {
        let alerts = Self::secret_scanning_alerts(self, owner, repo)
            .await
            .map_err(map_error)?;
        Ok(alerts
            .into_iter()
            .map(|a| SecretScanningAlert {
                number: a.number,
                secret_type: a.secret_type,
                secret_type_display_name: a.secret_type_display_name,
            })
            .collect())
    }

    async fn dependabot_alerts(
        &self,
        owner: &str,
        repo: &str,
    ) -> GitHubPortResult<Vec<DependabotAlert>> {
        let alerts = Self::dependabot_alerts(self, owner, repo)
            .await
            .map_err(map_error)?;
        Ok(alerts
            .into_iter()
            .map(|a| DependabotAlert {
                number: a.number,
                severity: a.security_vulnerability.severity,
            })
            .collect())
    }
}

#[async_trait]
impl<B: HttpBackend> RepositoryFetcherPort for GitHubClient<B> {
    async fn materialize(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        dest: &Path,
    ) -> GitHubPortResult<PathBuf> {
        Self::materialize(self, owner, repo, branch, dest)
            .await
            .map_err(map_error)
    }
}

#[async_trait]
impl<B: HttpBackend> ForkManagerPort for GitHubClient<B> {
    async fn get_repository(
        &self,
        owner: &str,
        repo: &str,
    ) -> GitHubPortResult<Option<RepositoryDetails>> {
        let repo = Self::get_repository(self, owner, repo)
            .await
            .map_err(map_error)?;
        Ok(repo.map(to_details))
    }

    async fn create_fork(
        &self,
        source_owner: &str,
        source_repo: &str,
        org: &str,
        name: &str,
    ) -> GitHubPortResult<()> {
        Self::create_fork(self, source_owner, source_repo, org, name)
            .await
            .map_err(map_error)
    }

    async fn enable_security_features(&self, owner: &str, repo: &str) -> GitHubPortResult<()> {
        Self::enable_security_features(self, owner, repo)
            .await
            .map_err(map_error)
    }

    async fn has_dependabot_config(&self, owner: &str, repo: &str) -> GitHubPortResult<bool> {
        Self::has_dependabot_config(self, owner, repo)
            .await
            .map_err(map_error)
    }
}

#[async_trait]
impl<B: HttpBackend> CatalogSourcePort for GitHubClient<B> {
    async fn fetch_document(&self, url: &str) -> GitHubPortResult<String> {
        Self::fetch_document(self, url).await.map_err(map_error)
    }
}

#[async_trait]
impl<B: HttpBackend> IssueTrackerPort for GitHubClient<B> {
    async fn has_open_issue(
        &self,
        owner: &str,
        repo: &str,
        title_query: &str,
    ) -> GitHubPortResult<bool> {
        Self::has_open_issue(self, owner, repo, title_query)
            .await
            .map_err(map_error)
    }

    async fn create_issue(
        &self,
        owner: &str,
        repo: &str,
        issue: &NewIssue,
    ) -> GitHubPortResult<u64> {
        Self::create_issue(self, owner, repo, issue)
            .await
            .map_err(map_error)
    }
}
