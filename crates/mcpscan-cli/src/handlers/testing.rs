//! In-memory GitHub for handler tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use mcpscan_core::{
    AlertSourcePort, CatalogSourcePort, CodeScanningAlert, DependabotAlert, ForkManagerPort,
    GitHubPortError, GitHubPortResult, IssueTrackerPort, NewIssue, PropertyMap, RateLimitStatus,
    RepositoryDetails, RepositoryFetcherPort, RepositoryMetadataPort, RepositoryProperties,
    RepositorySummary, SecretScanningAlert,
};

use crate::bootstrap::CliContext;

/// Serves forks, properties and README contents from memory and records
/// every write.
#[derive(Default)]
pub struct FakeGitHub {
    pub forks: Vec<RepositorySummary>,
    pub org_properties: Vec<RepositoryProperties>,
    /// Repository name to README content of its checkout.
    pub readmes: HashMap<String, String>,
    /// Repository names whose code scanning alerts fail to load.
    pub broken_alerts: Vec<String>,
    pub updates: Mutex<Vec<(String, PropertyMap)>>,
    pub issues: Mutex<Vec<NewIssue>>,
    /// Catalog documents by URL; other URLs fail to fetch.
    pub documents: HashMap<String, String>,
}

impl FakeGitHub {
    pub fn fork(name: &str) -> RepositorySummary {
        RepositorySummary {
            name: name.to_string(),
            full_name: format!("mcp-research/{name}"),
            owner: "mcp-research".to_string(),
            fork: true,
            default_branch: "main".to_string(),
        }
    }

    pub fn with_fork(mut self, name: &str, readme: &str) -> Self {
        self.forks.push(Self::fork(name));
        self.readmes.insert(name.to_string(), readme.to_string());
        self
    }

    pub fn updates_for(&self, repo: &str) -> Vec<PropertyMap> {
        self.updates
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == repo)
            .map(|(_, props)| props.clone())
            .collect()
    }

    pub fn into_context(self) -> (Arc<Self>, CliContext) {
        let fake = Arc::new(self);
        let ctx = CliContext {
            metadata: fake.clone(),
            alerts: fake.clone(),
            fetcher: fake.clone(),
            forks: fake.clone(),
            issues: fake.clone(),
            catalog: fake.clone(),
        };
        (fake, ctx)
    }
}

#[async_trait]
impl RepositoryMetadataPort for FakeGitHub {
    async fn list_org_forks(&self, _org: &str) -> GitHubPortResult<Vec<RepositorySummary>> {
        Ok(self.forks.clone())
    }

    async fn list_org_properties(&self, _org: &str) -> GitHubPortResult<Vec<RepositoryProperties>> {
        Ok(self.org_properties.clone())
    }

    async fn get_repository_properties(&self, _owner: &str, _repo: &str) -> GitHubPortResult<PropertyMap> {
        Ok(PropertyMap::new())
    }

    async fn update_repository_properties(
        &self,
        _owner: &str,
        repo: &str,
        properties: &PropertyMap,
    ) -> GitHubPortResult<()> {
        self.updates
            .lock()
            .unwrap()
            .push((repo.to_string(), properties.clone()));
        Ok(())
    }

    async fn rate_limit(&self) -> GitHubPortResult<RateLimitStatus> {
        Ok(RateLimitStatus {
            limit: 5000,
            remaining: 4990,
            used: 10,
            reset: Utc::now(),
        })
    }
}

#[async_trait]
impl AlertSourcePort for FakeGitHub {
    async fn code_scanning_alerts(&self, _owner: &str, repo: &str) -> GitHubPortResult<Vec<CodeScanningAlert>> {
        if self.broken_alerts.iter().any(|name| name == repo) {
            return Err(GitHubPortError::Network {
                message: "connection reset".to_string(),
            });
        }
        Ok(vec![CodeScanningAlert {
            number: 1,
            rule_severity: Some("critical".to_string()),
        }])
    }

    async fn secret_scanning_alerts(&self, _owner: &str, _repo: &str) -> GitHubPortResult<Vec<SecretScanningAlert>> {
        Ok(Vec::new())
    }

    async fn dependabot_alerts(&self, _owner: &str, _repo: &str) -> GitHubPortResult<Vec<DependabotAlert>> {
        Ok(vec![DependabotAlert {
            number: 2,
            severity: Some("moderate".to_string()),
        }])
    }
}

#[async_trait]
impl RepositoryFetcherPort for FakeGitHub {
    async fn materialize(
        &self,
        owner: &str,
        repo: &str,
        _branch: &str,
        dest: &Path,
    ) -> GitHubPortResult<PathBuf> {
        let root = dest.join(format!("{owner}-{repo}-1a2b3c"));
        let readme = self.readmes.get(repo).cloned().unwrap_or_default();
        std::fs::create_dir_all(&root)
            .and_then(|()| std::fs::write(root.join("README.md"), readme))
            .map_err(|e| GitHubPortError::Archive {
                message: e.to_string(),
            })?;
        Ok(root)
    }
}

#[async_trait]
impl ForkManagerPort for FakeGitHub {
    async fn get_repository(&self, _owner: &str, _repo: &str) -> GitHubPortResult<Option<RepositoryDetails>> {
        Ok(None)
    }

    async fn create_fork(&self, _source_owner: &str, _source_repo: &str, _org: &str, _name: &str) -> GitHubPortResult<()> {
        Ok(())
    }

    async fn enable_security_features(&self, _owner: &str, _repo: &str) -> GitHubPortResult<()> {
        Ok(())
    }

    async fn has_dependabot_config(&self, _owner: &str, _repo: &str) -> GitHubPortResult<bool> {
        Ok(true)
    }
}

#[async_trait]
impl IssueTrackerPort for FakeGitHub {
    async fn has_open_issue(&self, _owner: &str, _repo: &str, _title_query: &str) -> GitHubPortResult<bool> {
        Ok(false)
    }

    async fn create_issue(&self, _owner: &str, _repo: &str, issue: &NewIssue) -> GitHubPortResult<u64> {
        let mut issues = self.issues.lock().unwrap();
        issues.push(issue.clone());
        Ok(issues.len() as u64)
    }
}

#[async_trait]
impl CatalogSourcePort for FakeGitHub {
    async fn fetch_document(&self, url: &str) -> GitHubPortResult<String> {
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| GitHubPortError::Network {
                message: format!("connection refused: {url}"),
            })
    }
}
