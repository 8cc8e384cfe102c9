//! Runtime detection for a forked repository.
//!
//! Downloads the fork, runs the extraction engine on a blocking thread,
//! records the detected launcher as a repository property and files an
//! issue when a composition was found but could not be used.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;

use super::ServiceError;
use super::issues::{IssueFiler, IssueOutcome};
use crate::domain::{PropertyMap, RepositorySummary, RuntimeInfo, ServerType};
use crate::ports::{RepositoryFetcherPort, RepositoryMetadataPort};
use crate::properties::{GHAS_STATUS_UPDATED, MCP_SERVER_RUNTIME};
use crate::scan::{ScanError, ScanOptions, detect_runtime};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeScanOutcome {
    Detected(RuntimeInfo),
    NoComposition,
    Failed {
        error: ScanError,
        /// `None` when no issue repository is configured or filing failed.
        issue: Option<IssueOutcome>,
    },
}

impl RuntimeScanOutcome {
    /// Value persisted in `MCP_Server_Runtime`.
    pub const fn server_type(&self) -> ServerType {
        match self {
            Self::Detected(info) => info.server_type,
            Self::NoComposition | Self::Failed { .. } => ServerType::Unknown,
        }
    }
}

pub struct RuntimeScanService {
    fetcher: Arc<dyn RepositoryFetcherPort>,
    metadata: Arc<dyn RepositoryMetadataPort>,
    issues: Option<IssueFiler>,
    options: ScanOptions,
}

impl RuntimeScanService {
    pub fn new(
        fetcher: Arc<dyn RepositoryFetcherPort>,
        metadata: Arc<dyn RepositoryMetadataPort>,
    ) -> Self {
        Self {
            fetcher,
            metadata,
            issues: None,
            options: ScanOptions::default(),
        }
    }

    #[must_use]
    pub fn with_issue_filer(mut self, issues: IssueFiler) -> Self {
        self.issues = Some(issues);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    /// Materialize `repo` under `work_dir/<name>`, detect its runtime and
    /// persist the result. The checkout is removed afterwards.
    pub async fn scan(
        &self,
        repo: &RepositorySummary,
        work_dir: &Path,
    ) -> Result<RuntimeScanOutcome, ServiceError> {
        let dest = work_dir.join(&repo.name);
        let result = self.scan_checkout(repo, &dest).await;

        if let Err(e) = tokio::fs::remove_dir_all(&dest).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %dest.display(), error = %e, "Could not remove checkout");
            }
        }

        result
    }

    async fn scan_checkout(
        &self,
        repo: &RepositorySummary,
        dest: &Path,
    ) -> Result<RuntimeScanOutcome, ServiceError> {
        let root = self
            .fetcher
            .materialize(&repo.owner, &repo.name, &repo.default_branch, dest)
            .await?;

        let options = self.options.clone();
        let detection = tokio::task::spawn_blocking(move || detect_runtime(&root, &options))
            .await
            .map_err(|e| ServiceError::Task(e.to_string()))?;

        let outcome = match detection {
            Ok(Some(info)) => {
                tracing::info!(
                    repo = %repo.full_name,
                    server = %info.server,
                    server_type = %info.server_type,
                    command = %info.command,
                    "Detected MCP runtime"
                );
                RuntimeScanOutcome::Detected(info)
            }
            Ok(None) => {
                tracing::info!(repo = %repo.full_name, "No MCP composition found");
                RuntimeScanOutcome::NoComposition
            }
            Err(error) => {
                tracing::error!(repo = %repo.full_name, error = %error, "Failed to analyze MCP composition");
                let issue = self.file_issue(repo, &error).await;
                RuntimeScanOutcome::Failed { error, issue }
            }
        };

        let properties = PropertyMap::from([
            (
                MCP_SERVER_RUNTIME.to_string(),
                outcome.server_type().to_string(),
            ),
            (GHAS_STATUS_UPDATED.to_string(), Utc::now().to_rfc3339()),
        ]);
        self.metadata
            .update_repository_properties(&repo.owner, &repo.name, &properties)
            .await?;

        Ok(outcome)
    }

    async fn file_issue(&self, repo: &RepositorySummary, error: &ScanError) -> Option<IssueOutcome> {
        let filer = self.issues.as_ref()?;
        match filer.file(&repo.name, error).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::warn!(repo = %repo.full_name, error = %e, "Could not file analysis-failure issue");
                None
            }
        }
    }
}
