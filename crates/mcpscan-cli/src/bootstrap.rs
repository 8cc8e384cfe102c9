//! CLI bootstrap - the composition root.
//!
//! The only place the GitHub client is constructed. One client implements
//! every port; handlers see the ports only.

use std::sync::Arc;

use anyhow::Result;
use mcpscan_core::{
    AlertSourcePort, CatalogSourcePort, ForkManagerPort, IssueTrackerPort, RepositoryFetcherPort,
    RepositoryMetadataPort,
};
use mcpscan_github::{DefaultGitHubClient, GitHubClientConfig};

use crate::error::CliError;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// API token; `None` sends unauthenticated requests.
    pub token: Option<String>,
    /// API base URL override.
    pub api_url: Option<String>,
}

impl CliConfig {
    /// Build from parsed arguments, falling back to `GH_TOKEN` when no
    /// token was given.
    pub fn from_args(token: Option<String>, api_url: Option<String>) -> Self {
        let token = token
            .or_else(|| std::env::var("GH_TOKEN").ok())
            .filter(|t| !t.trim().is_empty());
        Self { token, api_url }
    }

    fn client_config(&self) -> GitHubClientConfig {
        let config = GitHubClientConfig::new().with_optional_token(self.token.clone());
        match &self.api_url {
            Some(url) => config.with_base_url(url),
            None => config,
        }
    }
}

/// Port handles shared by every command.
pub struct CliContext {
    pub metadata: Arc<dyn RepositoryMetadataPort>,
    pub alerts: Arc<dyn AlertSourcePort>,
    pub fetcher: Arc<dyn RepositoryFetcherPort>,
    pub forks: Arc<dyn ForkManagerPort>,
    pub issues: Arc<dyn IssueTrackerPort>,
    pub catalog: Arc<dyn CatalogSourcePort>,
}

/// Build the context from configuration.
pub fn bootstrap(config: &CliConfig) -> Result<CliContext> {
    if config.token.is_none() {
        tracing::warn!("No GitHub token configured; requests are unauthenticated");
    }

    let client_config = config.client_config();
    if client_config.is_enterprise() {
        tracing::info!(api_url = ?config.api_url, "Using GitHub Enterprise Server API");
    }
    let client =
        DefaultGitHubClient::new(&client_config).map_err(|e| CliError::Config(e.to_string()))?;
    let client = Arc::new(client);

    Ok(CliContext {
        metadata: client.clone(),
        alerts: client.clone(),
        fetcher: client.clone(),
        forks: client.clone(),
        issues: client.clone(),
        catalog: client,
    })
}
