//! Open GHAS alerts.
//!
//! A repository with the feature disabled answers 404 (or 403 with a
//! "disabled" message for secret scanning); both are treated as no alerts.

use serde::de::DeserializeOwned;

use super::GitHubClient;
use crate::error::{GitHubError, GitHubResult};
use crate::http::HttpBackend;
use crate::models::{ApiCodeAlert, ApiDependabotAlert, ApiSecretAlert};
use crate::url::{AlertKind, build_alerts_url};

impl<B: HttpBackend> GitHubClient<B> {
    pub(crate) async fn code_scanning_alerts(
        &self,
        owner: &str,
        repo: &str,
    ) -> GitHubResult<Vec<ApiCodeAlert>> {
        self.open_alerts(owner, repo, AlertKind::CodeScanning).await
    }

    pub(crate) async fn secret_scanning_alerts(
        &self,
        owner: &str,
        repo: &str,
    ) -> GitHubResult<Vec<ApiSecretAlert>> {
        self.open_alerts(owner, repo, AlertKind::SecretScanning).await
    }

    pub(crate) async fn dependabot_alerts(
        &self,
        owner: &str,
        repo: &str,
    ) -> GitHubResult<Vec<ApiDependabotAlert>> {
        self.open_alerts(owner, repo, AlertKind::Dependabot).await
    }

    async fn open_alerts<T: DeserializeOwned + Send>(
        &self,
        owner: &str,
        repo: &str,
        kind: AlertKind,
    ) -> GitHubResult<Vec<T>> {
        let url = build_alerts_url(&self.config, owner, repo, kind);
        match self.get_all_pages(url).await {
            Ok(alerts) => Ok(alerts),
            Err(e) if is_feature_disabled(&e) => {
                tracing::debug!(repo = %format!("{owner}/{repo}"), ?kind, "Alerts not available");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }
}

fn is_feature_disabled(error: &GitHubError) -> bool {
    match error {
        GitHubError::NotFound { .. } => true,
        GitHubError::ApiRequestFailed {
            status: 403,
            message,
            ..
        } => message.to_ascii_lowercase().contains("disabled"),
        _ => false,
    }
}
