//! Fork creation and security feature setup.

use serde_json::{Value, json};

use super::GitHubClient;
use crate::error::{GitHubError, GitHubResult};
use crate::http::{HttpBackend, HttpMethod};
use crate::url::{
    build_contents_url, build_default_setup_url, build_forks_url, build_repo_url,
    build_vulnerability_alerts_url,
};

const DEPENDABOT_CONFIG_PATH: &str = ".github/dependabot.yml";

impl<B: HttpBackend> GitHubClient<B> {
    /// Fork `source_owner/source_repo` into `org` under `name`, keeping
    /// every branch.
    pub(crate) async fn create_fork(
        &self,
        source_owner: &str,
        source_repo: &str,
        org: &str,
        name: &str,
    ) -> GitHubResult<()> {
        let url = build_forks_url(&self.config, source_owner, source_repo);
        let body = json!({
            "organization": org,
            "name": name,
            "default_branch_only": false,
        });
        self.backend.send_json(HttpMethod::Post, &url, &body).await?;
        tracing::info!(
            source = %format!("{source_owner}/{source_repo}"),
            fork = %format!("{org}/{name}"),
            "Fork requested"
        );
        Ok(())
    }

    /// Turn on Dependabot alerts, secret scanning and code scanning default
    /// setup.
    ///
    /// The first two must succeed. Default setup is best effort: GitHub
    /// refuses it for repositories without a supported language.
    pub(crate) async fn enable_security_features(&self, owner: &str, repo: &str) -> GitHubResult<()> {
        let full_name = format!("{owner}/{repo}");

        let url = build_vulnerability_alerts_url(&self.config, owner, repo);
        self.backend.send_json(HttpMethod::Put, &url, &Value::Null).await?;
        tracing::debug!(repo = %full_name, "Dependabot alerts enabled");

        let url = build_repo_url(&self.config, owner, repo);
        let body = json!({
            "security_and_analysis": {
                "secret_scanning": {"status": "enabled"}
            }
        });
        self.backend.send_json(HttpMethod::Patch, &url, &body).await?;
        tracing::debug!(repo = %full_name, "Secret scanning enabled");

        let url = build_default_setup_url(&self.config, owner, repo);
        let body = json!({"state": "configured"});
        match self.backend.send_json(HttpMethod::Patch, &url, &body).await {
            Ok(_) => tracing::debug!(repo = %full_name, "Code scanning default setup configured"),
            Err(e) if matches!(e.status(), Some(404 | 409)) => {
                tracing::warn!(repo = %full_name, error = %e, "Code scanning default setup unavailable");
            }
            Err(e) => {
                tracing::error!(repo = %full_name, error = %e, "Code scanning default setup failed");
            }
        }

        tracing::info!(repo = %full_name, "Security features enabled");
        Ok(())
    }

    /// Whether the repository carries `.github/dependabot.yml`.
    pub(crate) async fn has_dependabot_config(&self, owner: &str, repo: &str) -> GitHubResult<bool> {
        let url = build_contents_url(&self.config, owner, repo, DEPENDABOT_CONFIG_PATH);
        match self.backend.get_json::<Value>(&url).await {
            Ok(_) => Ok(true),
            Err(GitHubError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::test_config;
    use crate::http::testing::{CannedResponse, FakeBackend};

    #[tokio::test]
    async fn test_create_fork_request() {
        let client = GitHubClient::with_backend(test_config(), FakeBackend::new());
        client
            .create_fork("modelcontextprotocol", "servers", "mcp-research", "modelcontextprotocol__servers")
            .await
            .unwrap();

        let sent = client.backend.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, HttpMethod::Post);
        assert!(sent[0].url.ends_with("/repos/modelcontextprotocol/servers/forks"));
        assert_eq!(
            sent[0].body,
            json!({
                "organization": "mcp-research",
                "name": "modelcontextprotocol__servers",
                "default_branch_only": false
            })
        );
    }

    #[tokio::test]
    async fn test_enable_security_features_requests() {
        let client = GitHubClient::with_backend(test_config(), FakeBackend::new());
        client.enable_security_features("o", "r").await.unwrap();

        let sent = client.backend.sent();
        let calls: Vec<_> = sent.iter().map(|r| (r.method, r.url.as_str())).collect();
        assert_eq!(
            calls,
            vec![
                (HttpMethod::Put, "https://api.github.com/repos/o/r/vulnerability-alerts"),
                (HttpMethod::Patch, "https://api.github.com/repos/o/r"),
                (HttpMethod::Patch, "https://api.github.com/repos/o/r/code-scanning/default-setup"),
            ]
        );
        assert_eq!(
            sent[1].body["security_and_analysis"]["secret_scanning"]["status"],
            "enabled"
        );
        assert_eq!(sent[2].body, json!({"state": "configured"}));
    }

    #[tokio::test]
    async fn test_default_setup_failure_is_tolerated() {
        let backend = FakeBackend::new()
            .with_response("code-scanning/default-setup", CannedResponse::status(409));
        let client = GitHubClient::with_backend(test_config(), backend);
        tokio_test::assert_ok!(client.enable_security_features("o", "r").await);
    }

    #[tokio::test]
    async fn test_vulnerability_alerts_failure_propagates() {
        let backend = FakeBackend::new()
            .with_response("vulnerability-alerts", CannedResponse::status(403));
        let client = GitHubClient::with_backend(test_config(), backend);
        tokio_test::assert_err!(client.enable_security_features("o", "r").await);
        assert_eq!(client.backend.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_has_dependabot_config() {
        let backend = FakeBackend::new().with_response(
            "with/contents/.github/dependabot.yml",
            CannedResponse::json(json!({"name": "dependabot.yml", "type": "file"})),
        );
        let client = GitHubClient::with_backend(test_config(), backend);

        assert!(tokio_test::assert_ok!(client.has_dependabot_config("o", "with").await));
        assert!(!tokio_test::assert_ok!(client.has_dependabot_config("o", "without").await));
    }
}
