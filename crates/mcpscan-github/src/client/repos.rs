//! Repositories, custom properties and rate limit.

use mcpscan_core::PropertyMap;
use serde_json::Value;
use url::Url;

use super::GitHubClient;
use crate::error::{GitHubError, GitHubResult};
use crate::http::{HttpBackend, HttpMethod};
use crate::models::{
    ApiPropertiesUpdate, ApiPropertyValue, ApiRate, ApiRateLimit, ApiRepository,
    ApiRepositoryProperties,
};
use crate::url::{
    build_org_forks_url, build_org_properties_url, build_rate_limit_url, build_repo_properties_url,
    build_repo_url,
};

impl<B: HttpBackend> GitHubClient<B> {
    /// All forked repositories of `org`.
    pub(crate) async fn list_org_forks(&self, org: &str) -> GitHubResult<Vec<ApiRepository>> {
        let url = build_org_forks_url(&self.config, org);
        let repos: Vec<ApiRepository> = self.get_all_pages(url).await?;
        let forks: Vec<_> = repos.into_iter().filter(|repo| repo.fork).collect();
        tracing::info!(org, count = forks.len(), "Listed forked repositories");
        Ok(forks)
    }

    /// Custom property values of every repository in `org`.
    pub(crate) async fn list_org_properties(
        &self,
        org: &str,
    ) -> GitHubResult<Vec<ApiRepositoryProperties>> {
        let url = build_org_properties_url(&self.config, org);
        let values: Vec<ApiRepositoryProperties> = self.get_all_pages(url).await?;
        tracing::info!(org, count = values.len(), "Loaded repository properties");
        Ok(values)
    }

    pub(crate) async fn get_repository_properties(
        &self,
        owner: &str,
        repo: &str,
    ) -> GitHubResult<Vec<ApiPropertyValue>> {
        let url = build_repo_properties_url(&self.config, owner, repo);
        self.backend.get_json(&url).await
    }

    /// Create or update property values. Values are always sent as strings.
    pub(crate) async fn update_repository_properties(
        &self,
        owner: &str,
        repo: &str,
        properties: &PropertyMap,
    ) -> GitHubResult<()> {
        let update = ApiPropertiesUpdate {
            properties: properties
                .iter()
                .map(|(name, value)| ApiPropertyValue {
                    property_name: name.clone(),
                    value: Some(Value::String(value.clone())),
                })
                .collect(),
        };
        let body = serde_json::to_value(&update)?;
        let url = build_repo_properties_url(&self.config, owner, repo);

        match self.backend.send_json(HttpMethod::Patch, &url, &body).await {
            Ok(_) => {
                tracing::info!(
                    repo = %format!("{owner}/{repo}"),
                    count = properties.len(),
                    "Updated custom properties"
                );
                Ok(())
            }
            Err(e) => {
                if e.status() == Some(422) {
                    tracing::error!(
                        repo = %format!("{owner}/{repo}"),
                        properties = ?properties.keys().collect::<Vec<_>>(),
                        "Property update rejected; the properties must exist at the organization level"
                    );
                }
                Err(e)
            }
        }
    }

    /// Single repository, `None` when it does not exist.
    pub(crate) async fn get_repository(
        &self,
        owner: &str,
        repo: &str,
    ) -> GitHubResult<Option<ApiRepository>> {
        let url = build_repo_url(&self.config, owner, repo);
        match self.backend.get_json(&url).await {
            Ok(repository) => Ok(Some(repository)),
            Err(GitHubError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Core API quota.
    pub(crate) async fn rate_limit(&self) -> GitHubResult<ApiRate> {
        let url = build_rate_limit_url(&self.config);
        let limits: ApiRateLimit = self.backend.get_json(&url).await?;
        Ok(limits.resources.core)
    }

    /// Text document at an arbitrary URL, such as a catalog README.
    /// Invalid UTF-8 is replaced rather than rejected.
    pub(crate) async fn fetch_document(&self, url: &str) -> GitHubResult<String> {
        let url = Url::parse(url)?;
        let bytes = self.backend.get_bytes(&url).await?;
        tracing::debug!(url = %url, bytes = bytes.len(), "Fetched document");
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::test_config;
    use crate::http::testing::{CannedResponse, FakeBackend};
    use serde_json::json;

    fn repo_json(name: &str, fork: bool) -> Value {
        json!({
            "name": name,
            "full_name": format!("mcp-research/{name}"),
            "owner": {"login": "mcp-research"},
            "fork": fork,
            "default_branch": "main"
        })
    }

    #[tokio::test]
    async fn test_list_org_forks_filters_non_forks() {
        let backend = FakeBackend::new()
            .with_response(
                "type=forks",
                CannedResponse::json(json!([repo_json("a__one", true), repo_json("scans", false)]))
                    .with_next("https://api.github.com/orgs/mcp-research/repos?page=2"),
            )
            .with_response(
                "repos?page=2",
                CannedResponse::json(json!([repo_json("b__two", true)])),
            );
        let client = GitHubClient::with_backend(test_config(), backend);

        let forks = client.list_org_forks("mcp-research").await.unwrap();
        let names: Vec<_> = forks.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["a__one", "b__two"]);
    }

    #[tokio::test]
    async fn test_update_properties_sends_strings() {
        let client = GitHubClient::with_backend(test_config(), FakeBackend::new());
        let properties = PropertyMap::from([
            ("CodeAlerts".to_string(), "3".to_string()),
            ("MCP_Server_Runtime".to_string(), "npx".to_string()),
        ]);

        client
            .update_repository_properties("mcp-research", "a__one", &properties)
            .await
            .unwrap();

        let sent = client.backend.sent();
        assert_eq!(sent[0].method, HttpMethod::Patch);
        assert!(sent[0].url.ends_with("/repos/mcp-research/a__one/properties/values"));
        assert_eq!(
            sent[0].body,
            json!({"properties": [
                {"property_name": "CodeAlerts", "value": "3"},
                {"property_name": "MCP_Server_Runtime", "value": "npx"}
            ]})
        );
    }

    #[tokio::test]
    async fn test_update_properties_rejected() {
        let backend = FakeBackend::new()
            .with_response("properties/values", CannedResponse::status(422));
        let client = GitHubClient::with_backend(test_config(), backend);

        let err = client
            .update_repository_properties("o", "r", &PropertyMap::new())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(422));
    }

    #[tokio::test]
    async fn test_get_repository_missing_is_none() {
        let client = GitHubClient::with_backend(test_config(), FakeBackend::new());
        assert!(client.get_repository("o", "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rate_limit() {
        let backend = FakeBackend::new().with_response(
            "rate_limit",
            CannedResponse::json(json!({
                "resources": {
                    "core": {"limit": 5000, "remaining": 4990, "used": 10, "reset": 1_750_000_000},
                    "search": {"limit": 30, "remaining": 30, "used": 0, "reset": 1_750_000_000}
                },
                "rate": {"limit": 5000, "remaining": 4990, "used": 10, "reset": 1_750_000_000}
            })),
        );
        let client = GitHubClient::with_backend(test_config(), backend);

        let rate = client.rate_limit().await.unwrap();
        assert_eq!(rate.limit, 5000);
        assert_eq!(rate.remaining, 4990);
        assert_eq!(rate.reset, 1_750_000_000);
    }

    #[tokio::test]
    async fn test_fetch_document() {
        let backend = FakeBackend::new().with_bytes(
            "awesome-mcp-servers/main/README.md",
            Ok(b"- [tool](https://github.com/acme/tool)\n".to_vec()),
        );
        let client = GitHubClient::with_backend(test_config(), backend);

        let text = client
            .fetch_document("https://raw.githubusercontent.com/punkpeye/awesome-mcp-servers/main/README.md")
            .await
            .unwrap();
        assert_eq!(text, "- [tool](https://github.com/acme/tool)\n");
    }

    #[tokio::test]
    async fn test_fetch_document_rejects_bad_url() {
        let client = GitHubClient::with_backend(test_config(), FakeBackend::new());
        let err = client.fetch_document("not a url").await.unwrap_err();
        assert!(matches!(err, GitHubError::InvalidUrl(_)));
        assert!(client.backend.sent().is_empty());
    }
}
