//! GitHub client.
//!
//! Endpoint groups live in submodules; the core ports are implemented on
//! top of them in `port.rs`.

mod alerts;
mod forks;
mod issues;
mod repos;

use serde::de::DeserializeOwned;
use url::Url;

use crate::config::{
    GitHubClientConfig, MAX_RETRIES, PER_PAGE, RETRY_BASE_DELAY_MS, TIMEOUT_SECS, USER_AGENT,
};
use crate::error::GitHubResult;
use crate::http::{HttpBackend, ReqwestBackend};
use crate::models::ApiConfig;

/// Upper bound on pages fetched from one list endpoint.
const MAX_PAGES: usize = 200;

// ============================================================================
// Type Aliases
// ============================================================================

/// Default GitHub client using the reqwest HTTP backend.
pub type DefaultGitHubClient = GitHubClient<ReqwestBackend>;

// ============================================================================
// Client
// ============================================================================

/// Client for the GitHub REST API.
///
/// Generic over an HTTP backend so tests can inject canned responses. Use
/// [`DefaultGitHubClient`] in production and talk to it through the core
/// ports.
pub struct GitHubClient<B: HttpBackend> {
    pub(crate) backend: B,
    pub(crate) config: ApiConfig,
}

impl DefaultGitHubClient {
    /// Create a client; fails on an invalid base URL or TLS setup error.
    pub fn new(config: &GitHubClientConfig) -> GitHubResult<Self> {
        let internal_config = Self::to_internal_config(config)?;
        let backend = ReqwestBackend::new(&internal_config)?;
        Ok(Self {
            backend,
            config: internal_config,
        })
    }

    fn to_internal_config(config: &GitHubClientConfig) -> GitHubResult<ApiConfig> {
        Ok(ApiConfig {
            base_url: Url::parse(&config.base_url)?,
            user_agent: USER_AGENT.to_string(),
            token: config.token.clone(),
            timeout_secs: TIMEOUT_SECS,
            max_retries: MAX_RETRIES,
            retry_base_delay_ms: RETRY_BASE_DELAY_MS,
            per_page: PER_PAGE,
        })
    }
}

impl<B: HttpBackend> GitHubClient<B> {
    /// Create a client with a custom backend.
    #[cfg(test)]
    pub(crate) const fn with_backend(config: ApiConfig, backend: B) -> Self {
        Self { backend, config }
    }

    /// Fetch every page of a list endpoint, following `Link: rel="next"`.
    pub(crate) async fn get_all_pages<T: DeserializeOwned + Send>(
        &self,
        first: Url,
    ) -> GitHubResult<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(first);
        let mut pages = 0;

        while let Some(url) = next {
            let (page, following): (Vec<T>, Option<Url>) =
                self.backend.get_json_paginated(&url).await?;
            items.extend(page);
            next = following;

            pages += 1;
            if pages >= MAX_PAGES {
                tracing::warn!(url = %url, pages, "Stopping pagination at page limit");
                break;
            }
        }

        Ok(items)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::http::testing::{CannedResponse, FakeBackend};
    use serde_json::json;

    pub fn test_config() -> ApiConfig {
        ApiConfig {
            retry_base_delay_ms: 1,
            ..ApiConfig::default()
        }
    }

    #[test]
    fn test_default_client_creation() {
        let client = DefaultGitHubClient::new(&GitHubClientConfig::new().with_token("t")).unwrap();
        assert_eq!(client.config.base_url.as_str(), "https://api.github.com/");
        assert_eq!(client.config.token.as_deref(), Some("t"));
        assert_eq!(client.config.per_page, 100);
        assert_eq!(client.config.max_retries, 3);
    }

    #[test]
    fn test_invalid_base_url() {
        let result = DefaultGitHubClient::new(&GitHubClientConfig::new().with_base_url("not a url"));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_get_all_pages_follows_links() {
        let backend = FakeBackend::new()
            .with_response(
                "/items?page=1",
                CannedResponse::json(json!([1, 2])).with_next("https://api.github.com/items?page=2"),
            )
            .with_response("/items?page=2", CannedResponse::json(json!([3])));
        let client = GitHubClient::with_backend(test_config(), backend);

        let items: Vec<u32> = client
            .get_all_pages(Url::parse("https://api.github.com/items?page=1").unwrap())
            .await
            .unwrap();
        assert_eq!(items, vec![1, 2, 3]);
        assert_eq!(client.backend.sent().len(), 2);
    }
}
