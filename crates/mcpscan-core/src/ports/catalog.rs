//! External catalog port.

use async_trait::async_trait;

use super::GitHubPortResult;

/// Published documents listing MCP servers, such as an awesome-list README.
#[async_trait]
pub trait CatalogSourcePort: Send + Sync {
    /// Body of the document at `url`, decoded as text.
    async fn fetch_document(&self, url: &str) -> GitHubPortResult<String>;
}
