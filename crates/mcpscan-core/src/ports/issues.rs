//! Issue tracker port.

use async_trait::async_trait;

use super::GitHubPortResult;
use crate::domain::NewIssue;

#[async_trait]
pub trait IssueTrackerPort: Send + Sync {
    /// Whether an open issue whose title contains `title_query` exists in `owner/repo`.
    async fn has_open_issue(
        &self,
        owner: &str,
        repo: &str,
        title_query: &str,
    ) -> GitHubPortResult<bool>;

    /// File a new issue; returns its number.
    async fn create_issue(&self, owner: &str, repo: &str, issue: &NewIssue)
    -> GitHubPortResult<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn _assert_object_safe(_: Arc<dyn IssueTrackerPort>) {}
}
