use mcpscan_core::NewIssue;
use serde_json::json;

use super::GitHubClient;
use crate::error::{GitHubError, GitHubResult};
use crate::http::{HttpBackend, HttpMethod};
use crate::models::{ApiIssue, ApiSearchResult};
use crate::url::{build_issue_search_url, build_issues_url};

impl<B: HttpBackend> GitHubClient<B> {
    /// Whether an open issue whose title contains `title_query` exists.
    pub(crate) async fn has_open_issue(
        &self,
        owner: &str,
        repo: &str,
        title_query: &str,
    ) -> GitHubResult<bool> {
        let url = build_issue_search_url(&self.config, owner, repo, title_query);
        let result: ApiSearchResult = self.backend.get_json(&url).await?;
        Ok(result.total_count > 0)
    }

    /// Open an issue and return its number.
    pub(crate) async fn create_issue(
        &self,
        owner: &str,
        repo: &str,
        issue: &NewIssue,
    ) -> GitHubResult<u64> {
        let url = build_issues_url(&self.config, owner, repo);
        let body = json!({
            "title": issue.title,
            "body": issue.body,
            "labels": issue.labels,
        });
        let response = self.backend.send_json(HttpMethod::Post, &url, &body).await?;
        let created: ApiIssue =
            serde_json::from_value(response).map_err(|e| GitHubError::InvalidResponse {
                message: format!("issue creation response: {e}"),
            })?;
        tracing::info!(repo = %format!("{owner}/{repo}"), number = created.number, "Issue created");
        Ok(created.number)
    }
}
