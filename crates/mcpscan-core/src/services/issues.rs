//! Deduplicated analysis-failure issues.

use std::sync::Arc;

use crate::domain::NewIssue;
use crate::ports::{GitHubPortResult, IssueTrackerPort};
use crate::scan::ScanError;

pub const ANALYSIS_FAILURE_LABEL: &str = "analysis-failure";

/// Position markers stripped from titles before searching for duplicates,
/// so the same parser failure at a different column matches.
const POSITION_MARKERS: [&str; 2] = [": line ", " at line "];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueOutcome {
    Created(u64),
    AlreadyOpen,
}

/// Files one issue per distinct failure in a fixed issue repository.
pub struct IssueFiler {
    tracker: Arc<dyn IssueTrackerPort>,
    owner: String,
    repo: String,
}

impl IssueFiler {
    pub fn new(
        tracker: Arc<dyn IssueTrackerPort>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self {
            tracker,
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// File an issue for `error` found in `repository`, unless a matching
    /// open issue already exists.
    pub async fn file(&self, repository: &str, error: &ScanError) -> GitHubPortResult<IssueOutcome> {
        let issue = NewIssue {
            title: issue_title(error),
            body: issue_body(repository, error),
            labels: vec![ANALYSIS_FAILURE_LABEL.to_string()],
        };
        let query = dedup_query(&issue.title);

        if self
            .tracker
            .has_open_issue(&self.owner, &self.repo, query)
            .await?
        {
            tracing::info!(title = %issue.title, "Matching issue already open, not filing");
            return Ok(IssueOutcome::AlreadyOpen);
        }

        let number = self
            .tracker
            .create_issue(&self.owner, &self.repo, &issue)
            .await?;
        tracing::info!(number, issue_repo = %self.repo, "Filed analysis-failure issue");
        Ok(IssueOutcome::Created(number))
    }
}

pub fn issue_title(error: &ScanError) -> String {
    format!("Failed analysis: {}", error.error_message)
}

pub fn issue_body(repository: &str, error: &ScanError) -> String {
    let mut body = String::from("# MCP Composition Analysis Failure\n\n");
    body.push_str(&format!("- **Repository**: {repository}\n"));
    if let Some(file) = error.file_basename() {
        body.push_str(&format!("- **File**: {file}\n"));
    }
    body.push_str(&format!("- **Error**: {}\n\n", error.error_message));
    body.push_str("## JSON Configuration\n```json\n");
    body.push_str(error.json_config.as_deref().unwrap_or("Not available"));
    body.push_str("\n```\n");
    body
}

/// Title prefix up to the first parser position marker.
pub fn dedup_query(title: &str) -> &str {
    let cut = POSITION_MARKERS
        .iter()
        .filter_map(|marker| title.find(marker))
        .min()
        .unwrap_or(title.len());
    &title[..cut]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::GitHubPortError;
    use async_trait::async_trait;
    use mockall::mock;
    use mockall::predicate::{eq, function};

    mock! {
        Tracker {}

        #[async_trait]
        impl IssueTrackerPort for Tracker {
            async fn has_open_issue(
                &self,
                owner: &str,
                repo: &str,
                title_query: &str,
            ) -> GitHubPortResult<bool>;

            async fn create_issue(
                &self,
                owner: &str,
                repo: &str,
                issue: &NewIssue,
            ) -> GitHubPortResult<u64>;
        }
    }

    fn parse_error() -> ScanError {
        ScanError::new(
            "Failed to parse MCP composition JSON: expected `,` or `}` at line 1 column 119",
        )
        .with_filename("/tmp/work/repo/README.md")
        .with_json_config("{\"mcpServers\": ...}")
    }

    #[test]
    fn test_dedup_query_drops_position() {
        let title = issue_title(&parse_error());
        assert_eq!(
            dedup_query(&title),
            "Failed analysis: Failed to parse MCP composition JSON: expected `,` or `}`"
        );

        let legacy = "Failed analysis: Failed to parse MCP composition JSON: Expecting ',' delimiter: line 1 column 119 (char 118)";
        let query = dedup_query(legacy);
        assert!(query.contains("Failed to parse MCP composition JSON"));
        assert!(!query.contains("column 119"));

        assert_eq!(dedup_query("Failed analysis: x"), "Failed analysis: x");
    }

    #[test]
    fn test_body_lists_file_and_config() {
        let body = issue_body("acme__tool", &parse_error());
        assert!(body.contains("- **Repository**: acme__tool"));
        assert!(body.contains("- **File**: README.md"));
        assert!(body.contains("```json\n{\"mcpServers\": ...}\n```"));
    }

    #[test]
    fn test_body_without_config() {
        let body = issue_body("acme__tool", &ScanError::new("Empty composition provided"));
        assert!(!body.contains("**File**"));
        assert!(body.contains("Not available"));
    }

    #[tokio::test]
    async fn test_creates_issue_when_none_open() {
        let mut tracker = MockTracker::new();
        tracker
            .expect_has_open_issue()
            .with(
                eq("mcp-research"),
                eq("mcp-security-scans"),
                function(|query: &str| !query.contains("column")),
            )
            .times(1)
            .returning(|_, _, _| Ok(false));
        tracker
            .expect_create_issue()
            .withf(|_, _, issue| {
                issue.labels == vec![ANALYSIS_FAILURE_LABEL.to_string()]
                    && issue.title.starts_with("Failed analysis: ")
            })
            .times(1)
            .returning(|_, _, _| Ok(42));

        let filer = IssueFiler::new(Arc::new(tracker), "mcp-research", "mcp-security-scans");
        let outcome = filer.file("acme__tool", &parse_error()).await.unwrap();
        assert_eq!(outcome, IssueOutcome::Created(42));
    }

    #[tokio::test]
    async fn test_skips_when_already_open() {
        let mut tracker = MockTracker::new();
        tracker
            .expect_has_open_issue()
            .times(1)
            .returning(|_, _, _| Ok(true));
        tracker.expect_create_issue().never();

        let filer = IssueFiler::new(Arc::new(tracker), "mcp-research", "mcp-security-scans");
        let outcome = filer.file("acme__tool", &parse_error()).await.unwrap();
        assert_eq!(outcome, IssueOutcome::AlreadyOpen);
    }

    #[tokio::test]
    async fn test_search_failure_propagates() {
        let mut tracker = MockTracker::new();
        tracker
            .expect_has_open_issue()
            .with(eq("mcp-research"), eq("mcp-security-scans"), eq("Failed analysis: boom"))
            .returning(|_, _, _| Err(GitHubPortError::RateLimited));
        tracker.expect_create_issue().never();

        let filer = IssueFiler::new(Arc::new(tracker), "mcp-research", "mcp-security-scans");
        let err = filer
            .file("acme__tool", &ScanError::new("boom"))
            .await
            .unwrap_err();
        assert!(matches!(err, GitHubPortError::RateLimited));
    }
}
