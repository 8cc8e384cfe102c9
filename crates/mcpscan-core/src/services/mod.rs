//! Orchestration over the ports.
//!
//! Each service owns `Arc<dyn Port>` handles and is constructed once in the
//! CLI composition root.

mod alerts;
mod error;
mod forker;
mod issues;
mod property_summary;
mod report;
mod runtime;
mod schedule;

pub use alerts::{
    AlertScanOutcome, AlertScanService, AlertSummary, CodeAlertCounts, CodeSeverity,
    DependencyAlertCounts, SecretAlertCounts, SeverityMapping, SkipReason,
};
pub use error::ServiceError;
pub use forker::{
    AWESOME_MCP_SERVERS_README, CatalogForkService, CatalogSource, ForkRunSummary,
    awesome_list_links, fork_name, load_awesome_list, parse_github_url,
};
pub use issues::{ANALYSIS_FAILURE_LABEL, IssueFiler, IssueOutcome, dedup_query, issue_body, issue_title};
pub use property_summary::{
    CommonValue, EXAMPLE_REPOSITORIES, MOST_COMMON_LIMIT, NumericStats, OverallPropertySummary,
    PropertyDetails, PropertySummary, summarize_properties,
};
pub use report::{DailyAlerts, ReportStats, RepositoryAlertRow, build_report};
pub use runtime::{RuntimeScanOutcome, RuntimeScanService};
pub use schedule::{parse_timestamp, should_scan};
