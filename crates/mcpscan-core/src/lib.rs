//! Core domain types, the configuration-extraction engine and port definitions
//! for mcpscan.
//!
//! The crate is split the same way as every other mcpscan crate expects:
//!
//! - [`scan`] finds and recovers an MCP composition embedded in any text file
//!   of a checked-out repository and classifies its runtime.
//! - [`ports`] defines the traits the orchestration layer needs from the
//!   outside world (GitHub metadata, alerts, archives, forks, issues,
//!   catalogs).
//! - [`services`] orchestrates the ports: alert scans, runtime scans, catalog
//!   forking, issue filing and report aggregation.
//!
//! No HTTP code lives here; the GitHub adapter is `mcpscan-github`.

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod ports;
pub mod properties;
pub mod scan;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::{
    CodeScanningAlert, DependabotAlert, McpComposition, NewIssue, PropertyMap, RateLimitStatus,
    RepositoryDetails, RepositoryProperties, RepositorySummary, RuntimeInfo, SecretScanningAlert,
    ServerSpec, ServerType,
};
pub use ports::{
    AlertSourcePort, CatalogSourcePort, ForkManagerPort, GitHubPortError, GitHubPortResult,
    IssueTrackerPort, MATERIALIZE_ATTEMPTS, RepositoryFetcherPort, RepositoryMetadataPort,
};
pub use scan::{
    BraceMatching, CandidateFile, ScanError, ScanOptions, TextCorpus, detect_runtime,
    find_composition, interpret, locate, parse_lenient, walk,
};
pub use services::{
    AlertScanOutcome, AlertScanService, AlertSummary, CatalogForkService, CatalogSource,
    CodeAlertCounts, CodeSeverity, DependencyAlertCounts, ForkRunSummary, IssueFiler, IssueOutcome, PropertySummary,
    ReportStats, RuntimeScanOutcome, RuntimeScanService, SecretAlertCounts, ServiceError,
    SeverityMapping, SkipReason, build_report, should_scan, summarize_properties,
};

#[cfg(test)]
use mockall as _;
#[cfg(test)]
use tempfile as _;
