//! End-of-run summary for `mcpscan scan`.

use std::collections::BTreeMap;
use std::time::Duration;

use mcpscan_core::{AlertSummary, CodeAlertCounts, DependencyAlertCounts};

use super::markdown::{format_duration, table_row};

/// A repository whose composition could not be analyzed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedAnalysis {
    pub repository: String,
    /// Basename of the offending file, when known.
    pub file: Option<String>,
    pub reason: String,
}

/// Counters accumulated over one scan run.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    pub organization: String,
    pub scan_limit: usize,
    pub total_repositories: usize,
    pub scanned: usize,
    pub skipped: usize,
    pub code: CodeAlertCounts,
    pub secret_total: u64,
    pub dependency: DependencyAlertCounts,
    /// Detected runtime (`uv`, `npx`, `unknown`) to repository count.
    pub runtimes: BTreeMap<String, u64>,
    pub failures: Vec<FailedAnalysis>,
    pub elapsed: Duration,
}

impl ScanSummary {
    pub fn new(organization: impl Into<String>, scan_limit: usize) -> Self {
        Self {
            organization: organization.into(),
            scan_limit,
            ..Self::default()
        }
    }

    /// Fold one repository's alert counts into the totals.
    pub fn record_alerts(&mut self, summary: &AlertSummary) {
        self.scanned += 1;
        self.code.add(&summary.code);
        self.secret_total += summary.secret.total;
        self.dependency.add(&summary.dependency);
    }

    pub fn record_runtime(&mut self, runtime: &str) {
        *self.runtimes.entry(runtime.to_string()).or_default() += 1;
    }

    pub const fn processed(&self) -> usize {
        self.scanned + self.skipped
    }

    pub const fn total_alerts(&self) -> u64 {
        self.code.total + self.secret_total + self.dependency.total
    }

    /// Markdown lines, title first.
    pub fn to_markdown_lines(&self) -> Vec<String> {
        let mut lines = vec![
            "**GHAS Alert Scanning Summary**".to_string(),
            "Security Scan Results".to_string(),
            format!("- Organization: `{}`", self.organization),
            format!("- Scan limit (--num-repos): `{}`", self.scan_limit),
            format!("- Total repositories in organization: `{}`", self.total_repositories),
            format!("- Repositories processed: `{}`", self.processed()),
            format!("- Repositories scanned: `{}`", self.scanned),
            format!(
                "- Repositories skipped (not forks or recently scanned): `{}`",
                self.skipped
            ),
            format!("- Total code scanning alerts found: `{}`", self.code.total),
            format!("- Total secret scanning alerts found: `{}`", self.secret_total),
            format!(
                "- Total dependency vulnerability alerts found: `{}`",
                self.dependency.total
            ),
            format!(
                "- Total GHAS alerts across all scanned repos: `{}`",
                self.total_alerts()
            ),
            String::new(),
            "**Code Scanning Alerts by Severity**".to_string(),
            format!("- Critical: `{}`", self.code.critical),
            format!("- High: `{}`", self.code.high),
            format!("- Medium: `{}`", self.code.medium),
            format!("- Low: `{}`", self.code.low),
            String::new(),
            "**Dependency Scanning Alerts by Severity**".to_string(),
            format!("- Critical: `{}`", self.dependency.critical),
            format!("- High: `{}`", self.dependency.high),
            format!("- Moderate: `{}`", self.dependency.moderate),
            format!("- Low: `{}`", self.dependency.low),
            String::new(),
        ];

        if !self.runtimes.is_empty() {
            lines.push("**MCP Server Runtimes**".to_string());
            lines.extend(
                self.runtimes
                    .iter()
                    .map(|(runtime, count)| format!("- {runtime}: `{count}`")),
            );
            lines.push(String::new());
        }

        lines.push(format!(
            "- Total execution time: `{}`",
            format_duration(self.elapsed)
        ));
        lines.push(format!(
            "- Failed analysis repositories: `{}`",
            self.failures.len()
        ));

        if !self.failures.is_empty() {
            lines.push(String::new());
            lines.push("**Failed Analysis Repositories**".to_string());
            lines.push(String::new());
            lines.push("| Repository | File | Reason |".to_string());
            lines.push("| ---------- | ---- | ------ |".to_string());
            for failure in &self.failures {
                // Pipes would split the cell
                let reason = failure.reason.replace('|', "\\|");
                lines.push(table_row(&[
                    failure.repository.as_str(),
                    failure.file.as_deref().unwrap_or("-"),
                    reason.as_str(),
                ]));
            }
        }

        lines
    }

    pub fn to_markdown(&self) -> String {
        self.to_markdown_lines().join("\n")
    }
}
