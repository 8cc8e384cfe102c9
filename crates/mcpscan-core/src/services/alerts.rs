//! GHAS alert aggregation and the per-repository alert scan.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ServiceError;
use super::schedule::should_scan;
use crate::domain::{
    CodeScanningAlert, DependabotAlert, PropertyMap, RepositoryProperties, RepositorySummary,
    SecretScanningAlert,
};
use crate::ports::{AlertSourcePort, GitHubPortResult, RepositoryMetadataPort};
use crate::properties::{
    CODE_ALERTS, CODE_ALERTS_CRITICAL, CODE_ALERTS_HIGH, CODE_ALERTS_LOW, CODE_ALERTS_MEDIUM,
    DEPENDENCY_ALERTS, DEPENDENCY_ALERTS_CRITICAL, DEPENDENCY_ALERTS_HIGH, DEPENDENCY_ALERTS_LOW,
    DEPENDENCY_ALERTS_MODERATE, GHAS_STATUS_UPDATED, SCAN_FREQUENCY_DAYS, SECRET_ALERTS,
    SECRET_ALERTS_BY_TYPE, SECRET_ALERTS_TOTAL,
};

// ============================================================================
// Severity mapping
// ============================================================================

/// Buckets code scanning alerts are counted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeSeverity {
    Critical,
    High,
    Medium,
    Low,
}

/// Maps a lowercase rule severity to a [`CodeSeverity`] bucket.
///
/// Severities without an entry are counted only in the total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeverityMapping {
    buckets: BTreeMap<String, CodeSeverity>,
}

impl Default for SeverityMapping {
    /// Identity for `critical/high/medium/low`, plus `warning` and `note`
    /// as low and `error` as medium.
    fn default() -> Self {
        Self::from_pairs([
            ("critical", CodeSeverity::Critical),
            ("high", CodeSeverity::High),
            ("medium", CodeSeverity::Medium),
            ("low", CodeSeverity::Low),
            ("error", CodeSeverity::Medium),
            ("warning", CodeSeverity::Low),
            ("note", CodeSeverity::Low),
        ])
    }
}

impl SeverityMapping {
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, CodeSeverity)>) -> Self {
        Self {
            buckets: pairs
                .into_iter()
                .map(|(severity, bucket)| (severity.to_ascii_lowercase(), bucket))
                .collect(),
        }
    }

    /// Load a JSON object such as `{"error": "high", "warning": "medium"}`.
    ///
    /// The file replaces the default mapping entirely.
    pub fn from_json_file(path: &Path) -> Result<Self, ServiceError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ServiceError::io(path, e))?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ServiceError> {
        let parsed: BTreeMap<String, CodeSeverity> =
            serde_json::from_str(raw).map_err(|e| ServiceError::SeverityMapping(e.to_string()))?;
        Ok(Self::from_pairs(
            parsed.iter().map(|(severity, bucket)| (severity.as_str(), *bucket)),
        ))
    }

    pub fn bucket(&self, severity: &str) -> Option<CodeSeverity> {
        self.buckets.get(&severity.to_ascii_lowercase()).copied()
    }
}

// ============================================================================
// Counts
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeAlertCounts {
    pub total: u64,
    pub critical: u64,
    pub high: u64,
    pub medium: u64,
    pub low: u64,
}

impl CodeAlertCounts {
    pub fn tally(alerts: &[CodeScanningAlert], mapping: &SeverityMapping) -> Self {
        let mut counts = Self {
            total: alerts.len() as u64,
            ..Self::default()
        };
        for alert in alerts {
            let bucket = alert
                .rule_severity
                .as_deref()
                .and_then(|severity| mapping.bucket(severity));
            match bucket {
                Some(CodeSeverity::Critical) => counts.critical += 1,
                Some(CodeSeverity::High) => counts.high += 1,
                Some(CodeSeverity::Medium) => counts.medium += 1,
                Some(CodeSeverity::Low) => counts.low += 1,
                None => {}
            }
        }
        counts
    }

    pub fn add(&mut self, other: &Self) {
        self.total += other.total;
        self.critical += other.critical;
        self.high += other.high;
        self.medium += other.medium;
        self.low += other.low;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyAlertCounts {
    pub total: u64,
    pub critical: u64,
    pub high: u64,
    pub moderate: u64,
    pub low: u64,
}

impl DependencyAlertCounts {
    /// `moderate` and `medium` both land in the moderate bucket.
    pub fn tally(alerts: &[DependabotAlert]) -> Self {
        let mut counts = Self {
            total: alerts.len() as u64,
            ..Self::default()
        };
        for alert in alerts {
            let severity = alert
                .severity
                .as_deref()
                .map(str::to_ascii_lowercase)
                .unwrap_or_default();
            match severity.as_str() {
                "critical" => counts.critical += 1,
                "high" => counts.high += 1,
                "moderate" | "medium" => counts.moderate += 1,
                "low" => counts.low += 1,
                _ => {}
            }
        }
        counts
    }

    pub fn add(&mut self, other: &Self) {
        self.total += other.total;
        self.critical += other.critical;
        self.high += other.high;
        self.moderate += other.moderate;
        self.low += other.low;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretAlertCounts {
    pub total: u64,
    pub by_type: BTreeMap<String, u64>,
}

impl SecretAlertCounts {
    pub fn tally(alerts: &[SecretScanningAlert]) -> Self {
        let mut by_type = BTreeMap::new();
        for alert in alerts {
            *by_type.entry(alert.type_label().to_string()).or_insert(0) += 1;
        }
        Self {
            total: alerts.len() as u64,
            by_type,
        }
    }

    /// JSON object string stored in `SecretAlerts_By_Type`.
    pub fn by_type_json(&self) -> String {
        serde_json::to_string(&self.by_type).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Alert counts gathered for one repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSummary {
    pub code: CodeAlertCounts,
    pub secret: SecretAlertCounts,
    pub dependency: DependencyAlertCounts,
}

impl AlertSummary {
    pub const fn total(&self) -> u64 {
        self.code.total + self.secret.total + self.dependency.total
    }

    /// Property values written after a scan, including the scan timestamp.
    pub fn to_properties(&self, scanned_at: DateTime<Utc>) -> PropertyMap {
        let mut props = PropertyMap::new();
        let mut set = |name: &str, value: String| {
            props.insert(name.to_string(), value);
        };

        set(CODE_ALERTS, self.code.total.to_string());
        set(SECRET_ALERTS, self.secret.total.to_string());
        set(DEPENDENCY_ALERTS, self.dependency.total.to_string());

        set(CODE_ALERTS_CRITICAL, self.code.critical.to_string());
        set(CODE_ALERTS_HIGH, self.code.high.to_string());
        set(CODE_ALERTS_MEDIUM, self.code.medium.to_string());
        set(CODE_ALERTS_LOW, self.code.low.to_string());

        set(SECRET_ALERTS_TOTAL, self.secret.total.to_string());
        set(SECRET_ALERTS_BY_TYPE, self.secret.by_type_json());

        set(DEPENDENCY_ALERTS_CRITICAL, self.dependency.critical.to_string());
        set(DEPENDENCY_ALERTS_HIGH, self.dependency.high.to_string());
        set(DEPENDENCY_ALERTS_MODERATE, self.dependency.moderate.to_string());
        set(DEPENDENCY_ALERTS_LOW, self.dependency.low.to_string());

        set(GHAS_STATUS_UPDATED, scanned_at.to_rfc3339());
        props
    }
}

// ============================================================================
// Service
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotAFork,
    RecentlyScanned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertScanOutcome {
    Skipped(SkipReason),
    Scanned(AlertSummary),
}

/// Gathers open alerts for a fork and records the counts as properties.
pub struct AlertScanService {
    metadata: Arc<dyn RepositoryMetadataPort>,
    alerts: Arc<dyn AlertSourcePort>,
    severity: SeverityMapping,
    days_threshold: i64,
}

impl AlertScanService {
    pub fn new(metadata: Arc<dyn RepositoryMetadataPort>, alerts: Arc<dyn AlertSourcePort>) -> Self {
        Self {
            metadata,
            alerts,
            severity: SeverityMapping::default(),
            days_threshold: SCAN_FREQUENCY_DAYS,
        }
    }

    #[must_use]
    pub fn with_severity_mapping(mut self, severity: SeverityMapping) -> Self {
        self.severity = severity;
        self
    }

    #[must_use]
    pub const fn with_days_threshold(mut self, days: i64) -> Self {
        self.days_threshold = days;
        self
    }

    /// Scan `repo` unless it is not a fork or was scanned recently.
    ///
    /// `cached` is the org-wide property listing; a repository missing from it
    /// is looked up individually.
    pub async fn scan(
        &self,
        repo: &RepositorySummary,
        cached: &[RepositoryProperties],
    ) -> Result<AlertScanOutcome, ServiceError> {
        self.scan_at(repo, cached, Utc::now()).await
    }

    pub async fn scan_at(
        &self,
        repo: &RepositorySummary,
        cached: &[RepositoryProperties],
        now: DateTime<Utc>,
    ) -> Result<AlertScanOutcome, ServiceError> {
        if !repo.fork {
            tracing::info!(repo = %repo.full_name, "Repository is not a fork, skipping");
            return Ok(AlertScanOutcome::Skipped(SkipReason::NotAFork));
        }

        let properties = self.current_properties(repo, cached).await;
        if !should_scan(&properties, GHAS_STATUS_UPDATED, self.days_threshold, now) {
            return Ok(AlertScanOutcome::Skipped(SkipReason::RecentlyScanned));
        }

        tracing::info!(repo = %repo.full_name, "Scanning repository for GHAS alerts");
        let owner = repo.owner.as_str();
        let name = repo.name.as_str();

        let code = or_empty(self.alerts.code_scanning_alerts(owner, name).await, repo, "code scanning");
        let secret = or_empty(self.alerts.secret_scanning_alerts(owner, name).await, repo, "secret scanning");
        let dependency = or_empty(self.alerts.dependabot_alerts(owner, name).await, repo, "dependabot");

        let summary = AlertSummary {
            code: CodeAlertCounts::tally(&code, &self.severity),
            secret: SecretAlertCounts::tally(&secret),
            dependency: DependencyAlertCounts::tally(&dependency),
        };

        tracing::info!(
            repo = %repo.full_name,
            code = summary.code.total,
            code_critical = summary.code.critical,
            code_high = summary.code.high,
            code_medium = summary.code.medium,
            code_low = summary.code.low,
            secret = summary.secret.total,
            dependency = summary.dependency.total,
            dependency_critical = summary.dependency.critical,
            dependency_high = summary.dependency.high,
            dependency_moderate = summary.dependency.moderate,
            dependency_low = summary.dependency.low,
            "Open alerts"
        );

        self.metadata
            .update_repository_properties(owner, name, &summary.to_properties(now))
            .await?;
        tracing::info!(repo = %repo.full_name, "Updated GHAS alert properties");

        Ok(AlertScanOutcome::Scanned(summary))
    }

    async fn current_properties(
        &self,
        repo: &RepositorySummary,
        cached: &[RepositoryProperties],
    ) -> PropertyMap {
        if let Some(entry) = cached
            .iter()
            .find(|entry| entry.repository_full_name == repo.full_name)
        {
            if !entry.properties.is_empty() {
                return entry.properties.clone();
            }
        }

        match self
            .metadata
            .get_repository_properties(&repo.owner, &repo.name)
            .await
        {
            Ok(properties) => properties,
            Err(e) => {
                tracing::warn!(repo = %repo.full_name, error = %e, "Error retrieving properties");
                PropertyMap::new()
            }
        }
    }
}

/// A failed alert listing counts as no alerts; the failure is logged.
fn or_empty<T>(result: GitHubPortResult<Vec<T>>, repo: &RepositorySummary, kind: &str) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::error!(repo = %repo.full_name, kind, error = %e, "Error listing alerts");
        Vec::new()
    })
}
