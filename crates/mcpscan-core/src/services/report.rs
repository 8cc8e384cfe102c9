//! Organization-wide aggregation of the persisted scan properties.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::alerts::{CodeAlertCounts, DependencyAlertCounts};
use super::schedule::parse_timestamp;
use crate::domain::{PropertyMap, RepositoryProperties};
use crate::properties::{
    CODE_ALERTS, CODE_ALERTS_CRITICAL, CODE_ALERTS_HIGH, CODE_ALERTS_LOW, CODE_ALERTS_MEDIUM,
    DEPENDENCY_ALERTS, DEPENDENCY_ALERTS_CRITICAL, DEPENDENCY_ALERTS_HIGH, DEPENDENCY_ALERTS_LOW,
    DEPENDENCY_ALERTS_MODERATE, GHAS_STATUS_UPDATED, MCP_SERVER_RUNTIME, SECRET_ALERTS,
    SECRET_ALERTS_BY_TYPE,
};

/// Alert counts of all repositories scanned on one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DailyAlerts {
    pub code: u64,
    pub secret: u64,
    pub dependency: u64,
    pub total: u64,
    pub code_critical: u64,
    pub code_high: u64,
    pub code_medium: u64,
    pub code_low: u64,
    pub dependency_critical: u64,
    pub dependency_high: u64,
    pub dependency_moderate: u64,
    pub dependency_low: u64,
}

/// One repository with at least one open alert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepositoryAlertRow {
    pub code: u64,
    pub secret: u64,
    pub dependency: u64,
    pub total: u64,
    pub scan_date: String,
    pub code_critical: u64,
    pub code_high: u64,
    pub code_medium: u64,
    pub code_low: u64,
    pub dep_critical: u64,
    pub dep_high: u64,
    pub dep_moderate: u64,
    pub dep_low: u64,
}

impl RepositoryAlertRow {
    pub const fn critical(&self) -> u64 {
        self.code_critical + self.dep_critical
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportStats {
    pub organization: String,
    pub total_repositories: usize,
    /// Repositories carrying a scan timestamp
    pub scanned_repositories: usize,
    pub repos_with_alerts: usize,
    pub total_code_alerts: u64,
    pub total_secret_alerts: u64,
    pub total_dependency_alerts: u64,
    pub total_alerts: u64,
    pub code_alerts_by_severity: CodeAlertCounts,
    pub dependency_alerts_by_severity: DependencyAlertCounts,
    pub secret_alerts_by_type: BTreeMap<String, u64>,
    /// Keyed by scan date, `YYYY-MM-DD`
    pub alerts_by_date: BTreeMap<String, DailyAlerts>,
    /// Keyed by `org/repo`
    pub repos_alerts: BTreeMap<String, RepositoryAlertRow>,
    /// Scanned repositories per `MCP_Server_Runtime` value
    pub runtime_types: BTreeMap<String, u64>,
    pub unknown_runtime_repos: Vec<String>,
    pub report_date: String,
}

impl ReportStats {
    /// Percentage of repositories that have been scanned.
    #[allow(clippy::cast_precision_loss)]
    pub fn scan_coverage(&self) -> f64 {
        if self.total_repositories == 0 {
            return 0.0;
        }
        self.scanned_repositories as f64 / self.total_repositories as f64 * 100.0
    }

    /// Repositories with the most alerts, highest first.
    pub fn top_by_total(&self, n: usize) -> Vec<(&str, &RepositoryAlertRow)> {
        let mut rows: Vec<_> = self
            .repos_alerts
            .iter()
            .map(|(name, row)| (name.as_str(), row))
            .collect();
        rows.sort_by(|a, b| b.1.total.cmp(&a.1.total).then_with(|| a.0.cmp(b.0)));
        rows.truncate(n);
        rows
    }

    /// Repositories with critical code or dependency alerts, most critical first.
    pub fn top_by_critical(&self, n: usize) -> Vec<(&str, &RepositoryAlertRow)> {
        let mut rows: Vec<_> = self
            .repos_alerts
            .iter()
            .filter(|(_, row)| row.critical() > 0)
            .map(|(name, row)| (name.as_str(), row))
            .collect();
        rows.sort_by(|a, b| {
            b.1.critical()
                .cmp(&a.1.critical())
                .then_with(|| a.0.cmp(b.0))
        });
        rows.truncate(n);
        rows
    }
}

/// Aggregate the property listing of `org` into report statistics.
pub fn build_report(org: &str, repositories: &[RepositoryProperties], now: DateTime<Utc>) -> ReportStats {
    let mut stats = ReportStats {
        organization: org.to_string(),
        total_repositories: repositories.len(),
        scanned_repositories: 0,
        repos_with_alerts: 0,
        total_code_alerts: 0,
        total_secret_alerts: 0,
        total_dependency_alerts: 0,
        total_alerts: 0,
        code_alerts_by_severity: CodeAlertCounts::default(),
        dependency_alerts_by_severity: DependencyAlertCounts::default(),
        secret_alerts_by_type: BTreeMap::new(),
        alerts_by_date: BTreeMap::new(),
        repos_alerts: BTreeMap::new(),
        runtime_types: BTreeMap::new(),
        unknown_runtime_repos: Vec::new(),
        report_date: now.to_rfc3339(),
    };

    for repo in repositories {
        let props = &repo.properties;
        let Some(scan_date) = props.get(GHAS_STATUS_UPDATED) else {
            continue;
        };
        stats.scanned_repositories += 1;
        let full_name = format!("{org}/{}", repo.repository_name);

        let row = RepositoryAlertRow {
            code: count(props, CODE_ALERTS),
            secret: count(props, SECRET_ALERTS),
            dependency: count(props, DEPENDENCY_ALERTS),
            total: 0,
            scan_date: scan_date.clone(),
            code_critical: count(props, CODE_ALERTS_CRITICAL),
            code_high: count(props, CODE_ALERTS_HIGH),
            code_medium: count(props, CODE_ALERTS_MEDIUM),
            code_low: count(props, CODE_ALERTS_LOW),
            dep_critical: count(props, DEPENDENCY_ALERTS_CRITICAL),
            dep_high: count(props, DEPENDENCY_ALERTS_HIGH),
            dep_moderate: count(props, DEPENDENCY_ALERTS_MODERATE),
            dep_low: count(props, DEPENDENCY_ALERTS_LOW),
        };
        let row = RepositoryAlertRow {
            total: row.code + row.secret + row.dependency,
            ..row
        };

        add_secret_types(&mut stats.secret_alerts_by_type, props, &full_name);

        stats.total_code_alerts += row.code;
        stats.total_secret_alerts += row.secret;
        stats.total_dependency_alerts += row.dependency;

        let code = &mut stats.code_alerts_by_severity;
        code.critical += row.code_critical;
        code.high += row.code_high;
        code.medium += row.code_medium;
        code.low += row.code_low;
        code.total += row.code;

        let dependency = &mut stats.dependency_alerts_by_severity;
        dependency.critical += row.dep_critical;
        dependency.high += row.dep_high;
        dependency.moderate += row.dep_moderate;
        dependency.low += row.dep_low;
        dependency.total += row.dependency;

        if let Some(scanned_at) = parse_timestamp(scan_date) {
            let day = stats
                .alerts_by_date
                .entry(scanned_at.format("%Y-%m-%d").to_string())
                .or_default();
            day.code += row.code;
            day.secret += row.secret;
            day.dependency += row.dependency;
            day.total += row.total;
            day.code_critical += row.code_critical;
            day.code_high += row.code_high;
            day.code_medium += row.code_medium;
            day.code_low += row.code_low;
            day.dependency_critical += row.dep_critical;
            day.dependency_high += row.dep_high;
            day.dependency_moderate += row.dep_moderate;
            day.dependency_low += row.dep_low;
        }

        let runtime = props
            .get(MCP_SERVER_RUNTIME)
            .map(|value| value.trim().to_ascii_lowercase())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| "unknown".to_string());
        if runtime == "unknown" {
            stats.unknown_runtime_repos.push(full_name.clone());
        }
        *stats.runtime_types.entry(runtime).or_default() += 1;

        if row.total > 0 {
            stats.repos_with_alerts += 1;
            stats.repos_alerts.insert(full_name, row);
        }
    }

    stats.total_alerts =
        stats.total_code_alerts + stats.total_secret_alerts + stats.total_dependency_alerts;

    tracing::info!(
        org,
        total = stats.total_repositories,
        scanned = stats.scanned_repositories,
        with_alerts = stats.repos_with_alerts,
        "Built GHAS report"
    );
    stats
}

fn count(props: &PropertyMap, name: &str) -> u64 {
    props.get(name).map_or(0, |value| to_count(value))
}

fn to_count(value: &str) -> u64 {
    value.trim().parse().unwrap_or(0)
}

fn add_secret_types(totals: &mut BTreeMap<String, u64>, props: &PropertyMap, repo: &str) {
    let Some(raw) = props.get(SECRET_ALERTS_BY_TYPE).filter(|raw| !raw.is_empty()) else {
        return;
    };
    let types = match serde_json::from_str::<serde_json::Map<String, Value>>(raw) {
        Ok(types) => types,
        Err(e) => {
            tracing::warn!(repo, value = %raw, error = %e, "Could not parse secret types JSON");
            return;
        }
    };
    for (secret_type, value) in types {
        let n = match &value {
            Value::Number(n) => n.as_u64().unwrap_or(0),
            Value::String(s) => to_count(s),
            _ => 0,
        };
        *totals.entry(secret_type).or_default() += n;
    }
}
