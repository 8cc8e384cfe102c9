//! Organization report rendering.
//!
//! `include_repositories` controls the per-repository tables; they are left
//! out of CI runs where the output is public.

use std::fmt;

use chrono::NaiveDateTime;
use mcpscan_core::ReportStats;

use super::markdown::table_row;

const TOP_REPOSITORIES_MARKDOWN: usize = 10;
const TOP_REPOSITORIES_CONSOLE: usize = 5;

/// Secret types, most frequent first.
fn secret_types_by_count(stats: &ReportStats) -> Vec<(&str, u64)> {
    let mut types: Vec<_> = stats
        .secret_alerts_by_type
        .iter()
        .map(|(name, count)| (name.as_str(), *count))
        .collect();
    types.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    types
}

/// The markdown report written next to the JSON report.
pub fn report_markdown(
    stats: &ReportStats,
    generated_at: NaiveDateTime,
    include_repositories: bool,
) -> String {
    ReportMarkdown {
        stats,
        generated_at,
        include_repositories,
    }
    .to_string()
}

/// Plain-text summary printed after the report files are written.
pub fn console_summary(stats: &ReportStats, include_repositories: bool) -> String {
    ConsoleSummary {
        stats,
        include_repositories,
    }
    .to_string()
}

struct ReportMarkdown<'a> {
    stats: &'a ReportStats,
    generated_at: NaiveDateTime,
    include_repositories: bool,
}

impl fmt::Display for ReportMarkdown<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats;
        writeln!(f, "# GHAS Security Report - {}\n", stats.organization)?;
        writeln!(
            f,
            "*Report generated on: {}*\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        )?;

        f.write_str("## Summary\n\n")?;
        writeln!(f, "- **Organization:** {}", stats.organization)?;
        writeln!(f, "- **Total Repositories:** {}", stats.total_repositories)?;
        writeln!(f, "- **Scanned Repositories:** {}", stats.scanned_repositories)?;
        writeln!(f, "- **Repositories with Alerts:** {}", stats.repos_with_alerts)?;
        writeln!(f, "- **Total Alerts:** {}", stats.total_alerts)?;
        writeln!(f, "  - Code Scanning Alerts: {}", stats.total_code_alerts)?;
        writeln!(f, "  - Secret Scanning Alerts: {}", stats.total_secret_alerts)?;
        writeln!(f, "  - Dependency Alerts: {}\n", stats.total_dependency_alerts)?;

        let code = &stats.code_alerts_by_severity;
        f.write_str("## Code Scanning Alerts by Severity\n\n")?;
        writeln!(f, "- Critical: {}", code.critical)?;
        writeln!(f, "- High: {}", code.high)?;
        writeln!(f, "- Medium: {}", code.medium)?;
        writeln!(f, "- Low: {}\n", code.low)?;

        let dependency = &stats.dependency_alerts_by_severity;
        f.write_str("## Dependency Alerts by Severity\n\n")?;
        writeln!(f, "- Critical: {}", dependency.critical)?;
        writeln!(f, "- High: {}", dependency.high)?;
        writeln!(f, "- Moderate: {}", dependency.moderate)?;
        writeln!(f, "- Low: {}\n", dependency.low)?;

        f.write_str("## Secret Scanning Alerts by Type\n\n")?;
        let secret_types = secret_types_by_count(stats);
        if !secret_types.is_empty() {
            for (name, count) in secret_types {
                writeln!(f, "- {name}: {count}")?;
            }
        } else if stats.total_secret_alerts > 0 {
            f.write_str("Secrets found but types not categorized.\n")?;
        } else {
            f.write_str("No secret scanning alerts found.\n")?;
        }
        writeln!(f)?;

        if !stats.runtime_types.is_empty() {
            f.write_str("## MCP Server Runtimes\n\n")?;
            for (runtime, count) in &stats.runtime_types {
                writeln!(f, "- {runtime}: {count}")?;
            }
            writeln!(f)?;
        }

        if stats.total_repositories > 0 {
            f.write_str("## Coverage\n\n")?;
            writeln!(f, "- **Scan Coverage:** {:.1}%", stats.scan_coverage())?;
        }

        if !self.include_repositories {
            return Ok(());
        }

        f.write_str("\n## Top Repositories with Alerts\n\n")?;
        f.write_str(
            "| Repository | Total Alerts | Code Alerts | Secret Alerts | Dependency Alerts | Last Scanned |\n",
        )?;
        f.write_str(
            "|------------|-------------|------------|--------------|-------------------|-------------|\n",
        )?;
        for (name, row) in stats.top_by_total(TOP_REPOSITORIES_MARKDOWN) {
            writeln!(
                f,
                "{}",
                table_row(&[
                    name.to_string(),
                    row.total.to_string(),
                    row.code.to_string(),
                    row.secret.to_string(),
                    row.dependency.to_string(),
                    row.scan_date.clone(),
                ])
            )?;
        }

        f.write_str("\n## Top Repositories with Critical Alerts\n\n")?;
        f.write_str("| Repository | Critical Code | Critical Dependencies |\n")?;
        f.write_str("|------------|--------------|----------------------|\n")?;
        for (name, row) in stats.top_by_critical(TOP_REPOSITORIES_MARKDOWN) {
            writeln!(
                f,
                "{}",
                table_row(&[
                    name.to_string(),
                    row.code_critical.to_string(),
                    row.dep_critical.to_string(),
                ])
            )?;
        }
        Ok(())
    }
}

struct ConsoleSummary<'a> {
    stats: &'a ReportStats,
    include_repositories: bool,
}

impl fmt::Display for ConsoleSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.stats;
        f.write_str("GHAS Security Report Summary\n")?;
        writeln!(f, "{}", "=".repeat(30))?;
        writeln!(f, "Organization: {}", stats.organization)?;
        writeln!(f, "Total Repositories: {}", stats.total_repositories)?;
        writeln!(f, "Scanned Repositories: {}", stats.scanned_repositories)?;
        writeln!(f, "Repositories with Alerts: {}", stats.repos_with_alerts)?;
        writeln!(f, "Total Alerts: {}", stats.total_alerts)?;
        writeln!(f, "  - Code Scanning Alerts: {}", stats.total_code_alerts)?;
        writeln!(f, "  - Secret Scanning Alerts: {}", stats.total_secret_alerts)?;
        writeln!(f, "  - Dependency Alerts: {}", stats.total_dependency_alerts)?;

        let code = &stats.code_alerts_by_severity;
        f.write_str("\nCode Scanning Alerts by Severity:\n")?;
        writeln!(f, "  - Critical: {}", code.critical)?;
        writeln!(f, "  - High: {}", code.high)?;
        writeln!(f, "  - Medium: {}", code.medium)?;
        writeln!(f, "  - Low: {}", code.low)?;

        let dependency = &stats.dependency_alerts_by_severity;
        f.write_str("\nDependency Alerts by Severity:\n")?;
        writeln!(f, "  - Critical: {}", dependency.critical)?;
        writeln!(f, "  - High: {}", dependency.high)?;
        writeln!(f, "  - Moderate: {}", dependency.moderate)?;
        writeln!(f, "  - Low: {}", dependency.low)?;

        f.write_str("\nSecret Scanning Alerts by Type:\n")?;
        let secret_types = secret_types_by_count(stats);
        if !secret_types.is_empty() {
            for (name, count) in secret_types {
                writeln!(f, "  - {name}: {count}")?;
            }
        } else if stats.total_secret_alerts > 0 {
            f.write_str("  Secrets found but types not categorized.\n")?;
        } else {
            f.write_str("  No secret scanning alerts found.\n")?;
        }

        if !stats.runtime_types.is_empty() {
            f.write_str("\nMCP Server Runtimes:\n")?;
            for (runtime, count) in &stats.runtime_types {
                writeln!(f, "  - {runtime}: {count}")?;
            }
        }

        if stats.total_repositories > 0 {
            writeln!(f, "\nScan Coverage: {:.1}%", stats.scan_coverage())?;
        }

        if !self.include_repositories {
            return Ok(());
        }

        writeln!(
            f,
            "\nTop {TOP_REPOSITORIES_CONSOLE} Repositories with Most Alerts:"
        )?;
        for (i, (name, row)) in stats
            .top_by_total(TOP_REPOSITORIES_CONSOLE)
            .into_iter()
            .enumerate()
        {
            writeln!(f, "{}. {name}: {} alerts", i + 1, row.total)?;
        }

        writeln!(
            f,
            "\nTop {TOP_REPOSITORIES_CONSOLE} Repositories with Critical Alerts:"
        )?;
        for (i, (name, row)) in stats
            .top_by_critical(TOP_REPOSITORIES_CONSOLE)
            .into_iter()
            .enumerate()
        {
            writeln!(
                f,
                "{}. {name}: {} critical code alerts, {} critical dependency alerts",
                i + 1,
                row.code_critical,
                row.dep_critical
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use mcpscan_core::{PropertyMap, RepositoryProperties, build_report};

    fn repo(name: &str, props: &[(&str, &str)]) -> RepositoryProperties {
        RepositoryProperties {
            repository_name: name.to_string(),
            repository_full_name: format!("mcp-research/{name}"),
            properties: props
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect::<PropertyMap>(),
        }
    }

    fn stats() -> ReportStats {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        build_report(
            "mcp-research",
            &[
                repo(
                    "acme__tool",
                    &[
                        ("GHAS_Status_Updated", "2025-05-30T08:00:00"),
                        ("CodeAlerts", "4"),
                        ("CodeAlerts_Critical", "2"),
                        ("SecretAlerts", "1"),
                        ("SecretAlerts_By_Type", r#"{"GitHub Personal Access Token": 1}"#),
                        ("DependencyAlerts", "3"),
                        ("DependencyAlerts_Critical", "1"),
                        ("MCP_Server_Runtime", "npx"),
                    ],
                ),
                repo(
                    "quiet__server",
                    &[
                        ("GHAS_Status_Updated", "2025-05-31T08:00:00"),
                        ("CodeAlerts", "1"),
                        ("MCP_Server_Runtime", "uv"),
                    ],
                ),
                repo("never__scanned", &[]),
            ],
            now,
        )
    }

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_markdown_header_and_summary() {
        let md = report_markdown(&stats(), generated_at(), true);
        assert!(md.starts_with("# GHAS Security Report - mcp-research\n\n"));
        assert!(md.contains("*Report generated on: 2025-06-01 12:30:00*"));
        assert!(md.contains("- **Total Repositories:** 3\n"));
        assert!(md.contains("- **Scanned Repositories:** 2\n"));
        assert!(md.contains("- **Total Alerts:** 9\n"));
        assert!(md.contains("- GitHub Personal Access Token: 1\n"));
        assert!(md.contains("- **Scan Coverage:** 66.7%"));
        assert!(md.contains("## MCP Server Runtimes\n\n- npx: 1\n"));
    }

    #[test]
    fn test_markdown_repository_tables() {
        let md = report_markdown(&stats(), generated_at(), true);
        assert!(md.contains("## Top Repositories with Alerts"));
        assert!(md.contains("| mcp-research/acme__tool | 8 | 4 | 1 | 3 |"));
        assert!(md.contains("| mcp-research/acme__tool | 2 | 1 |"));
        assert!(!md.contains("| mcp-research/quiet__server | 0 | 0 |"));
    }

    #[test]
    fn test_markdown_hides_repositories_in_ci() {
        let md = report_markdown(&stats(), generated_at(), false);
        assert!(!md.contains("Top Repositories"));
        assert!(!md.contains("acme__tool"));
    }

    #[test]
    fn test_secret_fallback_texts() {
        let mut stats = stats();
        stats.secret_alerts_by_type.clear();
        assert!(report_markdown(&stats, generated_at(), false)
            .contains("Secrets found but types not categorized."));

        stats.total_secret_alerts = 0;
        assert!(console_summary(&stats, false).contains("  No secret scanning alerts found."));
    }

    #[test]
    fn test_console_summary() {
        let text = console_summary(&stats(), true);
        assert!(text.starts_with("GHAS Security Report Summary\n=============================="));
        assert!(text.contains("Scanned Repositories: 2\n"));
        assert!(text.contains("1. mcp-research/acme__tool: 8 alerts"));
        assert!(text.contains(
            "1. mcp-research/acme__tool: 2 critical code alerts, 1 critical dependency alerts"
        ));

        let hidden = console_summary(&stats(), false);
        assert!(!hidden.contains("acme__tool"));
        assert!(hidden.contains("Scan Coverage: 66.7%"));
    }
}
