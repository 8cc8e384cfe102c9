//! Scan command handler.
//!
//! For each fork of the organization, records open GHAS alert counts and,
//! unless disabled, the MCP server runtime. One repository failing never
//! stops the run; failures end up in the summary table.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use mcpscan_core::{
    AlertScanOutcome, AlertScanService, IssueFiler, RuntimeScanOutcome, RuntimeScanService,
    SeverityMapping,
};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{FailedAnalysis, ScanSummary, append_step_summary, strip_markdown};

/// Arguments for the scan command.
#[derive(Debug, Clone)]
pub struct ScanArgs {
    pub org: String,
    pub num_repos: usize,
    /// Repository in `org` receiving analysis-failure issues.
    pub issue_repo: Option<String>,
    pub work_dir: PathBuf,
    pub severity_map: Option<PathBuf>,
    pub skip_runtime: bool,
    pub scan_frequency_days: i64,
}

/// Execute the scan command and print the summary.
pub async fn execute(ctx: &CliContext, args: &ScanArgs) -> Result<()> {
    let summary = run(ctx, args).await?;
    let lines = summary.to_markdown_lines();

    println!("Scanning Summary");
    for line in lines.iter().skip(1) {
        println!("{}", strip_markdown(line));
    }

    append_step_summary(&summary.to_markdown());
    super::rate_limit::log_quota(ctx).await;
    Ok(())
}

/// Scan forks until `num_repos` have been scanned.
pub async fn run(ctx: &CliContext, args: &ScanArgs) -> Result<ScanSummary> {
    let start = Instant::now();

    let mut alert_service = AlertScanService::new(ctx.metadata.clone(), ctx.alerts.clone())
        .with_days_threshold(args.scan_frequency_days);
    if let Some(path) = &args.severity_map {
        let mapping = SeverityMapping::from_json_file(path).map_err(CliError::from)?;
        tracing::info!(path = %path.display(), "Loaded severity mapping");
        alert_service = alert_service.with_severity_mapping(mapping);
    }

    let mut runtime_service = RuntimeScanService::new(ctx.fetcher.clone(), ctx.metadata.clone());
    if let Some(issue_repo) = &args.issue_repo {
        runtime_service = runtime_service.with_issue_filer(IssueFiler::new(
            ctx.issues.clone(),
            args.org.as_str(),
            issue_repo.as_str(),
        ));
    }

    tracing::info!(org = %args.org, "Loading repositories and properties");
    let forks = ctx
        .metadata
        .list_org_forks(&args.org)
        .await
        .map_err(CliError::from)?;
    let cached = match ctx.metadata.list_org_properties(&args.org).await {
        Ok(properties) => properties,
        Err(e) => {
            tracing::warn!(org = %args.org, error = %e, "Could not load organization properties, fetching per repository");
            Vec::new()
        }
    };
    tracing::info!(org = %args.org, count = forks.len(), "Found repositories");

    if !args.skip_runtime {
        tokio::fs::create_dir_all(&args.work_dir)
            .await
            .map_err(CliError::from)?;
    }

    let mut summary = ScanSummary::new(&args.org, args.num_repos);
    summary.total_repositories = forks.len();
    let limit = args.num_repos.min(forks.len());

    for repo in &forks {
        if summary.scanned >= args.num_repos {
            tracing::info!(limit = args.num_repos, "Reached scan limit");
            break;
        }
        tracing::info!(
            repo = %repo.full_name,
            position = summary.scanned + 1,
            limit,
            "Processing repository"
        );

        match alert_service.scan(repo, &cached).await {
            Ok(AlertScanOutcome::Scanned(alerts)) => summary.record_alerts(&alerts),
            Ok(AlertScanOutcome::Skipped(reason)) => {
                tracing::debug!(repo = %repo.full_name, ?reason, "Skipped");
                summary.skipped += 1;
                continue;
            }
            Err(e) => {
                tracing::error!(repo = %repo.full_name, error = %e, "Alert scan failed");
                summary.failures.push(FailedAnalysis {
                    repository: repo.name.clone(),
                    file: None,
                    reason: format!("Alert scan failed: {e}"),
                });
                continue;
            }
        }

        if args.skip_runtime {
            continue;
        }

        match runtime_service.scan(repo, &args.work_dir).await {
            Ok(outcome) => {
                summary.record_runtime(outcome.server_type().as_str());
                if let RuntimeScanOutcome::Failed { error, .. } = outcome {
                    summary.failures.push(FailedAnalysis {
                        repository: repo.name.clone(),
                        file: error.file_basename(),
                        reason: error.error_message,
                    });
                }
            }
            Err(e) => {
                tracing::error!(repo = %repo.full_name, error = %e, "Runtime scan failed");
                summary.failures.push(FailedAnalysis {
                    repository: repo.name.clone(),
                    file: None,
                    reason: e.to_string(),
                });
            }
        }
    }

    summary.elapsed = start.elapsed();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testing::FakeGitHub;
    use mcpscan_core::properties::{CODE_ALERTS, GHAS_STATUS_UPDATED, MCP_SERVER_RUNTIME};
    use mcpscan_core::{PropertyMap, RepositoryProperties};
    use tempfile::TempDir;

    const NPX_README: &str = r#"# Server

```json
{"mcpServers": {"fs": {"command": "npx", "args": ["-y", "@acme/fs"]}}}
```
"#;

    const BROKEN_README: &str = r#"Config: {"mcpServers": {"fs": {"command": "npx""#;

    fn args(work_dir: &TempDir) -> ScanArgs {
        ScanArgs {
            org: "mcp-research".to_string(),
            num_repos: 10,
            issue_repo: Some("mcp-security-scans".to_string()),
            work_dir: work_dir.path().join("tmp"),
            severity_map: None,
            skip_runtime: false,
            scan_frequency_days: 7,
        }
    }

    #[tokio::test]
    async fn test_scan_records_alerts_and_runtimes() {
        let work = TempDir::new().unwrap();
        let (fake, ctx) = FakeGitHub::default()
            .with_fork("acme__fs", NPX_README)
            .with_fork("acme__broken", BROKEN_README)
            .into_context();

        let summary = run(&ctx, &args(&work)).await.unwrap();

        assert_eq!(summary.total_repositories, 2);
        assert_eq!(summary.scanned, 2);
        assert_eq!(summary.code.critical, 2);
        assert_eq!(summary.dependency.moderate, 2);
        assert_eq!(summary.runtimes.get("npx"), Some(&1));
        assert_eq!(summary.runtimes.get("unknown"), Some(&1));

        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].repository, "acme__broken");
        assert_eq!(summary.failures[0].file.as_deref(), Some("README.md"));
        assert_eq!(
            summary.failures[0].reason,
            "Malformed JSON: Unclosed brackets in file"
        );

        let issues = fake.issues.lock().unwrap().clone();
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].title,
            "Failed analysis: Malformed JSON: Unclosed brackets in file"
        );

        let updates = fake.updates_for("acme__fs");
        assert!(updates.iter().any(|p| p.get(CODE_ALERTS).map(String::as_str) == Some("1")));
        assert!(updates
            .iter()
            .any(|p| p.get(MCP_SERVER_RUNTIME).map(String::as_str) == Some("npx")));

        // Checkouts are removed after each repository
        let leftovers = std::fs::read_dir(work.path().join("tmp")).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[tokio::test]
    async fn test_scan_limit_and_skips() {
        let work = TempDir::new().unwrap();
        let mut fake = FakeGitHub::default()
            .with_fork("recent__repo", NPX_README)
            .with_fork("first__repo", NPX_README)
            .with_fork("second__repo", NPX_README);
        fake.org_properties.push(RepositoryProperties {
            repository_name: "recent__repo".to_string(),
            repository_full_name: "mcp-research/recent__repo".to_string(),
            properties: PropertyMap::from([(
                GHAS_STATUS_UPDATED.to_string(),
                chrono::Utc::now().to_rfc3339(),
            )]),
        });
        let (_fake, ctx) = fake.into_context();

        let summary = run(
            &ctx,
            &ScanArgs {
                num_repos: 1,
                skip_runtime: true,
                ..args(&work)
            },
        )
        .await
        .unwrap();

        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.scanned, 1);
        assert_eq!(summary.processed(), 2);
        assert!(summary.runtimes.is_empty());
    }

    #[tokio::test]
    async fn test_alert_failure_does_not_abort() {
        let work = TempDir::new().unwrap();
        let mut fake = FakeGitHub::default()
            .with_fork("flaky__repo", NPX_README)
            .with_fork("good__repo", NPX_README);
        fake.broken_alerts.push("flaky__repo".to_string());
        let (_fake, ctx) = fake.into_context();

        let summary = run(&ctx, &args(&work)).await.unwrap();

        assert_eq!(summary.scanned, 2);
        assert!(summary.failures.is_empty());
        assert_eq!(summary.code.total, 1);
    }

    #[tokio::test]
    async fn test_invalid_severity_map_is_config_error() {
        let work = TempDir::new().unwrap();
        let map = work.path().join("severity.json");
        std::fs::write(&map, "not json").unwrap();
        let (_fake, ctx) = FakeGitHub::default().into_context();

        let err = run(
            &ctx,
            &ScanArgs {
                severity_map: Some(map),
                ..args(&work)
            },
        )
        .await
        .unwrap_err();

        assert_eq!(CliError::exit_code_for(&err), 78);
    }

    #[tokio::test]
    async fn test_no_issue_repo_files_nothing() {
        let work = TempDir::new().unwrap();
        let (fake, ctx) = FakeGitHub::default()
            .with_fork("acme__broken", BROKEN_README)
            .into_context();

        let summary = run(
            &ctx,
            &ScanArgs {
                issue_repo: None,
                ..args(&work)
            },
        )
        .await
        .unwrap();

        assert_eq!(summary.failures.len(), 1);
        assert!(fake.issues.lock().unwrap().is_empty());
    }
}
