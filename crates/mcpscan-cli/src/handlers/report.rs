//! Report command handler.
//!
//! Aggregates the GHAS properties already stored on the organization's
//! repositories. No alerts are fetched.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{Local, NaiveDateTime, Utc};
use mcpscan_core::{ReportStats, build_report};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::{append_step_summary, console_summary, report_markdown};

/// Arguments for the report command.
#[derive(Debug, Clone)]
pub struct ReportArgs {
    pub org: String,
    pub output_dir: PathBuf,
    /// Leave per-repository tables out of every output.
    pub hide_repositories: bool,
}

/// Files written by one report run.
#[derive(Debug, Clone)]
pub struct ReportFiles {
    pub json: PathBuf,
    pub markdown: PathBuf,
}

/// True when running under a CI system (`CI` set and non-empty).
pub fn running_in_ci() -> bool {
    std::env::var_os("CI").is_some_and(|value| !value.is_empty())
}

fn report_paths(output_dir: &Path, org: &str, generated_at: NaiveDateTime) -> ReportFiles {
    let stem = format!("ghas_report_{org}_{}", generated_at.format("%Y%m%d"));
    ReportFiles {
        json: output_dir.join(format!("{stem}.json")),
        markdown: output_dir.join(format!("{stem}.md")),
    }
}

/// Build the report and write it under `output_dir`.
pub async fn run(
    ctx: &CliContext,
    args: &ReportArgs,
    generated_at: NaiveDateTime,
) -> Result<(ReportStats, ReportFiles)> {
    tracing::info!(org = %args.org, "Fetching repository properties");
    let properties = ctx
        .metadata
        .list_org_properties(&args.org)
        .await
        .map_err(CliError::from)?;
    let stats = build_report(&args.org, &properties, Utc::now());

    tokio::fs::create_dir_all(&args.output_dir)
        .await
        .map_err(CliError::from)?;
    let files = report_paths(&args.output_dir, &args.org, generated_at);

    let json = serde_json::to_string_pretty(&stats)?;
    tokio::fs::write(&files.json, json)
        .await
        .map_err(CliError::from)?;
    tracing::info!(path = %files.json.display(), "JSON report saved");

    let markdown = report_markdown(&stats, generated_at, !args.hide_repositories);
    tokio::fs::write(&files.markdown, &markdown)
        .await
        .map_err(CliError::from)?;
    tracing::info!(path = %files.markdown.display(), "Markdown report saved");

    append_step_summary(&markdown);
    Ok((stats, files))
}

/// Execute the report command.
pub async fn execute(ctx: &CliContext, args: &ReportArgs) -> Result<()> {
    let (stats, _files) = run(ctx, args, Local::now().naive_local()).await?;
    print!("{}", console_summary(&stats, !args.hide_repositories));
    Ok(())
}
