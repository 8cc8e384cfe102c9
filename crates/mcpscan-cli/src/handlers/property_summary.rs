//! Property summary command handler.
//!
//! Summarizes every custom property value stored on the organization's
//! repositories, whatever wrote it.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{Local, NaiveDateTime, Utc};
use mcpscan_core::{PropertySummary, summarize_properties};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::property_summary_markdown;

/// Arguments for the property-summary command.
#[derive(Debug, Clone)]
pub struct PropertySummaryArgs {
    pub org: String,
    pub output_dir: PathBuf,
    /// Skip the markdown report.
    pub json_only: bool,
}

/// Files written by one summary run.
#[derive(Debug, Clone)]
pub struct SummaryFiles {
    pub json: PathBuf,
    pub markdown: Option<PathBuf>,
}

fn summary_path(output_dir: &Path, org: &str, generated_at: NaiveDateTime, ext: &str) -> PathBuf {
    output_dir.join(format!(
        "property_summary_{org}_{}.{ext}",
        generated_at.format("%Y%m%d_%H%M%S")
    ))
}

/// Analyze the properties of `args.org` and write the summary files.
///
/// Returns `None`, writing nothing, when the organization has no
/// repositories.
pub async fn run(
    ctx: &CliContext,
    args: &PropertySummaryArgs,
    generated_at: NaiveDateTime,
) -> Result<Option<(PropertySummary, SummaryFiles)>> {
    tracing::info!(org = %args.org, "Loading repository properties");
    let properties = ctx
        .metadata
        .list_org_properties(&args.org)
        .await
        .map_err(CliError::from)?;

    if properties.is_empty() {
        tracing::warn!(org = %args.org, "No repository properties found");
        return Ok(None);
    }

    let summary = summarize_properties(&properties, Utc::now());

    tokio::fs::create_dir_all(&args.output_dir)
        .await
        .map_err(CliError::from)?;
    let json_path = summary_path(&args.output_dir, &args.org, generated_at, "json");
    tokio::fs::write(&json_path, serde_json::to_string_pretty(&summary)?)
        .await
        .map_err(CliError::from)?;
    tracing::info!(path = %json_path.display(), "Property summary JSON saved");

    let markdown_path = if args.json_only {
        None
    } else {
        let path = summary_path(&args.output_dir, &args.org, generated_at, "md");
        tokio::fs::write(&path, property_summary_markdown(&args.org, &summary))
            .await
            .map_err(CliError::from)?;
        tracing::info!(path = %path.display(), "Property summary report saved");
        Some(path)
    };

    Ok(Some((
        summary,
        SummaryFiles {
            json: json_path,
            markdown: markdown_path,
        },
    )))
}

/// Execute the property-summary command.
pub async fn execute(ctx: &CliContext, args: &PropertySummaryArgs) -> Result<()> {
    if let Some((summary, _files)) = run(ctx, args, Local::now().naive_local()).await? {
        let overall = &summary.overall_summary;
        tracing::info!(
            repositories = overall.total_repositories_analyzed,
            property_names = overall.property_count,
            properties = overall.total_properties_found,
            "Property analysis completed"
        );
    }
    super::rate_limit::log_quota(ctx).await;
    Ok(())
}
