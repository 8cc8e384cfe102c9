//! Fork command handler.

use anyhow::Result;
use mcpscan_core::{CatalogForkService, CatalogSource, ForkRunSummary};

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Arguments for the fork command.
#[derive(Debug, Clone)]
pub struct ForkArgs {
    pub org: String,
    /// Read in order; a repository listed by several sources is forked once
    pub sources: Vec<CatalogSource>,
    /// Entries taken from each source
    pub limit: usize,
}

/// Fork catalog repositories into the scanning organization.
pub async fn run(ctx: &CliContext, args: &ForkArgs) -> Result<ForkRunSummary> {
    let service =
        CatalogForkService::new(ctx.forks.clone()).with_catalog_source(ctx.catalog.clone());
    let summary = service
        .run_sources(&args.sources, &args.org, args.limit)
        .await
        .map_err(CliError::from)?;
    Ok(summary)
}

/// Execute the fork command and print what happened.
pub async fn execute(ctx: &CliContext, args: &ForkArgs) -> Result<()> {
    let summary = run(ctx, args).await?;

    println!("Fork summary for {}", args.org);
    println!("  Catalog entries considered: {}", summary.files_considered);
    println!("  Repositories processed:     {}", summary.processed);
    println!("  Forks created:              {}", summary.forks_created);
    println!("  Already forked:             {}", summary.already_forked);
    println!("  Skipped:                    {}", summary.skipped);
    println!("  With Dependabot config:     {}", summary.dependabot_configured);
    println!("  Distinct Source Counts:");
    for (source, count) in &summary.sources {
        println!("    {source}: {count}");
    }
    if !summary.failures.is_empty() {
        println!("  Failed:");
        for (source, reason) in &summary.failures {
            println!("    {source}: {reason}");
        }
    }

    super::rate_limit::log_quota(ctx).await;
    Ok(())
}
