//! Rate limit command handler.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Print the current core API quota.
pub async fn execute(ctx: &CliContext) -> Result<()> {
    let status = ctx.metadata.rate_limit().await.map_err(CliError::from)?;
    println!("Limit:     {}", status.limit);
    println!("Remaining: {}", status.remaining);
    println!("Used:      {}", status.used);
    println!("Resets at: {}", status.reset.to_rfc3339());
    Ok(())
}

/// Log the quota at the end of a run. Failures are only logged.
pub async fn log_quota(ctx: &CliContext) {
    match ctx.metadata.rate_limit().await {
        Ok(status) => tracing::info!(
            limit = status.limit,
            remaining = status.remaining,
            used = status.used,
            reset = %status.reset.to_rfc3339(),
            "GitHub API rate limit"
        ),
        Err(e) => tracing::warn!(error = %e, "Could not read rate limit"),
    }
}
