//! Command handlers.
//!
//! Network handlers follow one pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<()>`
//! - Build the core service from the context ports, run it, hand the result
//!   to `presentation` for output
//!
//! `detect` works on a local directory and takes no context.
//!
//! Counting and persistence rules live in `mcpscan-core`, not here.

pub mod detect;
pub mod fork;
pub mod property_summary;
pub mod rate_limit;
pub mod report;
pub mod scan;

#[cfg(test)]
pub(crate) mod testing;
