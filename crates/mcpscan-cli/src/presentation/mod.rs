//! Shared CLI presentation utilities.
//!
//! Format-only: handlers collect the numbers, this module turns them into
//! markdown and console text.

pub mod markdown;
pub mod property_summary;
pub mod report;
pub mod scan_summary;

pub use markdown::{append_step_summary, format_duration, strip_markdown, table_row};
pub use property_summary::property_summary_markdown;
pub use report::{console_summary, report_markdown};
pub use scan_summary::{FailedAnalysis, ScanSummary};
