//! Markdown helpers and the GitHub Actions step summary.

use std::fmt::Display;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

/// Environment variable naming the step summary file in GitHub Actions.
pub const STEP_SUMMARY_ENV: &str = "GITHUB_STEP_SUMMARY";

/// One markdown table row: `| a | b |`.
pub fn table_row<T: Display>(cells: &[T]) -> String {
    let cells: Vec<String> = cells.iter().map(ToString::to_string).collect();
    format!("| {} |", cells.join(" | "))
}

/// Drop backticks and emphasis so a markdown line reads well in a log.
pub fn strip_markdown(line: &str) -> String {
    line.replace(['`', '*'], "")
}

/// Human-readable elapsed time.
pub fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs >= 3600 {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{:.1}s", elapsed.as_secs_f64())
    }
}

/// Append `content` to the step summary file when running in GitHub
/// Actions. Failures are logged, never fatal.
pub fn append_step_summary(content: &str) {
    let Some(path) = std::env::var_os(STEP_SUMMARY_ENV) else {
        tracing::debug!("{STEP_SUMMARY_ENV} not set, skipping step summary");
        return;
    };
    match append_to_file(Path::new(&path), content) {
        Ok(()) => tracing::info!("Appended summary to {STEP_SUMMARY_ENV}"),
        Err(e) => tracing::error!(error = %e, "Failed to write {STEP_SUMMARY_ENV}"),
    }
}

/// Append `content` followed by a blank line.
pub fn append_to_file(path: &Path, content: &str) -> std::io::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    writeln!(file, "{content}")?;
    writeln!(file)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_row() {
        assert_eq!(table_row(&["a", "b"]), "| a | b |");
        assert_eq!(table_row(&[1, 22, 333]), "| 1 | 22 | 333 |");
    }

    #[test]
    fn test_strip_markdown() {
        assert_eq!(strip_markdown("- Critical: `3`"), "- Critical: 3");
        assert_eq!(strip_markdown("**Summary**"), "Summary");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(4_300)), "4.3s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
        assert_eq!(format_duration(Duration::from_secs(3_725)), "1h 2m 5s");
    }

    #[test]
    fn test_append_to_file_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.md");
        std::fs::write(&path, "existing\n").unwrap();

        append_to_file(&path, "# One").unwrap();
        append_to_file(&path, "# Two").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "existing\n# One\n\n# Two\n\n");
    }
}
