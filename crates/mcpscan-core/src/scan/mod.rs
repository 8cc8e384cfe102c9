//! Heuristic configuration-extraction engine.
//!
//! Pipeline: [`walk`] a checked-out tree, [`locate`] the first embedded
//! `mcpServers` object, recover it with [`parse_lenient`], and classify the
//! first server with [`interpret`]. [`detect_runtime`] chains all four.
//!
//! The engine stops at the first file that contains a marker: a file that
//! yields a fragment or an error ends the scan, later files are not
//! examined.

mod error;
mod interpreter;
mod locator;
mod repair;
mod walker;

use std::path::Path;

pub use error::ScanError;
pub use interpreter::{first_server, interpret};
pub use locator::{MARKERS, locate, strip_whitespace};
pub use repair::{
    fill_missing_values, parse_lenient, repair, strip_comments, strip_trailing_commas,
    unescape_raw_literal,
};
pub use walker::{CandidateFile, TextCorpus, walk};

use crate::domain::{McpComposition, RuntimeInfo};

/// How the locator balances braces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BraceMatching {
    /// Count every `{` and `}`, including those inside string literals.
    #[default]
    Naive,
    /// Ignore braces inside `"..."` literals.
    StringAware,
}

/// Engine options.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub brace_matching: BraceMatching,
    /// Skip files larger than this many bytes. `None` reads every file.
    pub max_file_bytes: Option<u64>,
}

impl ScanOptions {
    #[must_use]
    pub const fn with_brace_matching(mut self, brace_matching: BraceMatching) -> Self {
        self.brace_matching = brace_matching;
        self
    }

    #[must_use]
    pub const fn with_max_file_bytes(mut self, max_file_bytes: u64) -> Self {
        self.max_file_bytes = Some(max_file_bytes);
        self
    }
}

/// Find and recover the first composition under `root`.
///
/// `Ok(None)` means no file carries a marker.
pub fn find_composition(
    root: &Path,
    options: &ScanOptions,
) -> Result<Option<McpComposition>, ScanError> {
    for file in walk(root, options) {
        let Some(fragment) = locate(&file.text, &file.path, options.brace_matching)? else {
            continue;
        };

        tracing::info!(path = %file.path.display(), "Found MCP composition");
        tracing::debug!(fragment = %fragment, "MCP composition fragment");

        let value = parse_lenient(&fragment, &file.path, &file.text)?;
        return Ok(Some(McpComposition::new(value).with_source(file.path)));
    }

    Ok(None)
}

/// Walk, locate, recover and interpret in one call.
pub fn detect_runtime(
    root: &Path,
    options: &ScanOptions,
) -> Result<Option<RuntimeInfo>, ScanError> {
    let Some(composition) = find_composition(root, options)? else {
        tracing::info!(root = %root.display(), "No MCP composition found");
        return Ok(None);
    };

    interpret(&composition).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ServerType;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_options_builder() {
        let options = ScanOptions::default()
            .with_brace_matching(BraceMatching::StringAware)
            .with_max_file_bytes(1024);
        assert_eq!(options.brace_matching, BraceMatching::StringAware);
        assert_eq!(options.max_file_bytes, Some(1024));
        assert_eq!(ScanOptions::default().brace_matching, BraceMatching::Naive);
    }

    #[test]
    fn test_stops_at_first_marker_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.md"), "{\"mcpServers\": {\"s\": {\"command\": \"npx\"}}}")
            .unwrap();
        fs::write(dir.path().join("b.md"), "{\"mcpServers\": {\"s\": {").unwrap();

        let info = detect_runtime(dir.path(), &ScanOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(info.server_type, ServerType::Npx);
    }

    #[test]
    fn test_error_in_first_marker_file_ends_scan() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.md"), "{\"mcpServers\": {\"s\": {").unwrap();
        fs::write(dir.path().join("b.md"), "{\"mcpServers\": {\"s\": {\"command\": \"npx\"}}}")
            .unwrap();

        let err = detect_runtime(dir.path(), &ScanOptions::default()).unwrap_err();
        assert_eq!(err.file_basename().as_deref(), Some("a.md"));
    }

    #[test]
    fn test_composition_remembers_source() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mcp.json");
        fs::write(&path, "{\"mcpServers\": {\"s\": {}}}").unwrap();

        let composition = find_composition(dir.path(), &ScanOptions::default())
            .unwrap()
            .unwrap();
        assert_eq!(composition.source(), Some(path.as_path()));
    }
}
