//! Structured scan failure.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const UNCLOSED_BRACKETS: &str = "Malformed JSON: Unclosed brackets in file";
pub const PARSE_FAILURE_PREFIX: &str = "Failed to parse MCP composition JSON: ";
pub const EMPTY_COMPOSITION: &str = "Empty composition provided";
pub const MISSING_SERVERS_KEY: &str = "Missing 'mcpServers' key in composition";
pub const NO_SERVERS: &str = "No servers found in 'mcpServers' object";
pub const ANALYSIS_EXCEPTION_PREFIX: &str = "Exception analyzing composition: ";

/// A located-but-unusable composition.
///
/// Returned as a value, never panicked. `json_config` is the best available
/// context: the truncated fragment, the whole file, or the pretty-printed
/// document, depending on the stage that failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanError {
    pub error_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_config: Option<String>,
}

impl ScanError {
    pub fn new(error_message: impl Into<String>) -> Self {
        Self {
            error_message: error_message.into(),
            filename: None,
            json_config: None,
        }
    }

    #[must_use]
    pub fn with_filename(mut self, path: impl Into<PathBuf>) -> Self {
        self.filename = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_json_config(mut self, json_config: impl Into<String>) -> Self {
        self.json_config = Some(json_config.into());
        self
    }

    /// The fragment never balanced before end of content.
    pub(crate) fn unclosed(path: &Path, fragment: &str) -> Self {
        Self::new(UNCLOSED_BRACKETS)
            .with_filename(path)
            .with_json_config(fragment)
    }

    /// Every recovery attempt failed; `diagnostic` is the last parser error.
    pub(crate) fn unparseable(path: &Path, diagnostic: &str, content: &str) -> Self {
        Self::new(format!("{PARSE_FAILURE_PREFIX}{diagnostic}"))
            .with_filename(path)
            .with_json_config(content)
    }

    /// File name without directories, for issue bodies and tables.
    pub fn file_basename(&self) -> Option<String> {
        self.filename
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.error_message)
    }
}

impl std::error::Error for ScanError {}
