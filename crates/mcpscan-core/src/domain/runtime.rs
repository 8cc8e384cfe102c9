//! MCP composition and runtime classification types.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Launcher family of an MCP server, derived from its `command`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerType {
    /// Command ends with `uv` (`uv`, `/usr/local/bin/uv`).
    Uv,
    /// Command is exactly `npx`.
    Npx,
    /// Anything else, including an empty command.
    #[default]
    Unknown,
}

impl ServerType {
    /// Classify a server command.
    ///
    /// The suffix rule is intentionally loose: `uvx` does not end with `uv`
    /// and is `Unknown`, while `/opt/bin/uv` is `Uv`.
    pub fn classify(command: &str) -> Self {
        if command.ends_with("uv") {
            Self::Uv
        } else if command == "npx" {
            Self::Npx
        } else {
            Self::Unknown
        }
    }

    /// Lowercase name as stored in repository properties.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uv => "uv",
            Self::Npx => "npx",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ServerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServerType {
    type Err = std::convert::Infallible;

    /// Parse a stored property value. Empty or unrecognized values are `Unknown`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "uv" => Self::Uv,
            "npx" => Self::Npx,
            _ => Self::Unknown,
        })
    }
}

/// The interpreter's result: the first declared server and its launcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeInfo {
    /// Key of the first entry in `mcpServers`.
    pub server: String,
    /// Classification of `command`.
    pub server_type: ServerType,
    /// Raw command string (empty when absent).
    pub command: String,
    /// Arguments rendered as strings (empty when absent).
    pub args: Vec<String>,
}

/// One entry of `mcpServers` after shape validation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ServerSpec {
    pub command: String,
    pub args: Vec<String>,
    /// Environment block as written. Values may be `null` after repair.
    pub env: Map<String, Value>,
}

/// A recovered MCP composition document.
///
/// Object keys keep their declaration order, so "first server" is
/// well-defined.
#[derive(Debug, Clone, PartialEq)]
pub struct McpComposition {
    value: Value,
    source: Option<PathBuf>,
}

impl McpComposition {
    /// Wrap an already parsed document.
    pub const fn new(value: Value) -> Self {
        Self {
            value,
            source: None,
        }
    }

    /// Record the file the document was recovered from.
    #[must_use]
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    pub const fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Pretty JSON (2-space indent) used in diagnostics.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.value).unwrap_or_else(|_| self.value.to_string())
    }
}

impl From<Value> for McpComposition {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}
