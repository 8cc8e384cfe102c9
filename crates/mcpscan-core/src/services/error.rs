//! Service-level errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::ports::GitHubPortError;

/// Errors that abort a single service operation.
///
/// Callers iterating over many repositories log these and move on.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    GitHub(#[from] GitHubPortError),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid severity mapping: {0}")]
    SeverityMapping(String),

    #[error("Background task failed: {0}")]
    Task(String),
}

impl ServiceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
