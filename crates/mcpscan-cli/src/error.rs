//! CLI-specific error types and exit codes.

use mcpscan_core::{GitHubPortError, ServiceError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// A service operation failed.
    #[error("{0}")]
    Service(String),

    /// GitHub could not be reached or refused the request.
    #[error("GitHub error: {0}")]
    GitHub(String),

    /// A composition was found but could not be analyzed.
    #[error("Analysis failed: {0}")]
    Analysis(String),

    /// Argument error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error (missing token, bad severity map, etc.).
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CliError {
    /// Map error to an exit code.
    ///
    /// - 1: General error, including analysis failures
    /// - 2: Invalid arguments
    /// - 64-78: sysexits.h categories
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Service(_) | Self::Analysis(_) => 1,
            Self::Arguments(_) => 2,
            Self::GitHub(_) => 69, // EX_UNAVAILABLE
            Self::Io(_) => 74,     // EX_IOERR
            Self::Config(_) => 78, // EX_CONFIG
        }
    }

    /// Exit code for any handler error; errors that are not a `CliError`
    /// exit with 1.
    pub fn exit_code_for(err: &anyhow::Error) -> i32 {
        err.downcast_ref::<Self>().map_or(1, Self::exit_code)
    }
}

impl From<GitHubPortError> for CliError {
    fn from(err: GitHubPortError) -> Self {
        match err {
            GitHubPortError::AuthRequired { .. } | GitHubPortError::Configuration { .. } => {
                Self::Config(err.to_string())
            }
            other => Self::GitHub(other.to_string()),
        }
    }
}

impl From<ServiceError> for CliError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::GitHub(e) => e.into(),
            ServiceError::Io { .. } => Self::Io(err.to_string()),
            ServiceError::SeverityMapping(msg) => Self::Config(msg),
            ServiceError::Task(msg) => Self::Service(msg),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Analysis("x".into()).exit_code(), 1);
        assert_eq!(CliError::Arguments("x".into()).exit_code(), 2);
        assert_eq!(CliError::GitHub("x".into()).exit_code(), 69);
        assert_eq!(CliError::Config("x".into()).exit_code(), 78);
    }

    #[test]
    fn test_port_error_mapping() {
        let err: CliError = GitHubPortError::AuthRequired {
            message: "Bad credentials".to_string(),
        }
        .into();
        assert!(matches!(err, CliError::Config(_)));

        let err: CliError = ServiceError::GitHub(GitHubPortError::RateLimited).into();
        assert!(matches!(err, CliError::GitHub(_)));

        let err: CliError = ServiceError::SeverityMapping("unknown bucket".to_string()).into();
        assert_eq!(err.exit_code(), 78);
    }

    #[test]
    fn test_exit_code_for_anyhow() {
        let err = anyhow::Error::from(CliError::Io("disk full".to_string()));
        assert_eq!(CliError::exit_code_for(&err), 74);
        assert_eq!(CliError::exit_code_for(&anyhow::anyhow!("plain")), 1);
    }
}
