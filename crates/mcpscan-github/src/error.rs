//! Internal error types for GitHub operations.
//!
//! These errors are internal to `mcpscan-github` and are mapped to core port
//! errors at the boundary.

use thiserror::Error;

/// Result type alias for GitHub operations.
pub type GitHubResult<T> = Result<T, GitHubError>;

#[derive(Debug, Error)]
pub enum GitHubError {
    /// API request failed with an HTTP error status.
    #[error("GitHub API request failed with status {status}: {url}: {message}")]
    ApiRequestFailed {
        status: u16,
        url: String,
        /// `message` field of the error body, if any
        message: String,
    },

    /// 404 from the API.
    #[error("Not found: {url}")]
    NotFound { url: String },

    /// 403/429 with an exhausted quota.
    #[error("Rate limit exceeded for {url}")]
    RateLimited { url: String },

    /// API returned an invalid or unexpected response.
    #[error("Invalid response from GitHub API: {message}")]
    InvalidResponse { message: String },

    /// Tarball download was not a gzip archive or could not be unpacked.
    #[error("Archive error: {message}")]
    Archive { message: String },

    /// Network or HTTP client error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GitHubError {
    /// HTTP status of a failed request, if the failure came from the API.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::ApiRequestFailed { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(404),
            Self::RateLimited { .. } => Some(429),
            _ => None,
        }
    }
}
