//! Error types for GitHub port operations.

use thiserror::Error;

/// Errors from GitHub port operations.
///
/// These are domain-level errors that services can handle.
/// Implementation-specific errors (HTTP, JSON, archives) are mapped to these.
#[derive(Debug, Error)]
pub enum GitHubPortError {
    /// The repository or resource does not exist (or is not visible).
    #[error("Not found: {resource}")]
    NotFound {
        /// What was requested
        resource: String,
    },

    /// API rate limit exceeded.
    #[error("Rate limit exceeded, try again later")]
    RateLimited,

    /// Authentication missing, invalid or lacking permission.
    #[error("Authentication failed: {message}")]
    AuthRequired {
        /// Description from the API
        message: String,
    },

    /// The API rejected the request payload (HTTP 422).
    #[error("Unprocessable request: {message}")]
    Unprocessable {
        /// Validation details from the API
        message: String,
    },

    /// Network or connectivity error.
    #[error("Network error: {message}")]
    Network {
        /// Description of the network error
        message: String,
    },

    /// Invalid response from the API.
    #[error("Invalid API response: {message}")]
    InvalidResponse {
        /// What was invalid
        message: String,
    },

    /// Source archive could not be downloaded or unpacked.
    #[error("Archive error: {message}")]
    Archive {
        /// What went wrong
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Configuration {
        /// What's wrong with the configuration
        message: String,
    },
}

/// Result type alias for GitHub port operations.
pub type GitHubPortResult<T> = Result<T, GitHubPortError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GitHubPortError::NotFound {
            resource: "mcp-research/acme__tool".to_string(),
        };
        assert!(err.to_string().contains("mcp-research/acme__tool"));

        let err = GitHubPortError::Unprocessable {
            message: "property CodeAlerts does not exist".to_string(),
        };
        assert!(err.to_string().contains("CodeAlerts"));
    }
}
