//! Public configuration for the GitHub client.
//!
//! Callers choose the API endpoint and credentials. Transport tuning is
//! fixed by the constants below and copied into the internal config.

/// Default REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Sent on every request; GitHub rejects requests without a user agent.
pub(crate) const USER_AGENT: &str = concat!("mcpscan/", env!("CARGO_PKG_VERSION"));
pub(crate) const TIMEOUT_SECS: u64 = 30;
/// Retries of idempotent requests after a 5xx or network error.
pub(crate) const MAX_RETRIES: u8 = 3;
pub(crate) const RETRY_BASE_DELAY_MS: u64 = 500;
/// Largest page the REST API serves.
pub(crate) const PER_PAGE: u8 = 100;

/// Endpoint and credentials for the GitHub client.
///
/// ```
/// use mcpscan_github::GitHubClientConfig;
///
/// let config = GitHubClientConfig::new()
///     .with_base_url("https://ghe.example.com/api/v3")
///     .with_token("ghp_example");
/// assert!(config.is_enterprise());
/// ```
#[derive(Debug, Clone)]
pub struct GitHubClientConfig {
    pub(crate) base_url: String,
    /// Sent as `Authorization: Bearer` to the API host only
    pub(crate) token: Option<String>,
}

impl Default for GitHubClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            token: None,
        }
    }
}

impl GitHubClientConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// REST API root of a GitHub Enterprise Server, such as
    /// `https://ghe.example.com/api/v3`.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// `None` sends unauthenticated requests, limited to 60 per hour.
    #[must_use]
    pub fn with_optional_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Whether requests go somewhere other than github.com.
    pub fn is_enterprise(&self) -> bool {
        self.base_url.trim_end_matches('/') != DEFAULT_API_URL
    }
}
