//! Internal configuration and GitHub REST payloads.
//!
//! Only the fields mcpscan reads are declared; serde ignores the rest.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

#[cfg(test)]
use crate::config;

// ============================================================================
// Internal configuration
// ============================================================================

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    pub user_agent: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u8,
    pub retry_base_delay_ms: u64,
    pub per_page: u8,
}

#[cfg(test)]
impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(config::DEFAULT_API_URL).unwrap(),
            user_agent: config::USER_AGENT.to_string(),
            token: None,
            timeout_secs: config::TIMEOUT_SECS,
            max_retries: config::MAX_RETRIES,
            retry_base_delay_ms: config::RETRY_BASE_DELAY_MS,
            per_page: config::PER_PAGE,
        }
    }
}

// ============================================================================
// Repositories
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ApiOwner {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiParent {
    pub full_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiRepository {
    pub name: String,
    pub full_name: String,
    pub owner: ApiOwner,
    #[serde(default)]
    pub fork: bool,
    pub default_branch: Option<String>,
    /// Only present on the single-repository endpoint
    pub parent: Option<ApiParent>,
}

// ============================================================================
// Custom properties
// ============================================================================

/// A property value; GitHub returns strings, `null`, or arrays for multi-select.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiPropertyValue {
    pub property_name: String,
    pub value: Option<Value>,
}

impl ApiPropertyValue {
    /// String form of the value; `None` when unset.
    pub fn value_string(&self) -> Option<String> {
        match self.value.as_ref()? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Array(items) => Some(
                items
                    .iter()
                    .map(|item| item.as_str().map_or_else(|| item.to_string(), str::to_string))
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            other => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiRepositoryProperties {
    pub repository_name: String,
    pub repository_full_name: String,
    #[serde(default)]
    pub properties: Vec<ApiPropertyValue>,
}

#[derive(Debug, Serialize)]
pub struct ApiPropertiesUpdate {
    pub properties: Vec<ApiPropertyValue>,
}

// ============================================================================
// Rate limit
// ============================================================================

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ApiRate {
    pub limit: u64,
    pub remaining: u64,
    #[serde(default)]
    pub used: u64,
    /// Unix timestamp
    pub reset: i64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ApiRateResources {
    pub core: ApiRate,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ApiRateLimit {
    pub resources: ApiRateResources,
}

// ============================================================================
// Alerts
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiRule {
    pub severity: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCodeAlert {
    pub number: u64,
    #[serde(default)]
    pub rule: ApiRule,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSecretAlert {
    pub number: u64,
    pub secret_type: Option<String>,
    pub secret_type_display_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiVulnerability {
    pub severity: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiDependabotAlert {
    pub number: u64,
    #[serde(default)]
    pub security_vulnerability: ApiVulnerability,
}

// ============================================================================
// Issues
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSearchResult {
    pub total_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiIssue {
    pub number: u64,
}

/// `message` field of a GitHub error body.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
}
