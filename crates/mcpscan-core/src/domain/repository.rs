//! Core-owned DTOs for repositories, custom properties and issues.
//!
//! These types cross the boundary between `mcpscan-github` and the services.
//! They carry only what the services need, not GitHub API payloads.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Custom property values of one repository, keyed by property name.
///
/// Values are always strings on the wire; a property set to `null` is absent.
pub type PropertyMap = BTreeMap<String, String>;

/// A repository as listed for an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySummary {
    /// Repository name without owner
    pub name: String,
    /// `owner/name`
    pub full_name: String,
    /// Owner login
    pub owner: String,
    /// Whether the repository is a fork
    pub fork: bool,
    /// Default branch used when downloading the source archive
    pub default_branch: String,
}

/// Detailed view of a single repository, used when checking for an existing fork.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDetails {
    pub full_name: String,
    pub fork: bool,
    /// `owner/name` of the parent when the repository is a fork
    pub parent_full_name: Option<String>,
}

impl RepositoryDetails {
    /// True when this repository is a fork of `source_full_name` (case-insensitive).
    pub fn is_fork_of(&self, source_full_name: &str) -> bool {
        self.fork
            && self
                .parent_full_name
                .as_deref()
                .is_some_and(|parent| parent.eq_ignore_ascii_case(source_full_name))
    }
}

/// Custom property values of one repository, as returned by the org-wide listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryProperties {
    pub repository_name: String,
    pub repository_full_name: String,
    pub properties: PropertyMap,
}

/// An issue to be filed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub labels: Vec<String>,
}

/// Core API quota of the authenticated token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitStatus {
    pub limit: u64,
    pub remaining: u64,
    pub used: u64,
    /// When the quota window resets
    pub reset: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_fork_of_ignores_case() {
        let details = RepositoryDetails {
            full_name: "mcp-research/Acme__Tool".to_string(),
            fork: true,
            parent_full_name: Some("Acme/Tool".to_string()),
        };
        assert!(details.is_fork_of("acme/tool"));
        assert!(!details.is_fork_of("acme/other"));
    }

    #[test]
    fn test_non_fork_is_never_fork_of() {
        let details = RepositoryDetails {
            full_name: "mcp-research/acme__tool".to_string(),
            fork: false,
            parent_full_name: None,
        };
        assert!(!details.is_fork_of("acme/tool"));
    }
}
