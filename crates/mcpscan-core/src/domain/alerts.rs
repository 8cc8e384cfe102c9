//! Open GHAS alerts, reduced to the fields the aggregation needs.

use serde::{Deserialize, Serialize};

/// An open code scanning alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeScanningAlert {
    pub number: u64,
    /// `rule.severity` as reported (`error`, `warning`, `note`, `critical`, ...)
    pub rule_severity: Option<String>,
}

/// An open secret scanning alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretScanningAlert {
    pub number: u64,
    pub secret_type: Option<String>,
    pub secret_type_display_name: Option<String>,
}

impl SecretScanningAlert {
    /// Label used when grouping secrets by type.
    pub fn type_label(&self) -> &str {
        self.secret_type_display_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.secret_type.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or("Unknown")
    }
}

/// An open Dependabot alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependabotAlert {
    pub number: u64,
    /// `security_vulnerability.severity` (`critical`, `high`, `medium`, `low`)
    pub severity: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_label_fallbacks() {
        let mut alert = SecretScanningAlert {
            number: 1,
            secret_type: Some("github_personal_access_token".to_string()),
            secret_type_display_name: Some("GitHub Personal Access Token".to_string()),
        };
        assert_eq!(alert.type_label(), "GitHub Personal Access Token");

        alert.secret_type_display_name = None;
        assert_eq!(alert.type_label(), "github_personal_access_token");

        alert.secret_type = Some(String::new());
        assert_eq!(alert.type_label(), "Unknown");
    }
}
