//! Names of the custom repository properties mcpscan reads and writes.
//!
//! The properties must exist at the organization level before they can be set
//! on a repository.

/// Organization scanned when none is given.
pub const DEFAULT_ORG: &str = "mcp-research";

/// Repository receiving analysis-failure issues.
pub const DEFAULT_ISSUE_REPO: &str = "mcp-security-scans";

/// Timestamp of the last GHAS scan.
pub const GHAS_STATUS_UPDATED: &str = "GHAS_Status_Updated";

/// Minimum days between two scans of the same repository.
pub const SCAN_FREQUENCY_DAYS: i64 = 7;

// Totals
pub const CODE_ALERTS: &str = "CodeAlerts";
pub const SECRET_ALERTS: &str = "SecretAlerts";
pub const DEPENDENCY_ALERTS: &str = "DependencyAlerts";

// Code scanning by severity
pub const CODE_ALERTS_CRITICAL: &str = "CodeAlerts_Critical";
pub const CODE_ALERTS_HIGH: &str = "CodeAlerts_High";
pub const CODE_ALERTS_MEDIUM: &str = "CodeAlerts_Medium";
pub const CODE_ALERTS_LOW: &str = "CodeAlerts_Low";

// Secret scanning
pub const SECRET_ALERTS_TOTAL: &str = "SecretAlerts_Total";
/// JSON object string `{"<type>": count}`.
pub const SECRET_ALERTS_BY_TYPE: &str = "SecretAlerts_By_Type";

// Dependabot by severity
pub const DEPENDENCY_ALERTS_CRITICAL: &str = "DependencyAlerts_Critical";
pub const DEPENDENCY_ALERTS_HIGH: &str = "DependencyAlerts_High";
pub const DEPENDENCY_ALERTS_MODERATE: &str = "DependencyAlerts_Moderate";
pub const DEPENDENCY_ALERTS_LOW: &str = "DependencyAlerts_Low";

/// `uv`, `npx` or `unknown`.
pub const MCP_SERVER_RUNTIME: &str = "MCP_Server_Runtime";

/// Value of [`GHAS_STATUS_UPDATED`] that forces a rescan.
pub const TESTING_MARKER: &str = "Testing";
