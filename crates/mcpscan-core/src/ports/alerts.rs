//! GHAS alert source port.

use async_trait::async_trait;

use super::GitHubPortResult;
use crate::domain::{CodeScanningAlert, DependabotAlert, SecretScanningAlert};

/// Open alerts of a repository, all pages.
///
/// A feature that is disabled for the repository (HTTP 404) yields an empty
/// list rather than an error.
#[async_trait]
pub trait AlertSourcePort: Send + Sync {
    async fn code_scanning_alerts(
        &self,
        owner: &str,
        repo: &str,
    ) -> GitHubPortResult<Vec<CodeScanningAlert>>;

    async fn secret_scanning_alerts(
        &self,
        owner: &str,
        repo: &str,
    ) -> GitHubPortResult<Vec<SecretScanningAlert>>;

    async fn dependabot_alerts(
        &self,
        owner: &str,
        repo: &str,
    ) -> GitHubPortResult<Vec<DependabotAlert>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn _assert_object_safe(_: Arc<dyn AlertSourcePort>) {}
}
