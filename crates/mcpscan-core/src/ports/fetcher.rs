//! Source materialization port.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::GitHubPortResult;

/// Number of download-and-extract attempts before giving up.
pub const MATERIALIZE_ATTEMPTS: u32 = 3;

/// Makes a repository's source tree available on the local filesystem.
#[async_trait]
pub trait RepositoryFetcherPort: Send + Sync {
    /// Download `branch` of `owner/repo` and extract it under `dest`.
    ///
    /// Returns the directory holding the extracted tree. Implementations
    /// retry up to [`MATERIALIZE_ATTEMPTS`] times on invalid archives and
    /// extraction failures.
    async fn materialize(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        dest: &Path,
    ) -> GitHubPortResult<PathBuf>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn _assert_object_safe(_: Arc<dyn RepositoryFetcherPort>) {}
}
