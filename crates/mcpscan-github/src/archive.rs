//! Source tree download.
//!
//! Repositories are fetched as the gzipped tarball of one branch and
//! unpacked on a blocking thread. GitHub wraps the tree in a single
//! `{owner}-{repo}-{sha}/` directory; that directory is what callers get.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;

use mcpscan_core::MATERIALIZE_ATTEMPTS;

use crate::client::GitHubClient;
use crate::error::{GitHubError, GitHubResult};
use crate::http::HttpBackend;
use crate::url::build_tarball_url;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

impl<B: HttpBackend> GitHubClient<B> {
    /// Download and unpack `branch` of `owner/repo` into `dest`, retrying
    /// with exponential backoff. A failed attempt leaves nothing behind.
    pub(crate) async fn materialize(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        dest: &Path,
    ) -> GitHubResult<PathBuf> {
        let url = build_tarball_url(&self.config, owner, repo, branch);
        let full_name = format!("{owner}/{repo}");
        let mut attempt = 0;

        loop {
            attempt += 1;
            let result = match self.backend.get_bytes(&url).await {
                Ok(bytes) => unpack_tarball(bytes, dest.to_path_buf()).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(root) => {
                    tracing::info!(repo = %full_name, branch, path = %root.display(), "Repository downloaded");
                    return Ok(root);
                }
                Err(e) => {
                    discard(dest).await;
                    if attempt >= MATERIALIZE_ATTEMPTS || matches!(e, GitHubError::NotFound { .. }) {
                        tracing::error!(repo = %full_name, branch, attempt, error = %e, "Repository download failed");
                        return Err(e);
                    }
                    let delay = Duration::from_millis(
                        self.config.retry_base_delay_ms.saturating_mul(1_u64 << (attempt - 1)),
                    );
                    tracing::warn!(repo = %full_name, attempt, ?delay, error = %e, "Retrying repository download");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

async fn discard(dest: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(dest).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %dest.display(), error = %e, "Failed to clean up partial download");
        }
    }
}

async fn unpack_tarball(bytes: Vec<u8>, dest: PathBuf) -> GitHubResult<PathBuf> {
    if !bytes.starts_with(&GZIP_MAGIC) {
        return Err(GitHubError::Archive {
            message: format!("expected a gzip tarball, got {} bytes of something else", bytes.len()),
        });
    }

    tokio::task::spawn_blocking(move || {
        std::fs::create_dir_all(&dest)?;
        let decoder = flate2::read::GzDecoder::new(Cursor::new(bytes));
        let mut archive = tar::Archive::new(decoder);
        archive.unpack(&dest).map_err(|e| GitHubError::Archive {
            message: format!("failed to extract tarball: {e}"),
        })?;
        tree_root(&dest)
    })
    .await
    .map_err(|e| GitHubError::Archive {
        message: format!("extraction task failed: {e}"),
    })?
}

/// The single top-level directory of an unpacked tarball, or `dest` itself.
fn tree_root(dest: &Path) -> GitHubResult<PathBuf> {
    let entries: Vec<_> = std::fs::read_dir(dest)?.collect::<Result<_, _>>()?;
    if let [only] = entries.as_slice() {
        if only.file_type()?.is_dir() {
            return Ok(only.path());
        }
    }
    Ok(dest.to_path_buf())
}
