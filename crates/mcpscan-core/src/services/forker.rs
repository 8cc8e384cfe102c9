//! Forking repositories listed in external server catalogs.
//!
//! Two kinds of catalog are read:
//!
//! - a directory of `*.json` files, each describing one MCP server with at
//!   least a `githubUrl` field
//! - an awesome-list README, whose `github.com/<owner>/<repo>` links are the
//!   entries

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use serde::Deserialize;
use url::Url;

use super::ServiceError;
use crate::ports::{CatalogSourcePort, ForkManagerPort};

/// README of the awesome-mcp-servers list.
pub const AWESOME_MCP_SERVERS_README: &str =
    "https://raw.githubusercontent.com/punkpeye/awesome-mcp-servers/main/README.md";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogEntry {
    github_url: Option<String>,
}

/// Where catalog entries come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// Directory of catalog JSON files, read in file name order
    Directory(PathBuf),
    /// Markdown document linking to repositories
    AwesomeList(String),
}

impl CatalogSource {
    /// Label used in the per-source counts.
    pub fn name(&self) -> String {
        match self {
            Self::Directory(dir) => dir
                .file_name()
                .map_or_else(|| dir.display().to_string(), |name| name.to_string_lossy().into_owned()),
            Self::AwesomeList(url) if url == AWESOME_MCP_SERVERS_README => {
                "awesome_mcp_servers".to_string()
            }
            Self::AwesomeList(url) => url.clone(),
        }
    }
}

/// Result of one catalog run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForkRunSummary {
    /// Catalog entries read (after applying the limit)
    pub files_considered: usize,
    /// Entries read per source, keyed by [`CatalogSource::name`]
    pub sources: BTreeMap<String, usize>,
    /// Unique source repositories processed
    pub processed: usize,
    pub forks_created: usize,
    pub already_forked: usize,
    /// Entries without a usable URL, duplicates, and name collisions
    pub skipped: usize,
    pub dependabot_configured: usize,
    /// `(source, reason)` for sources that could not be forked
    pub failures: Vec<(String, String)>,
}

pub struct CatalogForkService {
    forks: Arc<dyn ForkManagerPort>,
    catalogs: Option<Arc<dyn CatalogSourcePort>>,
}

impl CatalogForkService {
    pub fn new(forks: Arc<dyn ForkManagerPort>) -> Self {
        Self {
            forks,
            catalogs: None,
        }
    }

    /// Enable [`CatalogSource::AwesomeList`] sources.
    #[must_use]
    pub fn with_catalog_source(mut self, catalogs: Arc<dyn CatalogSourcePort>) -> Self {
        self.catalogs = Some(catalogs);
        self
    }

    /// Fork the first `limit` catalog entries (sorted by file name) into `org`.
    pub async fn run(
        &self,
        catalog_dir: &Path,
        org: &str,
        limit: usize,
    ) -> Result<ForkRunSummary, ServiceError> {
        self.run_sources(&[CatalogSource::Directory(catalog_dir.to_path_buf())], org, limit)
            .await
    }

    /// Fork the first `limit` entries of each source into `org`.
    ///
    /// A source repository listed more than once, in one source or across
    /// several, is processed once.
    pub async fn run_sources(
        &self,
        sources: &[CatalogSource],
        org: &str,
        limit: usize,
    ) -> Result<ForkRunSummary, ServiceError> {
        let mut summary = ForkRunSummary::default();
        let mut seen = HashSet::new();

        for source in sources {
            let entries = self.load(source, limit).await?;
            summary.files_considered += entries.len();
            summary.sources.insert(source.name(), entries.len());

            for entry in entries {
                let Some((owner, repo)) = entry else {
                    summary.skipped += 1;
                    continue;
                };

                let full_name = format!("{owner}/{repo}");
                if !seen.insert(full_name.to_ascii_lowercase()) {
                    tracing::info!(source = %full_name, "Skipping duplicate source repository");
                    summary.skipped += 1;
                    continue;
                }

                summary.processed += 1;
                self.fork_one(&owner, &repo, org, &mut summary).await;
            }
        }

        tracing::info!(
            processed = summary.processed,
            created = summary.forks_created,
            existing = summary.already_forked,
            dependabot = summary.dependabot_configured,
            "Catalog processing complete"
        );
        Ok(summary)
    }

    /// Up to `limit` entries of `source`; `None` marks an unusable entry.
    async fn load(
        &self,
        source: &CatalogSource,
        limit: usize,
    ) -> Result<Vec<Option<(String, String)>>, ServiceError> {
        match source {
            CatalogSource::Directory(dir) => {
                let files = catalog_files(dir).await?;
                let selected = &files[..limit.min(files.len())];
                tracing::info!(
                    found = files.len(),
                    processing = selected.len(),
                    dir = %dir.display(),
                    "Catalog files"
                );
                let mut entries = Vec::with_capacity(selected.len());
                for file in selected {
                    entries.push(read_source(file).await);
                }
                Ok(entries)
            }
            CatalogSource::AwesomeList(url) => {
                let Some(catalogs) = &self.catalogs else {
                    tracing::warn!(url = %url, "No catalog source configured, skipping awesome list");
                    return Ok(Vec::new());
                };
                let links = load_awesome_list(catalogs.as_ref(), url).await;
                tracing::info!(found = links.len(), url = %url, "Awesome list repositories");
                Ok(links
                    .iter()
                    .take(limit)
                    .map(|link| parse_github_url(link))
                    .collect())
            }
        }
    }

    async fn fork_one(&self, owner: &str, repo: &str, org: &str, summary: &mut ForkRunSummary) {
        let source = format!("{owner}/{repo}");
        let target = fork_name(owner, repo);

        match self.forks.get_repository(org, &target).await {
            Ok(Some(existing)) if existing.is_fork_of(&source) => {
                tracing::info!(fork = %existing.full_name, "Fork already exists");
                summary.already_forked += 1;
            }
            Ok(Some(existing)) => {
                tracing::warn!(
                    repo = %existing.full_name,
                    source = %source,
                    "Repository exists but is not a fork of the source, skipping"
                );
                summary.skipped += 1;
                return;
            }
            Ok(None) => {
                tracing::info!(source = %source, org, name = %target, "Creating fork");
                if let Err(e) = self.forks.create_fork(owner, repo, org, &target).await {
                    tracing::error!(source = %source, error = %e, "Fork creation failed");
                    summary.failures.push((source, e.to_string()));
                    return;
                }
                summary.forks_created += 1;
            }
            Err(e) => {
                tracing::error!(repo = %target, error = %e, "Could not check for existing fork");
                summary.failures.push((source, e.to_string()));
                return;
            }
        }

        if let Err(e) = self.forks.enable_security_features(org, &target).await {
            tracing::warn!(repo = %target, error = %e, "Could not enable security features");
        }

        match self.forks.has_dependabot_config(org, &target).await {
            Ok(true) => summary.dependabot_configured += 1,
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(repo = %target, error = %e, "Could not check Dependabot config");
            }
        }
    }
}

/// Name of the fork in the scanning organization: `<owner>__<repo>`.
pub fn fork_name(owner: &str, repo: &str) -> String {
    format!("{owner}__{repo}")
}

/// Owner and repository from a `github.com` URL; `.git` is stripped.
pub fn parse_github_url(raw: &str) -> Option<(String, String)> {
    let url = Url::parse(raw).ok()?;
    if !url.host_str()?.eq_ignore_ascii_case("github.com") {
        return None;
    }
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
    let owner = segments.next()?;
    let repo = segments.next()?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if repo.is_empty() {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}

/// Repository links of an awesome-list document.
///
/// Only `https://github.com/<owner>/<repo>` links count: profile links and
/// in-page anchors are not repositories. Links are returned in document
/// order, normalized and without duplicates.
pub fn awesome_list_links(markdown: &str) -> Result<Vec<String>, regex::Error> {
    let pattern = Regex::new(r"https?://github\.com/[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+")?;

    let mut seen = HashSet::new();
    Ok(pattern
        .find_iter(markdown)
        .filter_map(|m| parse_github_url(m.as_str()))
        .map(|(owner, repo)| format!("https://github.com/{owner}/{repo}"))
        .filter(|link| seen.insert(link.to_ascii_lowercase()))
        .collect())
}

/// Fetch an awesome-list document and extract its repository links.
///
/// A document that cannot be fetched yields no links.
pub async fn load_awesome_list(catalogs: &dyn CatalogSourcePort, url: &str) -> Vec<String> {
    let markdown = match catalogs.fetch_document(url).await {
        Ok(markdown) => markdown,
        Err(e) => {
            tracing::error!(url, error = %e, "Could not fetch awesome list");
            return Vec::new();
        }
    };
    match awesome_list_links(&markdown) {
        Ok(links) => links,
        Err(e) => {
            tracing::error!(error = %e, "Invalid repository link pattern");
            Vec::new()
        }
    }
}

async fn catalog_files(dir: &Path) -> Result<Vec<PathBuf>, ServiceError> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| ServiceError::io(dir, e))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ServiceError::io(dir, e))?
    {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

async fn read_source(file: &Path) -> Option<(String, String)> {
    let raw = match tokio::fs::read_to_string(file).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::error!(file = %file.display(), error = %e, "Could not read catalog file");
            return None;
        }
    };

    let entry: CatalogEntry = match serde_json::from_str(&raw) {
        Ok(entry) => entry,
        Err(e) => {
            tracing::error!(file = %file.display(), error = %e, "Skipping invalid catalog JSON");
            return None;
        }
    };

    let Some(url) = entry.github_url else {
        tracing::warn!(file = %file.display(), "Skipping entry without githubUrl");
        return None;
    };

    let parsed = parse_github_url(&url);
    if parsed.is_none() {
        tracing::warn!(file = %file.display(), url = %url, "Could not parse owner/repo from URL");
    }
    parsed
}
