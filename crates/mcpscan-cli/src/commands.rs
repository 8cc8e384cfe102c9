//! Available subcommands.

use std::path::PathBuf;

use clap::{ArgGroup, Subcommand};
use mcpscan_core::properties::{DEFAULT_ISSUE_REPO, DEFAULT_ORG, SCAN_FREQUENCY_DAYS};
use mcpscan_core::services::AWESOME_MCP_SERVERS_README;

#[derive(Subcommand)]
pub enum Commands {
    /// Record GHAS alert counts and MCP runtimes for the forks of an organization
    Scan {
        /// Organization whose forks are scanned
        #[arg(long, default_value = DEFAULT_ORG)]
        org: String,
        /// Stop after this many repositories have been scanned
        #[arg(long = "num-repos", default_value_t = 10)]
        num_repos: usize,
        /// Repository in the organization receiving analysis-failure issues
        #[arg(long = "issue-repo", default_value = DEFAULT_ISSUE_REPO)]
        issue_repo: String,
        /// Do not file issues for analysis failures
        #[arg(long = "no-issues")]
        no_issues: bool,
        /// Directory repositories are downloaded into
        #[arg(long = "work-dir", default_value = "tmp")]
        work_dir: PathBuf,
        /// JSON file mapping code scanning severities to buckets
        #[arg(long = "severity-map")]
        severity_map: Option<PathBuf>,
        /// Only record alert counts
        #[arg(long = "skip-runtime")]
        skip_runtime: bool,
        /// Days before a scanned repository is scanned again
        #[arg(long = "scan-frequency-days", default_value_t = SCAN_FREQUENCY_DAYS)]
        scan_frequency_days: i64,
    },

    /// Find the MCP server composition in a local directory
    Detect {
        /// Directory to search
        path: PathBuf,
        /// Ignore braces inside string literals when extracting JSON
        #[arg(long = "string-aware")]
        string_aware: bool,
        /// Skip files larger than this many bytes
        #[arg(long = "max-file-bytes")]
        max_file_bytes: Option<u64>,
        /// Also print the recovered composition
        #[arg(long = "show-composition")]
        show_composition: bool,
    },

    /// Fork the repositories listed in MCP server catalogs
    #[command(group(
        ArgGroup::new("catalog")
            .args(["catalog_dir", "awesome_list"])
            .required(true)
            .multiple(true)
    ))]
    Fork {
        /// Organization receiving the forks
        #[arg(long, default_value = DEFAULT_ORG)]
        org: String,
        /// Directory of catalog JSON files carrying a `githubUrl`
        #[arg(long = "catalog-dir")]
        catalog_dir: Option<PathBuf>,
        /// Awesome-list README whose GitHub repository links are forked
        #[arg(
            long = "awesome-list",
            value_name = "URL",
            num_args = 0..=1,
            default_missing_value = AWESOME_MCP_SERVERS_README
        )]
        awesome_list: Option<String>,
        /// Number of entries taken from each catalog
        #[arg(long, default_value_t = 3)]
        limit: usize,
    },

    /// Write the organization security report
    Report {
        /// Organization to report on
        #[arg(long, default_value = DEFAULT_ORG)]
        org: String,
        /// Directory the JSON and markdown reports are written to
        #[arg(long = "output-dir", default_value = "reports")]
        output_dir: PathBuf,
    },

    /// Summarize the custom property values stored across an organization
    PropertySummary {
        /// Organization to analyze
        #[arg(long, default_value = DEFAULT_ORG)]
        org: String,
        /// Directory the summary files are written to
        #[arg(long = "output-dir", default_value = "reports")]
        output_dir: PathBuf,
        /// Only write the JSON summary
        #[arg(long = "json-only")]
        json_only: bool,
    },

    /// Show the remaining GitHub API quota
    RateLimit,
}
