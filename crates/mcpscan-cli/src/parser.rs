//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for mcpscan.
///
/// Global options configure the GitHub connection; subcommands do the work.
#[derive(Parser)]
#[command(name = "mcpscan")]
#[command(about = "Scan forked MCP server repositories for security alerts and runtimes")]
#[command(version)]
pub struct Cli {
    /// GitHub token (falls back to GH_TOKEN)
    #[arg(long, env = "GITHUB_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// GitHub API base URL, for GitHub Enterprise
    #[arg(long = "api-url", env = "MCPSCAN_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parser_builds() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_args() {
        let cli = Cli::parse_from([
            "mcpscan",
            "--verbose",
            "--api-url",
            "https://ghe.example.com/api/v3",
            "rate-limit",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.api_url.as_deref(), Some("https://ghe.example.com/api/v3"));
        assert!(matches!(cli.command, Some(Commands::RateLimit)));
    }

    #[test]
    fn test_no_command() {
        let cli = Cli::parse_from(["mcpscan"]);
        assert!(cli.command.is_none());
    }
}
