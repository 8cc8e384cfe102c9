//! CLI entry point - the composition root.
//!
//! Only network commands bootstrap the GitHub client; `detect` runs offline.

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use mcpscan_cli::handlers::{detect, fork, property_summary, rate_limit, report, scan};
use mcpscan_cli::{Cli, CliConfig, CliError, Commands, bootstrap};
use mcpscan_core::CatalogSource;

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables before clap reads them
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = u8::try_from(CliError::exit_code_for(&e)).unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

/// Logs go to stderr so `detect` output on stdout stays machine-readable.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        // No command provided - show help
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = CliConfig::from_args(cli.token, cli.api_url);
    let connect = || bootstrap(&config);

    match command {
        Commands::Detect {
            path,
            string_aware,
            max_file_bytes,
            show_composition,
        } => detect::execute(&detect::DetectArgs {
            path,
            string_aware,
            max_file_bytes,
            show_composition,
        }),
        Commands::Scan {
            org,
            num_repos,
            issue_repo,
            no_issues,
            work_dir,
            severity_map,
            skip_runtime,
            scan_frequency_days,
        } => {
            let args = scan::ScanArgs {
                org,
                num_repos,
                issue_repo: (!no_issues).then_some(issue_repo),
                work_dir,
                severity_map,
                skip_runtime,
                scan_frequency_days,
            };
            scan::execute(&connect()?, &args).await
        }
        Commands::Fork {
            org,
            catalog_dir,
            awesome_list,
            limit,
        } => {
            let sources = catalog_dir
                .map(CatalogSource::Directory)
                .into_iter()
                .chain(awesome_list.map(CatalogSource::AwesomeList))
                .collect();
            fork::execute(&connect()?, &fork::ForkArgs { org, sources, limit }).await
        }
        Commands::Report { org, output_dir } => {
            let args = report::ReportArgs {
                org,
                output_dir,
                hide_repositories: report::running_in_ci(),
            };
            report::execute(&connect()?, &args).await
        }
        Commands::PropertySummary {
            org,
            output_dir,
            json_only,
        } => {
            let args = property_summary::PropertySummaryArgs {
                org,
                output_dir,
                json_only,
            };
            property_summary::execute(&connect()?, &args).await
        }
        Commands::RateLimit => rate_limit::execute(&connect()?).await,
    }
}
