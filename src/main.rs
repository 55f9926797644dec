//! Page-Archiver main entry point
//!
//! This is the command-line interface for the Page-Archiver single-file page
//! archiver.

use anyhow::{bail, Context};
use clap::Parser;
use page_archiver::config::{load_config, Config};
use page_archiver::Archiver;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Page-Archiver: save web pages as single self-contained HTML files
///
/// Each page is downloaded, its stylesheets, fonts and images are inlined as
/// base64 data URIs, scripts are dropped, and the result is written to
/// "<page title>.html" in the output directory.
#[derive(Parser, Debug)]
#[command(name = "page-archiver")]
#[command(version)]
#[command(about = "Save web pages as single self-contained HTML files", long_about = None)]
struct Cli {
    /// URLs of the pages to archive
    #[arg(value_name = "URL", required = true)]
    urls: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory archives are written into (overrides the config file)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Give up on a rate-limited resource after this many retries
    #[arg(long, value_name = "N")]
    max_retries: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;
    let output_dir = config.output.directory.clone();

    tokio::fs::create_dir_all(&output_dir)
        .await
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let archiver = Archiver::from_config(&config).context("Failed to set up archiver")?;
    let report = archiver.archive_all(&output_dir, &cli.urls).await;

    tracing::info!(
        "Archived {} of {} page(s) into {}",
        report.len() - report.failure_count(),
        report.len(),
        output_dir.display()
    );

    if !report.is_success() {
        for (url, e) in report.failures() {
            tracing::error!("{}: {}", url, e);
        }
        bail!("{} page(s) failed to archive", report.failure_count());
    }

    Ok(())
}

/// Loads the configuration file, if any, and applies command-line overrides
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.clone();
    }
    if let Some(max_retries) = cli.max_retries {
        config.retry.max_retries = Some(max_retries);
    }

    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("page_archiver=info,warn"),
            1 => EnvFilter::new("page_archiver=debug,info"),
            2 => EnvFilter::new("page_archiver=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
