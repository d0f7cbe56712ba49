//! Quote-Trawler main entry point
//!
//! This is the command-line interface for the Quote-Trawler scraper.

use anyhow::Context;
use clap::Parser;
use quote_trawler::config::{parse_config, validate, Config};
use quote_trawler::crawler::crawl;
use quote_trawler::StopReason;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Quote-Trawler: a polite paginated scraper
///
/// Quote-Trawler walks a paginated site through its "next" links, respecting
/// robots.txt and pausing between pages, and saves every record it finds to
/// a CSV file.
#[derive(Parser, Debug)]
#[command(name = "quote-trawler")]
#[command(version)]
#[command(about = "A polite paginated scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Stop after this many pages
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    max_pages: Option<u32>,

    /// CSV file to write
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,

    /// Site to crawl, overriding the configured origin
    #[arg(long, value_name = "URL")]
    origin: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = parse_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Config::default()
        }
    };

    // Flags replace file values, so validation runs on the merged result
    apply_overrides(&mut config, &cli);
    validate(&config).context("Invalid configuration")?;

    if cli.dry_run {
        print_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("quote_trawler=info,warn"),
            1 => EnvFilter::new("quote_trawler=debug,info"),
            2 => EnvFilter::new("quote_trawler=trace,debug"),
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

/// Applies command-line overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = Some(max_pages);
    }
    if let Some(output) = &cli.output {
        config.output.csv_path = output.clone();
    }
    if let Some(origin) = &cli.origin {
        config.crawler.origin = origin.clone();
    }
}

/// Handles the --dry-run mode: shows the effective configuration
fn print_dry_run(config: &Config) {
    println!("=== Quote-Trawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Origin: {}", config.crawler.origin);
    match config.crawler.max_pages {
        Some(max) => println!("  Max pages: {}", max),
        None => println!("  Max pages: unlimited"),
    }
    println!(
        "  Politeness delay: {:.1}s - {:.1}s",
        config.crawler.min_delay_secs, config.crawler.max_delay_secs
    );
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);

    println!("\nUser Agent:");
    println!("  Header: {}", config.user_agent.header_value());
    println!("  Robots token: {}", config.user_agent.crawler_name);

    println!("\nRetry:");
    println!("  Max attempts: {}", config.retry.max_attempts);
    println!("  Backoff factor: {}", config.retry.backoff_factor);
    println!("  Retried statuses: {:?}", config.retry.status_forcelist);

    println!("\nOutput:");
    println!("  CSV: {}", config.output.csv_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!("Starting crawl of {}", config.crawler.origin);

    let report = crawl(config).await.map_err(|e| {
        tracing::error!("Crawl failed: {}", e);
        e
    })?;

    match &report.stop_reason {
        StopReason::Completed => tracing::info!("Crawl completed: no more pages"),
        StopReason::PageLimitReached { limit } => {
            tracing::info!("Crawl stopped at the {}-page limit", limit)
        }
        StopReason::PermissionDenied => tracing::info!("Crawl skipped: disallowed by robots.txt"),
        StopReason::FetchFailed { url, .. } => {
            tracing::warn!("Crawl aborted at {}; partial results kept", url)
        }
    }

    tracing::info!(
        "{} pages fetched, {} records collected",
        report.pages_fetched,
        report.records.len()
    );

    Ok(())
}
