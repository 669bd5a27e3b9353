//! Sitegauge main entry point
//!
//! This is the command-line interface for the Sitegauge website performance
//! crawl auditor.

use anyhow::Context;
use clap::Parser;
use sitegauge::audit::HttpProbeAuditor;
use sitegauge::config::{clamp_max_pages, load_config_with_hash, validate_base_url, Config};
use sitegauge::crawler::{discover_pages, Crawler};
use sitegauge::output::{format_json_report, generate_markdown_summary, print_report};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Sitegauge: a website performance crawl auditor
///
/// Sitegauge probes a website's pages, measures page-load and API-call
/// timings, and aggregates the observations into a report with derived
/// alerts.
#[derive(Parser, Debug)]
#[command(name = "sitegauge")]
#[command(version = "1.0.0")]
#[command(about = "A website performance crawl auditor", long_about = None)]
struct Cli {
    /// Base URL of the site to analyze
    #[arg(value_name = "URL")]
    url: String,

    /// Maximum number of pages to audit (clamped to 1-20)
    #[arg(short = 'p', long)]
    max_pages: Option<usize>,

    /// Path to optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// List the pages that would be audited and exit
    #[arg(long, conflicts_with_all = ["json", "single"])]
    discover_only: bool,

    /// Audit just the given URL instead of crawling
    #[arg(long, conflicts_with = "discover_only")]
    single: bool,

    /// Print the report as JSON instead of the text layout
    #[arg(long)]
    json: bool,

    /// Write a markdown summary to this path
    #[arg(long, value_name = "PATH")]
    summary: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    // Load configuration, or fall back to defaults when no file is given
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    // Boundary validation before the core runs
    let base_url = validate_base_url(&cli.url)?;
    let max_pages = clamp_max_pages(cli.max_pages.or(Some(config.crawl.max_pages)));

    if cli.discover_only {
        handle_discover_only(base_url.as_str(), max_pages);
        return Ok(());
    }

    let auditor = HttpProbeAuditor::new(config.auditor.clone())?;
    let crawler = Crawler::new(auditor, config.crawl.clone());

    if cli.single {
        return handle_single_audit(&crawler, base_url.as_str()).await;
    }

    tracing::info!(
        "Starting crawl of {} with page budget {}",
        base_url,
        max_pages
    );

    let report = match crawler.run_crawl(base_url.as_str(), max_pages).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    if cli.json {
        println!("{}", format_json_report(&report)?);
    } else {
        print_report(&report);
    }

    // Markdown summary: CLI flag wins over config
    let summary_path = cli
        .summary
        .or_else(|| config.output.summary_path.as_ref().map(PathBuf::from));
    if let Some(path) = summary_path {
        generate_markdown_summary(&report, &path)?;
        println!("\n✓ Summary written to: {}", path.display());
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitegauge=info,warn"),
            1 => EnvFilter::new("sitegauge=debug,info"),
            2 => EnvFilter::new("sitegauge=trace,debug"),
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

/// Handles --discover-only: shows what would be audited without crawling
fn handle_discover_only(base_url: &str, max_pages: usize) {
    println!("=== Sitegauge Discovery ===\n");
    let pages = discover_pages(base_url, max_pages);
    println!("Would audit {} page(s):", pages.len());
    for (i, page) in pages.iter().enumerate() {
        println!("  {}. {}", i + 1, page);
    }
}

/// Handles --single: audits one URL and prints its page report
async fn handle_single_audit(
    crawler: &Crawler<HttpProbeAuditor>,
    url: &str,
) -> anyhow::Result<()> {
    let page = crawler.run_single_audit(url).await?;

    println!("=== Single Page Audit: {} ===\n", page.url);
    println!("Scores: {:?}", page.scores);
    println!("API calls: {}", page.api_calls.len());
    for call in &page.api_calls {
        println!(
            "  {} {} - {}ms, status {}, payload {}",
            call.method, call.endpoint, call.duration, call.status, call.payload_size
        );
    }

    Ok(())
}
