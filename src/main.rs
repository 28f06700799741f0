//! Review-Harvest main entry point
//!
//! This is the command-line interface for the Review-Harvest review scraper.

use anyhow::Context;
use clap::Parser;
use review_harvest::config::{load_config_with_hash, Config};
use review_harvest::crawler::run_harvest;
use review_harvest::input::{load_seeds, Seed};
use review_harvest::output::{file_name_for, load_statistics, print_statistics, write_report};
use review_harvest::pagination::PAGE_SIZE;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Review-Harvest: paginated review scraping through a headless browser
///
/// Review-Harvest visits every seed listing through a WebDriver-controlled
/// browser, walks all of its review pages and writes one JSON file of
/// normalized reviews per seed.
#[derive(Parser, Debug)]
#[command(name = "review-harvest")]
#[command(version = "1.0.0")]
#[command(about = "Paginated review scraping through a headless browser", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Skip seeds whose output file already exists
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    resume: bool,

    /// Validate config and seed list and show what would be harvested
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics over the existing output files and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.stats {
        return handle_stats(&config);
    }

    let seeds_path = Path::new(&config.input.seeds_path);
    let seeds = load_seeds(seeds_path)
        .with_context(|| format!("Failed to load seed list {}", seeds_path.display()))?;
    tracing::info!("Loaded {} seeds", seeds.len());

    if cli.dry_run {
        handle_dry_run(&config, &seeds);
        return Ok(());
    }

    handle_harvest(&config, &config_hash, &seeds, cli.resume).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("review_harvest=info,warn"),
            1 => EnvFilter::new("review_harvest=debug,info"),
            2 => EnvFilter::new("review_harvest=trace,debug"),
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

/// Handles the --dry-run mode: shows the configuration and the planned output files
fn handle_dry_run(config: &Config, seeds: &[Seed]) {
    println!("=== Review-Harvest Dry Run ===\n");

    println!("Browser:");
    println!("  WebDriver: {}", config.browser.webdriver_url);
    println!("  Headless: {}", config.browser.headless);
    println!(
        "  Window: {}x{}",
        config.browser.window_width, config.browser.window_height
    );
    println!("  Args: {}", config.browser.args.join(" "));

    println!("\nCrawler:");
    println!("  Page size: {}", PAGE_SIZE);
    println!(
        "  Readiness timeout: {}ms (poll every {}ms)",
        config.crawler.readiness_timeout_ms, config.crawler.poll_interval_ms
    );
    println!(
        "  Retries: {} (backoff {}ms, max {}ms)",
        config.crawler.max_retries, config.crawler.retry_backoff_ms, config.crawler.max_backoff_ms
    );

    println!("\nOutput:");
    println!("  Data directory: {}", config.output.data_dir);
    if let Some(report) = &config.output.report_path {
        println!("  Report: {}", report);
    }

    let mut invalid = 0;
    println!("\nSeeds ({}):", seeds.len());
    for seed in seeds {
        match seed.validate() {
            Ok(_) => println!("  [{}] {} -> {}", seed.position, seed.url, file_name_for(seed)),
            Err(e) => {
                invalid += 1;
                println!("  [{}] ✗ {}", seed.position, e);
            }
        }
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would harvest {} seeds", seeds.len() - invalid);
    if invalid > 0 {
        println!("✗ {} seeds would fail: unusable webUrl", invalid);
    }
}

/// Handles the --stats mode: summarizes the existing output files
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Data directory: {}\n", config.output.data_dir);

    let stats = load_statistics(Path::new(&config.output.data_dir))
        .with_context(|| format!("Failed to read {}", config.output.data_dir))?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main harvest
async fn handle_harvest(
    config: &Config,
    config_hash: &str,
    seeds: &[Seed],
    resume: bool,
) -> anyhow::Result<()> {
    if resume {
        tracing::info!("Resuming: seeds with an existing output file are skipped");
    }

    let report = run_harvest(config, seeds, resume)
        .await?
        .with_config_hash(config_hash);

    if let Some(report_path) = &config.output.report_path {
        write_report(&report, Path::new(report_path))
            .with_context(|| format!("Failed to write report {}", report_path))?;
        tracing::info!("Run report written to {}", report_path);
    }

    for failure in &report.failures {
        tracing::warn!(
            "Failed seed {} ({}): {}",
            failure.position,
            failure.kind,
            failure.url
        );
    }

    Ok(())
}
