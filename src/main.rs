//! review-scraper - Heuristic product-review scraper
//!
//! Fetches review listing pages with TLS fingerprint emulation and exports
//! the extracted reviews to CSV and JSON.

use anyhow::Result;
use clap::{Parser, Subcommand};
use review_scraper::commands::{ParseCommand, ScrapeCommand};
use review_scraper::config::{Config, OutputFormat};
use review_scraper::format::{self, Formatter};
use review_scraper::ReviewRecord;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "review-scraper",
    version,
    about = "Heuristic product-review scraper",
    long_about = "Scrapes paginated product-review listings and exports them to CSV and JSON."
)]
struct Cli {
    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "REVIEWS_PROXY")]
    proxy: Option<String>,

    /// Delay between page requests in milliseconds
    #[arg(long, global = true, env = "REVIEWS_DELAY")]
    delay: Option<u64>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Console preview format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Number of reviews shown in the console preview
    #[arg(long, global = true)]
    preview: Option<usize>,

    /// CSV output path
    #[arg(long, global = true)]
    csv: Option<PathBuf>,

    /// JSON output path
    #[arg(long, global = true)]
    json: Option<PathBuf>,

    /// Site-specific class token marking a review container
    #[arg(long, global = true)]
    marker: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape reviews from a listing URL
    #[command(alias = "s")]
    Scrape {
        /// Review listing URL (page 1)
        url: String,

        /// Maximum number of pages to visit
        #[arg(short, long, env = "REVIEWS_PAGES")]
        pages: Option<u32>,
    },

    /// Extract reviews from a saved HTML page
    #[command(alias = "p")]
    Parse {
        /// HTML file to read
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }
    if let Some(delay) = cli.delay {
        config.delay_ms = delay;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(preview) = cli.preview {
        config.preview = preview;
    }
    if let Some(csv) = cli.csv {
        config.csv_path = csv;
    }
    if let Some(json) = cli.json {
        config.json_path = json;
    }
    if let Some(marker) = cli.marker {
        config.container_marker = Some(marker);
    }

    let reviews = match cli.command {
        Commands::Scrape { url, pages } => {
            if let Some(pages) = pages {
                config.max_pages = pages;
            }

            let report = ScrapeCommand::new(config.clone()).execute(&url).await?;
            if !report.failed_pages.is_empty() {
                eprintln!("Failed pages: {:?}", report.failed_pages);
            }
            report.reviews
        }

        Commands::Parse { file } => ParseCommand::new(&config).execute(&file)?.records,
    };

    finish(&config, &reviews)
}

/// Prints the summary and preview, then writes both output files.
fn finish(config: &Config, reviews: &[ReviewRecord]) -> Result<()> {
    println!("\nTotal reviews scraped: {}", reviews.len());

    if config.preview > 0 {
        let sample = &reviews[..reviews.len().min(config.preview)];
        println!("{}", Formatter::new(config.format).format_reviews(sample));
    }

    format::write_csv(&config.csv_path, reviews)?;
    format::write_json(&config.json_path, reviews)?;

    println!("Scraping completed!");
    Ok(())
}
