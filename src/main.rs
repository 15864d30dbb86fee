// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging at the requested level
// 3. Run the crawl
// 4. Exit with proper code (0 = archived, 1 = crawl failed, 2 = bad options)
// =============================================================================

mod archive; // src/archive/ - file names and the results writer
mod cli; // src/cli.rs - command-line parsing
mod crawl; // src/crawl/ - the crawl itself
mod scrape; // src/scrape/ - fetching pages and extracting links

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use crawl::Crawler;
use tracing::info;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::from(cli.log_level))
        .with_target(false)
        .init();

    let config = cli.crawl_config();
    if let Err(e) = config.validate() {
        eprintln!("Error: {:#}", e);
        std::process::exit(2);
    }

    let exit_code = match run(&cli.seed_url, config).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

// Runs one crawl. A partially successful crawl (some links failed) is
// still Ok; only a failed seed fetch or an unusable results directory
// comes back as Err.
async fn run(seed_url: &str, config: crawl::CrawlConfig) -> Result<()> {
    let crawler = Crawler::new(config).context("Failed to set up the crawler")?;

    let report = crawler
        .run(seed_url)
        .await
        .with_context(|| format!("Scraping {} was unsuccessful", seed_url))?;

    info!(
        "Archived {} page(s) into {}",
        report.pages_written,
        report.output_dir.display()
    );
    Ok(())
}
