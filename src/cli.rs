// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// There's one required argument, the seed URL. Everything else is optional
// and defaults to the plain behaviour: 10 second timeout, no cap on
// concurrent fetches, error pages archived like any other page, results
// written next to wherever you ran the command.
// =============================================================================

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use crate::crawl::{CrawlConfig, DEFAULT_TIMEOUT_SECS};
use crate::scrape::StatusPolicy;

#[derive(Parser, Debug)]
#[command(
    name = "link-archiver",
    version = "0.1.0",
    about = "Save a web page and every page it links to",
    long_about = "link-archiver fetches a page, finds every <a href> on it, fetches each of those \
                  pages too (one level deep only), and saves them all into a \
                  <host_path>_results directory for offline reading."
)]
pub struct Cli {
    /// URL of the page to start from (e.g., https://example.com)
    pub seed_url: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Maximum number of pages fetched at the same time (default: no limit)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Treat non-2xx responses as failures instead of archiving them
    #[arg(long)]
    pub reject_http_errors: bool,

    /// Directory to create the results directory in (default: current directory)
    #[arg(long)]
    pub output_root: Option<PathBuf>,

    /// Logging level
    #[arg(long, default_value = "info", value_enum)]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

impl Cli {
    pub fn crawl_config(&self) -> CrawlConfig {
        let status_policy = if self.reject_http_errors {
            StatusPolicy::Reject
        } else {
            StatusPolicy::Accept
        };

        let config = CrawlConfig::default()
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_concurrency(self.concurrency)
            .with_status_policy(status_policy);

        match &self.output_root {
            Some(root) => config.with_output_root(root),
            None => config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_url_only() {
        let cli = Cli::try_parse_from(["link-archiver", "https://example.com"]).unwrap();
        let config = cli.crawl_config();

        assert_eq!(cli.seed_url, "https://example.com");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.concurrency, None);
        assert_eq!(config.status_policy, StatusPolicy::Accept);
        assert_eq!(config.output_root, None);
    }

    #[test]
    fn test_all_options() {
        let cli = Cli::try_parse_from([
            "link-archiver",
            "https://example.com",
            "--timeout-secs",
            "30",
            "--concurrency",
            "8",
            "--reject-http-errors",
            "--output-root",
            "/tmp/archive",
            "--log-level",
            "debug",
        ])
        .unwrap();
        let config = cli.crawl_config();

        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.concurrency, Some(8));
        assert_eq!(config.status_policy, StatusPolicy::Reject);
        assert_eq!(config.output_root, Some(PathBuf::from("/tmp/archive")));
        assert_eq!(tracing::Level::from(cli.log_level), tracing::Level::DEBUG);
    }

    #[test]
    fn test_wrong_argument_count_is_rejected() {
        assert!(Cli::try_parse_from(["link-archiver"]).is_err());
        assert!(Cli::try_parse_from(["link-archiver", "https://a.com", "https://b.com"]).is_err());
    }
}
