// src/crawl/mod.rs
// =============================================================================
// This module handles the crawl itself.
//
// Features:
// - Fetches a seed page, then every page it links to, concurrently
// - Goes exactly one hop deep (child pages are saved, not followed)
// - Optional cap on how many fetches run at once
// - Hands every page to a single writer task
//
// Submodules:
// - config: Crawl options (timeout, concurrency, status policy, output root)
// - barrier: Counts unfinished fetch tasks and waits for zero
// - orchestrator: Runs the crawl and decides when the writer may stop
// - error: The errors that end a crawl
// =============================================================================

mod barrier;
mod config;
mod error;
mod orchestrator;

pub use config::{CrawlConfig, DEFAULT_TIMEOUT_SECS};
pub use error::CrawlError;
pub use orchestrator::{CrawlReport, Crawler};
