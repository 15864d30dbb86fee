// src/crawl/error.rs
// =============================================================================
// This module lists the failures that stop a crawl.
//
// Each variant keeps the underlying error as its source, so the top level
// can print the whole chain: "could not fetch the seed page: request to
// <url> timed out". Failures of single child fetches or file writes are only logged.
// =============================================================================

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::scrape::FetchError;

/// Failures that end a crawl. Child fetch and per-file write failures are
/// never turned into one of these.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("could not build the HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("could not fetch the seed page")]
    RootFetch(#[source] FetchError),

    #[error("could not determine the working directory")]
    WorkingDir(#[source] io::Error),

    #[error("could not set up results directory {}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("the writer stopped accepting pages before the crawl finished")]
    WriterClosed,

    #[error("the writer task did not finish")]
    WriterAborted(#[from] tokio::task::JoinError),
}
