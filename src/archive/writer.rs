// src/archive/writer.rs
// =============================================================================
// This module owns the output directory and writes every fetched page to it.
//
// How it works:
// 1. open() wipes and recreates "<sanitized seed>_results"
// 2. accept() runs as its own task and pulls PageResults off a channel
// 3. Each page is written to "<output dir>/<sanitized page url>"
// 4. When the channel is closed and empty, accept() returns a summary
//
// Only this task ever touches the directory after it is created, so fetch
// tasks never race each other on the filesystem. They just send messages.
//
// Rust concepts:
// - Channels (mpsc): many senders, one receiver
// - Ownership transfer: a PageResult moves into the channel on send and
//   out of it on receive, so exactly one task owns it at a time
// =============================================================================

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::sanitize;
use crate::crawl::CrawlError;

// Suffix appended to the sanitized seed URL to name the output directory
const RESULTS_SUFFIX: &str = "_results";

/// The bytes of one fetched page, on their way to storage
#[derive(Debug)]
pub struct PageResult {
    /// The URL the body was fetched from (raw, as it was requested)
    pub source_url: String,
    pub body: Vec<u8>,
}

/// What the writer managed to do before its inbox closed
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriteSummary {
    pub written: usize,
    pub failed: usize,
}

/// Single owner of a crawl's output directory
#[derive(Debug)]
pub struct ResultWriter {
    output_dir: PathBuf,
}

impl ResultWriter {
    /// Creates `<output_root>/<sanitized target>_results`, removing whatever
    /// was left at that name by an earlier run (a directory or a plain file).
    pub async fn open(output_root: &Path, target: &str) -> Result<Self, CrawlError> {
        let output_dir = output_root.join(results_dir_name(target));

        match clear(&output_dir).await {
            Ok(true) => debug!(path = %output_dir.display(), "removed previous results"),
            Ok(false) => {}
            Err(source) => {
                return Err(CrawlError::OutputDir {
                    path: output_dir,
                    source,
                })
            }
        }

        fs::create_dir(&output_dir)
            .await
            .map_err(|source| CrawlError::OutputDir {
                path: output_dir.clone(),
                source,
            })?;

        info!(path = %output_dir.display(), "created results directory");
        Ok(Self { output_dir })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Writes every page received on `inbox` until the channel is closed and
    /// drained. A failed write is logged and skipped; it never stops the loop.
    pub async fn accept(self, mut inbox: mpsc::Receiver<PageResult>) -> WriteSummary {
        let mut summary = WriteSummary::default();

        while let Some(page) = inbox.recv().await {
            match self.write(&page).await {
                Ok(path) => {
                    debug!(url = %page.source_url, path = %path.display(), bytes = page.body.len(), "wrote page");
                    summary.written += 1;
                }
                Err(e) => {
                    warn!(url = %page.source_url, error = %e, "failed to write page");
                    summary.failed += 1;
                }
            }
        }

        info!(
            written = summary.written,
            failed = summary.failed,
            "writer finished draining its inbox"
        );
        summary
    }

    // Overwrites any file that already has this name
    async fn write(&self, page: &PageResult) -> io::Result<PathBuf> {
        let name = sanitize(&page.source_url);
        if name.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "url has no usable file name",
            ));
        }

        let path = self.output_dir.join(name);
        fs::write(&path, &page.body).await?;
        Ok(path)
    }
}

// Removes a directory tree, file or symlink at `path`. Returns false when
// there was nothing there. A symlink is removed itself, never followed.
async fn clear(path: &Path) -> io::Result<bool> {
    let metadata = match fs::symlink_metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };

    if metadata.is_dir() {
        fs::remove_dir_all(path).await?;
    } else {
        fs::remove_file(path).await?;
    }
    Ok(true)
}

/// Name of the directory a crawl of `target` is archived into
pub fn results_dir_name(target: &str) -> String {
    format!("{}{}", sanitize(target), RESULTS_SUFFIX)
}

/// The process working directory, where results land by default
pub fn working_dir() -> Result<PathBuf, CrawlError> {
    std::env::current_dir().map_err(CrawlError::WorkingDir)
}
