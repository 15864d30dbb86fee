// src/crawl/config.rs
// =============================================================================
// This module holds the options for one crawl.
//
// Every field has a default, and the with_* methods change one at a time:
//   CrawlConfig::default().with_concurrency(Some(8))
//
// validate() rejects values that can't work (a zero timeout or a zero
// concurrency limit) before any request is made.
// =============================================================================

use std::path::PathBuf;
use std::time::Duration;

use crate::scrape::StatusPolicy;

/// Default per-request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Room in the writer's inbox before senders have to wait
pub const WRITER_INBOX_CAPACITY: usize = 64;

/// Options for a single crawl
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Timeout applied to every request, root included
    pub timeout: Duration,
    /// Upper bound on fetches in flight at once; None means one per link, all at once
    pub concurrency: Option<usize>,
    pub status_policy: StatusPolicy,
    /// Where the results directory is created; None means the working directory
    pub output_root: Option<PathBuf>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            concurrency: None,
            status_policy: StatusPolicy::default(),
            output_root: None,
        }
    }
}

impl CrawlConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, limit: Option<usize>) -> Self {
        self.concurrency = limit;
        self
    }

    pub fn with_status_policy(mut self, policy: StatusPolicy) -> Self {
        self.status_policy = policy;
        self
    }

    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = Some(root.into());
        self
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.timeout.is_zero() {
            anyhow::bail!("timeout must be greater than 0");
        }
        if self.concurrency == Some(0) {
            anyhow::bail!("concurrency must be greater than 0");
        }
        Ok(())
    }
}
