// src/scrape/http.rs
// =============================================================================
// This module downloads pages.
//
// Key functionality:
// - Makes HTTP GET requests with a per-request timeout
// - Reads the whole response body into memory
// - Sorts failures into timeouts and everything else
// - Optionally treats non-2xx responses as failures
//
// There are no retries. The timeout is the only thing that stops a slow
// server from holding a task forever.
//
// Rust concepts:
// - async/await: For concurrent network I/O
// - Result<T, E>: For error handling
// - Enums: To represent the different ways a fetch can fail
// =============================================================================

use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

// What to do with a response whose status is not 2xx
//
// Accept is the default: a 404 page is still a page, and it gets archived
// like any other. Reject turns it into a FetchError::Status instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusPolicy {
    #[default]
    Accept,
    Reject,
}

// Why a fetch failed
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request took longer than the configured timeout
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// DNS, connection, TLS, invalid URL, or body read failure
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx status while the policy is Reject
    #[error("request to {url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },
}

// A reqwest client with a timeout and a status policy
//
// Client is cheap to clone (it's a reference counter internally), so every
// fetch task gets its own clone and they all share one connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    status_policy: StatusPolicy,
}

impl Fetcher {
    pub fn new(timeout: Duration, status_policy: StatusPolicy) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            status_policy,
        })
    }

    // Fetches the full body of `url`
    //
    // The url is handed to reqwest as-is. Relative, empty and non-HTTP hrefs
    // fail here as Transport errors; nothing validates them beforehand.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| categorize_error(url, e))?;

        let status = response.status();
        if self.status_policy == StatusPolicy::Reject && !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(|e| categorize_error(url, e))?;
        debug!(url, status = status.as_u16(), bytes = body.len(), "fetched");

        Ok(body.to_vec())
    }
}

// reqwest errors can happen for many reasons, but only timeouts get their
// own bucket; the rest keep the original error as their source
fn categorize_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            source: error,
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does #[derive(Error)] do?
//    - It comes from the thiserror crate
//    - #[error("...")] generates the Display text for each variant
//    - #[source] marks the underlying error so callers can walk the chain
//
// 2. Why Vec<u8> and not String?
//    - Pages aren't always valid UTF-8 (or even text)
//    - We write the bytes to disk exactly as the server sent them
//
// 3. What is #[default] on an enum variant?
//    - It lets #[derive(Default)] pick that variant
//    - StatusPolicy::default() == StatusPolicy::Accept
// -----------------------------------------------------------------------------
