// src/scrape/mod.rs
// =============================================================================
// This module gets pages off the network and links out of pages.
//
// Submodules:
// - http: Downloads a page with a timeout
// - html: Pulls href values out of <a> tags
// =============================================================================

mod html;
mod http;

pub use html::extract_links;
pub use http::{FetchError, Fetcher, StatusPolicy};
