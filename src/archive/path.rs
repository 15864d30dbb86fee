// src/archive/path.rs
// =============================================================================
// This module turns URLs into names that are safe to use as file names.
//
// How it works:
// 1. Parse the URL and take its host (with port, if any) and its path
// 2. Glue them together: "example.com" + "/docs/intro"
// 3. Replace every path separator with an underscore:
//    "example.com_docs_intro"
//
// Only input with an authority ("scheme://host...") is parsed as a URL.
// Everything else (relative links, garbage, or a name we already sanitized)
// is treated as a bare path. A sanitized name never contains "/", so it can
// never look like it has an authority, and running the function twice
// changes nothing.
//
// Rust concepts:
// - &str vs String: we borrow the input and return a new owned String
// - Option combinators: filter() and map_or() instead of nested if/else
// =============================================================================

use url::Url;

// Characters that would split a name into directories on some platform
const SEPARATORS: [char; 2] = ['/', '\\'];

// Marks the start of a URL's authority (host and port)
const AUTHORITY_MARKER: &str = "://";

// Maps a URL to a filesystem-safe relative name.
//
// Examples:
//   "https://example.com"           -> "example.com"
//   "https://example.com/"          -> "example.com_"
//   "https://example.com/a/b"       -> "example.com_a_b"
//   "http://127.0.0.1:8080/x?q=1"   -> "127.0.0.1:8080_x"
//   "/relative/link"                -> "_relative_link"
//   "example.com_a_b"               -> "example.com_a_b"
//
// The mapping is not unique: "https://h/a/b" and "https://h/a_b" both become
// "h_a_b", so the later write of the two wins.
pub fn sanitize(url: &str) -> String {
    let parsed = Some(url)
        .filter(|raw| raw.contains(AUTHORITY_MARKER))
        .and_then(|raw| Url::parse(raw).ok())
        .filter(has_host);

    let joined = match parsed {
        Some(parsed) => host_and_path(&parsed, has_explicit_path(url)),
        None => bare_path(url).to_string(),
    };

    joined.replace(SEPARATORS, "_")
}

fn has_host(url: &Url) -> bool {
    url.host_str().map_or(false, |host| !host.is_empty())
}

fn host_and_path(url: &Url, explicit_path: bool) -> String {
    let mut joined = url.host_str().unwrap_or_default().to_string();
    if let Some(port) = url.port() {
        joined.push(':');
        joined.push_str(&port.to_string());
    }

    // The url crate reports "/" even when the input had no path at all
    let path = url.path();
    if explicit_path || path != "/" {
        joined.push_str(path);
    }
    joined
}

// True when the raw input has a path segment right after its authority,
// as in "https://example.com/" but not "https://example.com?q=1"
fn has_explicit_path(raw: &str) -> bool {
    raw.split_once(AUTHORITY_MARKER).map_or(false, |(_, rest)| {
        rest.find(['/', '\\', '?', '#'])
            .map_or(false, |end| rest[end..].starts_with(SEPARATORS))
    })
}

// Drops the query string and fragment, the same way the host+path form does
fn bare_path(url: &str) -> &str {
    url.split(['?', '#']).next().unwrap_or_default()
}
