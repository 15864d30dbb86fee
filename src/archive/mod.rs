// src/archive/mod.rs
// =============================================================================
// This module is everything that touches the disk.
//
// Submodules:
// - path: Turns a URL into a file name ("example.com/a/b" -> "example.com_a_b")
// - writer: Owns the results directory and writes pages into it, one at a time
// =============================================================================

mod path;
mod writer;

pub use path::sanitize;
pub use writer::{working_dir, PageResult, ResultWriter};
