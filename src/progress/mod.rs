//! Progress reporting module
//!
//! Provides the progress bar shown during large sequential scans.
//! Observability only: progress never changes traversal results.

mod reporter;

pub use reporter::*;
