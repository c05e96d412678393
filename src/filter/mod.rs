//! Exclusion filtering module
//!
//! Decides which entry names are skipped during traversal, with
//! pre-compiled wildcard patterns and per-name memoization.

mod exclusion;

pub use exclusion::*;
