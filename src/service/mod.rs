//! Acquisition service module
//!
//! The facade callers use: path validation, cache-aware scanning on a
//! bounded blocking pool, streaming scans, and directory statistics.

mod acquisition;
mod stats;

pub use acquisition::*;
pub use stats::*;
