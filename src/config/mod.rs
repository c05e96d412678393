//! Configuration module for dirmap
//!
//! Provides runtime settings for scanning and caching plus the CLI
//! argument surface consumed by the `dirmap` binary.

mod settings;

pub use settings::*;
