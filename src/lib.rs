//! # dirmap - Directory Tree Acquisition
//!
//! dirmap turns a filesystem subtree into an in-memory tree representation
//! usable by multiple front ends: static diagram generators and a live web
//! visualizer. It walks a directory tree under depth, exclusion, and symlink
//! constraints, with a choice of sequential or bounded-concurrent traversal,
//! and memoizes assembled results in a time- and capacity-bounded cache.
//!
//! ## Features
//!
//! - **Typed node trees**: file / directory / symlink / error nodes with
//!   stable identities and aggregate counts
//! - **Bounded concurrency**: near-root fan-out over a worker pool, with
//!   sequential traversal deeper down
//! - **Failure isolation**: unreadable entries become visible error nodes
//!   instead of aborting the scan
//! - **TTL/LRU result cache**: keyed by (path, depth, exclusion set), with
//!   usage statistics
//! - **Streaming walks**: lazy `(path, kind, depth)` rows for callers that
//!   never need a full tree
//!
//! ## Quick Start
//!
//! ```no_run
//! use dirmap::config::ScanSettings;
//! use dirmap::service::{AcquisitionService, ScanOptions};
//!
//! # async fn example() -> dirmap::error::Result<()> {
//! let service = AcquisitionService::new(ScanSettings::default())?;
//! let tree = service.scan("/some/project", ScanOptions::default()).await?;
//!
//! println!(
//!     "{}: {} files, {} directories",
//!     tree.name, tree.file_count, tree.dir_count
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Streaming
//!
//! ```no_run
//! use dirmap::config::ScanSettings;
//! use dirmap::service::AcquisitionService;
//!
//! # fn example() -> dirmap::error::Result<()> {
//! let service = AcquisitionService::new(ScanSettings::default())?;
//! for row in service.streaming_scan("/some/project", Some(3))? {
//!     println!("{} {:?} depth={}", row.path.display(), row.kind, row.depth);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod progress;
pub mod service;
pub mod tree;
pub mod walk;

// Re-export commonly used types
pub use config::ScanSettings;
pub use error::{DirmapError, Result};
pub use service::{AcquisitionService, DirectoryStats, ScanOptions};
pub use tree::Node;
pub use walk::{NodeKind, ScanStrategy};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    //! Convenient re-exports for common usage
    //!
    //! ```no_run
    //! use dirmap::prelude::*;
    //! ```

    pub use crate::cache::{fingerprint, CacheStats, ResultCache};
    pub use crate::config::ScanSettings;
    pub use crate::error::{DirmapError, Result};
    pub use crate::filter::ExclusionFilter;
    pub use crate::service::{AcquisitionService, DirectoryStats, ScanOptions};
    pub use crate::tree::{Node, TreeAssembler};
    pub use crate::walk::{Entry, NodeKind, ScanStrategy, StreamedEntry, TraversalEngine};
}
