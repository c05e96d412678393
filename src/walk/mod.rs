//! Directory traversal module
//!
//! Provides the raw entry model, the depth/exclusion/symlink-bounded
//! traversal engine with sequential and concurrent strategies, and a
//! lazy streaming walker for callers that never need a full tree.

mod engine;
mod entry;
mod stream;

pub use engine::*;
pub use entry::*;
pub use stream::*;
