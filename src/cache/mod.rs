//! Result caching module
//!
//! Provides the TTL/LRU-bounded result store and the deterministic scan
//! fingerprint used as its key.

mod store;

pub use store::*;

use sha2::{Digest, Sha256};
use std::path::Path;

/// Derive the cache key for a scan
///
/// Deterministic over (normalized absolute path, max depth, exclusion-set
/// identity): identical inputs always produce the same key, and changing
/// any one of them changes it.
pub fn fingerprint<S: AsRef<str>>(path: &Path, max_depth: usize, patterns: &[S]) -> String {
    let mut sorted: Vec<&str> = patterns.iter().map(|p| p.as_ref()).collect();
    sorted.sort_unstable();

    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    hasher.update([0u8]);
    hasher.update((max_depth as u64).to_le_bytes());
    for pattern in sorted {
        hasher.update(pattern.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}
