//! Exclusion filter implementation
//!
//! Partitions the pattern set once at construction into an exact-match set
//! and compiled wildcard matchers, then answers `should_exclude(name)` with
//! O(1) literal lookups and a shared per-name memo. Identical names recur
//! heavily across large trees (every `node_modules`, every `target`), so the
//! memo pays for itself on the second occurrence.

use crate::error::{DirmapError, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

/// Memoized results are capped so a pathological tree cannot grow the map
/// without bound.
const MEMO_CAPACITY: usize = 2048;

/// Pre-compiled exclusion filter shared read-only by all workers of a scan
pub struct ExclusionFilter {
    /// Sorted copy of the full pattern set, the cache-key identity
    patterns: Vec<String>,
    /// Patterns without wildcard characters
    literals: HashSet<String>,
    /// Anchored matchers compiled from `*`/`?` patterns
    wildcards: GlobSet,
    /// Per-name verdicts, populated lazily
    memo: RwLock<HashMap<String, bool>>,
}

impl ExclusionFilter {
    /// Compile a filter from a pattern set
    ///
    /// Literal patterns go into an exact-match set; anything containing
    /// `*` or `?` is compiled once into a glob matcher.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut sorted: Vec<String> = patterns.iter().map(|p| p.as_ref().to_string()).collect();
        sorted.sort();
        sorted.dedup();

        let mut literals = HashSet::new();
        let mut builder = GlobSetBuilder::new();

        for pattern in &sorted {
            if pattern.contains('*') || pattern.contains('?') {
                let glob = Glob::new(pattern)
                    .map_err(|e| DirmapError::pattern(pattern, e.to_string()))?;
                builder.add(glob);
            } else {
                literals.insert(pattern.clone());
            }
        }

        let wildcards = builder
            .build()
            .map_err(|e| DirmapError::config(format!("Failed to build glob set: {}", e)))?;

        Ok(Self {
            patterns: sorted,
            literals,
            wildcards,
            memo: RwLock::new(HashMap::new()),
        })
    }

    /// Decide whether `name` is skipped
    ///
    /// Hidden names (leading `.`) are excluded unconditionally, then the
    /// literal set, then the compiled wildcards. Deterministic and pure for
    /// a given pattern set.
    pub fn should_exclude(&self, name: &str) -> bool {
        // Hidden-entry policy, cheaper than any map lookup
        if name.starts_with('.') {
            return true;
        }

        if let Ok(memo) = self.memo.read() {
            if let Some(&verdict) = memo.get(name) {
                return verdict;
            }
        }

        let verdict = self.literals.contains(name) || self.wildcards.is_match(name);

        if let Ok(mut memo) = self.memo.write() {
            if memo.len() < MEMO_CAPACITY {
                memo.insert(name.to_string(), verdict);
            }
        }

        verdict
    }

    /// The sorted pattern set this filter was built from
    ///
    /// Used as the exclusion-set identity when deriving cache fingerprints.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Number of memoized name verdicts
    pub fn memo_len(&self) -> usize {
        self.memo.read().map(|m| m.len()).unwrap_or(0)
    }
}

impl std::fmt::Debug for ExclusionFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExclusionFilter")
            .field("patterns", &self.patterns)
            .field("memoized", &self.memo_len())
            .finish()
    }
}
