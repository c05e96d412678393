//! Directory statistics derivation
//!
//! Aggregates a scan's entry rows into totals, a per-extension histogram,
//! and a bounded largest-files list. Row aggregation is embarrassingly
//! parallel, so large scans fold in parallel and merge.

use crate::walk::{Entry, NodeKind};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One of the largest files under a scan root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LargestFile {
    /// File name
    pub name: String,
    /// Absolute path
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
}

/// Aggregate statistics for a directory subtree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryStats {
    /// Files observed
    pub total_files: u64,
    /// Directories observed (unreadable ones included)
    pub total_directories: u64,
    /// Sum of file sizes in bytes
    pub total_size_bytes: u64,
    /// File counts per lowercased extension; extensionless files are omitted
    pub extension_histogram: BTreeMap<String, u64>,
    /// Largest files, size-descending, bounded
    pub largest_files: Vec<LargestFile>,
}

/// Fold entry rows into directory statistics
///
/// Symlinks, error placeholders, and depth sentinels count as neither
/// files nor directories; an unreadable directory was still listed as a
/// directory entry by its parent and counts as observed structure.
pub fn derive_stats(entries: &[Entry], top_n: usize) -> DirectoryStats {
    let mut stats = entries
        .par_iter()
        .fold(DirectoryStats::default, |mut acc, entry| {
            match entry.kind {
                NodeKind::File => {
                    let size = entry.size.unwrap_or(0);
                    acc.total_files += 1;
                    acc.total_size_bytes += size;
                    if let Some(ext) = extension_of(&entry.path) {
                        *acc.extension_histogram.entry(ext).or_insert(0) += 1;
                    }
                    acc.largest_files.push(LargestFile {
                        name: entry.name.clone(),
                        path: entry.path.clone(),
                        size,
                    });
                    trim_largest(&mut acc.largest_files, top_n);
                }
                NodeKind::Directory => acc.total_directories += 1,
                _ => {}
            }
            acc
        })
        .reduce(DirectoryStats::default, |mut left, right| {
            left.total_files += right.total_files;
            left.total_directories += right.total_directories;
            left.total_size_bytes += right.total_size_bytes;
            for (ext, count) in right.extension_histogram {
                *left.extension_histogram.entry(ext).or_insert(0) += count;
            }
            left.largest_files.extend(right.largest_files);
            trim_largest(&mut left.largest_files, top_n);
            left
        });

    sort_largest(&mut stats.largest_files);
    stats.largest_files.truncate(top_n);
    stats
}

fn extension_of(path: &std::path::Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

fn sort_largest(files: &mut [LargestFile]) {
    files.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
}

fn trim_largest(files: &mut Vec<LargestFile>, top_n: usize) {
    // Partial trim during folding keeps the working set bounded; the
    // final ordering is applied once at the end.
    if files.len() > top_n.saturating_mul(2).max(16) {
        sort_largest(files);
        files.truncate(top_n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(parent: &str, name: &str, size: u64) -> Entry {
        Entry {
            path: PathBuf::from(parent).join(name),
            parent: PathBuf::from(parent),
            name: name.to_string(),
            kind: NodeKind::File,
            depth: 1,
            size: Some(size),
        }
    }

    fn dir(parent: &str, name: &str) -> Entry {
        Entry {
            path: PathBuf::from(parent).join(name),
            parent: PathBuf::from(parent),
            name: name.to_string(),
            kind: NodeKind::Directory,
            depth: 1,
            size: None,
        }
    }

    #[test]
    fn test_totals_and_histogram() {
        let entries = vec![
            file("/r", "a.txt", 10),
            dir("/r", "sub"),
            file("/r/sub", "b.PY", 20),
            file("/r/sub", "noext", 1),
        ];

        let stats = derive_stats(&entries, 10);
        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.total_directories, 1);
        assert_eq!(stats.total_size_bytes, 31);
        assert_eq!(stats.extension_histogram.get("txt"), Some(&1));
        assert_eq!(stats.extension_histogram.get("py"), Some(&1));
        assert_eq!(stats.extension_histogram.len(), 2);
    }

    #[test]
    fn test_largest_files_bounded_and_sorted() {
        let entries: Vec<Entry> = (0..50)
            .map(|i| file("/r", &format!("f{:02}.bin", i), i as u64))
            .collect();

        let stats = derive_stats(&entries, 5);
        assert_eq!(stats.largest_files.len(), 5);
        let sizes: Vec<u64> = stats.largest_files.iter().map(|f| f.size).collect();
        assert_eq!(sizes, vec![49, 48, 47, 46, 45]);
    }

    #[test]
    fn test_non_countable_kinds_ignored() {
        let mut entries = vec![file("/r", "a.txt", 10)];
        entries.push(Entry {
            path: PathBuf::from("/r/link"),
            parent: PathBuf::from("/r"),
            name: "link".to_string(),
            kind: NodeKind::Symlink,
            depth: 1,
            size: None,
        });
        entries.push(Entry {
            path: PathBuf::from("/r/locked/(permission denied)"),
            parent: PathBuf::from("/r/locked"),
            name: "(permission denied)".to_string(),
            kind: NodeKind::PermissionError,
            depth: 2,
            size: None,
        });

        let stats = derive_stats(&entries, 10);
        assert_eq!(stats.total_files, 1);
        assert_eq!(stats.total_directories, 0);
    }

    #[test]
    fn test_empty_entries() {
        let stats = derive_stats(&[], 10);
        assert_eq!(stats, DirectoryStats::default());
    }
}
