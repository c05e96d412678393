//! Lazy streaming traversal
//!
//! Yields `(path, kind, depth)` rows as they are discovered, never
//! materializing the tree. Finite and not restartable; callers that
//! need the assembled structure use the traversal engine instead.

use crate::filter::ExclusionFilter;
use crate::walk::{Entry, NodeKind};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

/// One row yielded by a streaming scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamedEntry {
    /// Absolute path of the object
    pub path: PathBuf,
    /// Typed kind
    pub kind: NodeKind,
    /// Depth below the scan root (root = 0)
    pub depth: usize,
}

/// Pending directory listing on the walk stack
struct Frame {
    dir: PathBuf,
    depth: usize,
    iter: Option<fs::ReadDir>,
}

/// Lazy depth-first walker over a directory tree
///
/// Honors the same exclusion, symlink, and depth policy as the traversal
/// engine, but stops descending silently at the depth limit instead of
/// emitting a sentinel; the stream is about entries, not tree shape.
pub struct ScanStream {
    filter: Arc<ExclusionFilter>,
    max_depth: usize,
    stack: Vec<Frame>,
}

impl ScanStream {
    pub(crate) fn new(root: PathBuf, filter: Arc<ExclusionFilter>, max_depth: usize) -> Self {
        let stack = if max_depth == 0 {
            Vec::new()
        } else {
            vec![Frame {
                dir: root,
                depth: 0,
                iter: None,
            }]
        };
        Self {
            filter,
            max_depth,
            stack,
        }
    }
}

impl Iterator for ScanStream {
    type Item = StreamedEntry;

    fn next(&mut self) -> Option<StreamedEntry> {
        loop {
            let frame = self.stack.last_mut()?;

            if frame.iter.is_none() {
                match fs::read_dir(&frame.dir) {
                    Ok(read) => frame.iter = Some(read),
                    Err(e) => {
                        warn!(path = %frame.dir.display(), error = %e, "error listing directory");
                        let placeholder = Entry::unreadable_dir(&frame.dir, frame.depth + 1, &e);
                        self.stack.pop();
                        return Some(StreamedEntry {
                            path: placeholder.path,
                            kind: placeholder.kind,
                            depth: placeholder.depth,
                        });
                    }
                }
            }

            let depth = frame.depth;
            let dir = frame.dir.clone();
            match frame.iter.as_mut().and_then(|it| it.next()) {
                None => {
                    self.stack.pop();
                    continue;
                }
                Some(Err(e)) => {
                    warn!(path = %dir.display(), error = %e, "error listing directory");
                    let placeholder = Entry::unreadable_dir(&dir, depth + 1, &e);
                    return Some(StreamedEntry {
                        path: placeholder.path,
                        kind: placeholder.kind,
                        depth: placeholder.depth,
                    });
                }
                Some(Ok(de)) => {
                    let name = de.file_name().to_string_lossy().into_owned();
                    if self.filter.should_exclude(&name) {
                        continue;
                    }
                    let entry = Entry::from_dir_entry(&de, &dir, depth + 1, name);
                    if entry.kind == NodeKind::Directory && entry.depth < self.max_depth {
                        self.stack.push(Frame {
                            dir: entry.path.clone(),
                            depth: entry.depth,
                            iter: None,
                        });
                    }
                    return Some(StreamedEntry {
                        path: entry.path,
                        kind: entry.kind,
                        depth: entry.depth,
                    });
                }
            }
        }
    }
}
