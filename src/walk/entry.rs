//! Raw filesystem entries discovered during a walk
//!
//! Entries are ephemeral: produced by the traversal engine, consumed by
//! the tree assembler within one scan. Placeholder entries stand in for
//! unreadable directory contents and for truncation at the depth limit.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Display name of the sentinel emitted at the depth limit
pub const MAX_DEPTH_MARKER: &str = "...";

/// Display name of the placeholder standing in for denied directory contents
pub const PERMISSION_MARKER: &str = "(permission denied)";

/// Display name of the placeholder standing in for unreadable directory contents
pub const ERROR_MARKER: &str = "(unreadable)";

/// Kind of a discovered filesystem object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Symbolic link, recorded but never followed
    Symlink,
    /// Entry or directory contents denied by permissions
    PermissionError,
    /// Entry or directory contents lost to another OS error
    OtherError,
    /// Sentinel marking truncation at the depth limit
    MaxDepth,
}

impl NodeKind {
    /// Is this a traversable directory?
    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory)
    }

    /// Is this a regular file?
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File)
    }

    /// Is this an error placeholder?
    pub fn is_error(&self) -> bool {
        matches!(self, Self::PermissionError | Self::OtherError)
    }

    /// Classify an I/O error into an error kind
    pub fn from_io_error(err: &std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::PermissionDenied {
            Self::PermissionError
        } else {
            Self::OtherError
        }
    }
}

/// A single filesystem object discovered during a walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Absolute path of the object (synthetic for placeholders)
    pub path: PathBuf,
    /// Directory this entry was discovered under
    pub parent: PathBuf,
    /// Entry name as listed
    pub name: String,
    /// Typed kind
    pub kind: NodeKind,
    /// Depth below the scan root (root = 0)
    pub depth: usize,
    /// Byte size, files only
    pub size: Option<u64>,
}

impl Entry {
    /// Classify a directory entry discovered under `parent`
    ///
    /// Symlinks are terminal and never followed. Metadata is only touched
    /// for regular files (size); a metadata failure localizes to this one
    /// entry as an error kind rather than aborting the parent scan.
    pub fn from_dir_entry(de: &fs::DirEntry, parent: &Path, depth: usize, name: String) -> Self {
        let path = de.path();

        let kind = match de.file_type() {
            Ok(ft) if ft.is_symlink() => NodeKind::Symlink,
            Ok(ft) if ft.is_dir() => NodeKind::Directory,
            Ok(_) => NodeKind::File,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not determine entry type");
                NodeKind::from_io_error(&e)
            }
        };

        let size = if kind == NodeKind::File {
            match de.metadata() {
                Ok(md) => Some(md.len()),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "could not access metadata");
                    return Self {
                        path,
                        parent: parent.to_path_buf(),
                        name,
                        kind: NodeKind::from_io_error(&e),
                        depth,
                        size: None,
                    };
                }
            }
        } else {
            None
        };

        Self {
            path,
            parent: parent.to_path_buf(),
            name,
            kind,
            depth,
            size,
        }
    }

    /// Sentinel child marking that `dir`'s contents were cut at the depth limit
    pub fn max_depth(dir: &Path, depth: usize) -> Self {
        Self {
            path: dir.join(MAX_DEPTH_MARKER),
            parent: dir.to_path_buf(),
            name: MAX_DEPTH_MARKER.to_string(),
            kind: NodeKind::MaxDepth,
            depth,
            size: None,
        }
    }

    /// Placeholder child standing in for `dir`'s unreadable contents
    pub fn unreadable_dir(dir: &Path, depth: usize, err: &std::io::Error) -> Self {
        let kind = NodeKind::from_io_error(err);
        let name = match kind {
            NodeKind::PermissionError => PERMISSION_MARKER,
            _ => ERROR_MARKER,
        };
        Self {
            path: dir.join(name),
            parent: dir.to_path_buf(),
            name: name.to_string(),
            kind,
            depth,
            size: None,
        }
    }
}
