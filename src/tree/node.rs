//! The assembled directory tree node
//!
//! Nodes form a tree by construction (symlinks are terminal leaves),
//! carry aggregate counts over their whole subtree, and keep children in
//! the canonical order the diagram and web front ends render: directories
//! first, then case-insensitive by name.

use crate::walk::{Entry, NodeKind};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Length of the hex identity key derived from a node's path
const NODE_ID_LEN: usize = 16;

/// One element of the assembled directory tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Identity key, stable across scans of the same path
    pub id: String,
    /// Entry name as listed
    pub name: String,
    /// Absolute path (synthetic for placeholders)
    pub path: PathBuf,
    /// Typed kind
    pub kind: NodeKind,
    /// Depth below the scan root (root = 0)
    pub depth: usize,
    /// Byte size, files only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Children in canonical order
    pub children: Vec<Node>,
    /// Files in this subtree
    pub file_count: u64,
    /// Directories in this subtree
    pub dir_count: u64,
}

impl Node {
    /// Create a childless node
    pub fn new(
        path: PathBuf,
        name: String,
        kind: NodeKind,
        depth: usize,
        size: Option<u64>,
    ) -> Self {
        Self {
            id: node_id(&path),
            name,
            path,
            kind,
            depth,
            size,
            children: Vec::new(),
            file_count: 0,
            dir_count: 0,
        }
    }

    /// Create a leaf node from a raw traversal entry
    pub fn from_entry(entry: &Entry) -> Self {
        Self::new(
            entry.path.clone(),
            entry.name.clone(),
            entry.kind,
            entry.depth,
            entry.size,
        )
    }

    /// Attach a fully-assembled child, folding its counts into this node
    ///
    /// Files and directories contribute to the aggregates; symlinks, error
    /// placeholders, and the depth sentinel count as neither. An unreadable
    /// directory still arrives here as a `Directory` child (its contents
    /// are the placeholder), so it is counted as observed structure.
    pub fn add_child(&mut self, child: Node) {
        match child.kind {
            NodeKind::File => self.file_count += 1,
            NodeKind::Directory => {
                self.dir_count += 1;
                self.file_count += child.file_count;
                self.dir_count += child.dir_count;
            }
            _ => {}
        }
        self.children.push(child);
    }

    /// Sort children into the canonical order
    ///
    /// Directories precede everything else; the depth sentinel renders
    /// last; names compare case-insensitively within each group.
    pub fn sort_children(&mut self) {
        self.children
            .sort_by_key(|c| (sort_rank(c.kind), c.name.to_lowercase(), c.name.clone()));
    }

    /// Is this a directory node?
    pub fn is_directory(&self) -> bool {
        self.kind.is_directory()
    }

    /// Total nodes in this subtree, self included
    pub fn total_nodes(&self) -> usize {
        1 + self.children.iter().map(Node::total_nodes).sum::<usize>()
    }
}

fn sort_rank(kind: NodeKind) -> u8 {
    match kind {
        NodeKind::Directory => 0,
        NodeKind::MaxDepth => 2,
        _ => 1,
    }
}

/// Derive the stable identity key for a path
pub fn node_id(path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)[..NODE_ID_LEN].to_string()
}
