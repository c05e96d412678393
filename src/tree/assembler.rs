//! Tree assembly from raw traversal entries
//!
//! Folds the engine's entry rows, in whatever order they were produced,
//! into a normalized node tree. Rows are regrouped by parent path, so
//! concurrent completion order never affects the final shape; the
//! canonical child ordering and bottom-up aggregate counts are applied
//! here.

use crate::tree::Node;
use crate::walk::{Entry, NodeKind};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Folds entry streams into normalized node trees
pub struct TreeAssembler;

impl TreeAssembler {
    /// Assemble the tree rooted at `root` from one scan's entries
    ///
    /// Tolerates any mix of file, directory, symlink, error, and sentinel
    /// rows per parent; entries whose parent chain was never emitted
    /// (a mid-scan race) are dropped rather than misattached.
    pub fn assemble(root: &Path, entries: Vec<Entry>) -> Node {
        let mut by_parent: HashMap<PathBuf, Vec<Entry>> = HashMap::new();
        for entry in entries {
            by_parent.entry(entry.parent.clone()).or_default().push(entry);
        }

        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string());
        let mut node = Node::new(root.to_path_buf(), name, NodeKind::Directory, 0, None);
        Self::attach_children(&mut node, &mut by_parent);
        node
    }

    fn attach_children(node: &mut Node, by_parent: &mut HashMap<PathBuf, Vec<Entry>>) {
        if let Some(children) = by_parent.remove(&node.path) {
            for entry in children {
                let mut child = Node::from_entry(&entry);
                if child.kind == NodeKind::Directory {
                    Self::attach_children(&mut child, by_parent);
                }
                node.add_child(child);
            }
        }
        node.sort_children();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(parent: &str, name: &str, kind: NodeKind, depth: usize, size: Option<u64>) -> Entry {
        Entry {
            path: PathBuf::from(parent).join(name),
            parent: PathBuf::from(parent),
            name: name.to_string(),
            kind,
            depth,
            size,
        }
    }

    #[test]
    fn test_assemble_counts_and_order() {
        let entries = vec![
            entry("/root", "b.txt", NodeKind::File, 1, Some(2)),
            entry("/root", "sub", NodeKind::Directory, 1, None),
            entry("/root/sub", "inner.txt", NodeKind::File, 2, Some(5)),
            entry("/root", "Alpha", NodeKind::Directory, 1, None),
        ];

        let tree = TreeAssembler::assemble(Path::new("/root"), entries);

        assert_eq!(tree.name, "root");
        assert_eq!(tree.file_count, 2);
        assert_eq!(tree.dir_count, 2);
        let order: Vec<&str> = tree.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(order, vec!["Alpha", "sub", "b.txt"]);
        assert_eq!(tree.children[1].file_count, 1);
    }

    #[test]
    fn test_assemble_is_order_independent() {
        let forward = vec![
            entry("/root", "sub", NodeKind::Directory, 1, None),
            entry("/root/sub", "a.txt", NodeKind::File, 2, Some(1)),
            entry("/root", "z.txt", NodeKind::File, 1, Some(1)),
        ];
        let mut shuffled = forward.clone();
        shuffled.reverse();

        let a = TreeAssembler::assemble(Path::new("/root"), forward);
        let b = TreeAssembler::assemble(Path::new("/root"), shuffled);
        assert_eq!(a, b);
    }

    #[test]
    fn test_assemble_mixed_kinds_in_one_parent() {
        let entries = vec![
            entry("/root", "link", NodeKind::Symlink, 1, None),
            entry("/root", "locked", NodeKind::Directory, 1, None),
            entry(
                "/root/locked",
                "(permission denied)",
                NodeKind::PermissionError,
                2,
                None,
            ),
            entry("/root", "a.txt", NodeKind::File, 1, Some(3)),
        ];

        let tree = TreeAssembler::assemble(Path::new("/root"), entries);

        // The unreadable directory still counts as observed structure.
        assert_eq!(tree.dir_count, 1);
        assert_eq!(tree.file_count, 1);
        let locked = tree.children.iter().find(|c| c.name == "locked").unwrap();
        assert_eq!(locked.children.len(), 1);
        assert_eq!(locked.children[0].kind, NodeKind::PermissionError);
        assert_eq!(locked.file_count, 0);
        assert_eq!(locked.dir_count, 0);
    }

    #[test]
    fn test_assemble_empty_scan() {
        let tree = TreeAssembler::assemble(Path::new("/empty"), Vec::new());
        assert_eq!(tree.children.len(), 0);
        assert_eq!(tree.file_count, 0);
        assert_eq!(tree.dir_count, 0);
        assert_eq!(tree.depth, 0);
    }
}
