//! Path resolution.
//!
//! Paths are slash-delimited. Empty segments are skipped, `.` stays put,
//! `..` climbs one level (and stays put at a parentless node), and a
//! segment equal to the root's name jumps to the root. Resolution never
//! mutates the tree.

use crate::error::{FsError, FsResult};
use crate::node::NodeId;
use crate::tree::Tree;

/// Resolve `path` starting from `start`.
///
/// With `dirs_only`, a path ending on a file is rejected with
/// [`FsError::IsAFile`]. A file met before the last segment is always
/// [`FsError::NotADirectory`].
pub fn resolve(tree: &Tree, start: NodeId, path: &str, dirs_only: bool) -> FsResult<NodeId> {
    tree.at(start)?;
    let anchor = tree.root_name();
    let mut current = start;

    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if segment == anchor {
            current = tree.root();
            continue;
        }

        let node = tree.at(current)?;
        if node.is_file() {
            return Err(FsError::not_a_directory(tree.path(current)));
        }

        match segment {
            "." => {}
            ".." => {
                if let Some(parent) = node.parent() {
                    current = parent;
                }
            }
            name => {
                current = tree
                    .get_child(current, name)
                    .ok_or_else(|| FsError::not_found(name, path))?;
            }
        }
    }

    if dirs_only && tree.at(current)?.is_file() {
        return Err(FsError::is_a_file(path));
    }
    Ok(current)
}

/// Split a path into its parent portion and final segment.
///
/// Trailing slashes are ignored, so `a/b/` splits like `a/b`. A path with
/// no slash has an empty parent portion, which resolves to the start node.
pub fn split_parent(path: &str) -> (&str, &str) {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((parent, last)) => (parent, last),
        None => ("", trimmed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Kind;

    /// `~/docs/notes.txt` plus `~/docs/drafts/`.
    fn sample() -> (Tree, NodeId, NodeId, NodeId) {
        let mut tree = Tree::new("~", None);
        let root = tree.root();
        let docs = tree.create_child(root, "docs", Kind::Dir).unwrap();
        let notes = tree.create_child(docs, "notes.txt", Kind::File).unwrap();
        let drafts = tree.create_child(docs, "drafts", Kind::Dir).unwrap();
        (tree, docs, notes, drafts)
    }

    #[test]
    fn test_empty_and_dot_stay() {
        let (tree, docs, _, _) = sample();
        assert_eq!(resolve(&tree, docs, "", false).unwrap(), docs);
        assert_eq!(resolve(&tree, docs, ".", false).unwrap(), docs);
        assert_eq!(resolve(&tree, docs, "./././", false).unwrap(), docs);
    }

    #[test]
    fn test_dotdot_clamps_at_root() {
        let (tree, docs, _, drafts) = sample();
        let root = tree.root();
        assert_eq!(resolve(&tree, drafts, "..", false).unwrap(), docs);
        assert_eq!(resolve(&tree, docs, "../../..", false).unwrap(), root);
        assert_eq!(resolve(&tree, root, "..", false).unwrap(), root);
    }

    #[test]
    fn test_root_anchor() {
        let (tree, docs, notes, drafts) = sample();
        assert_eq!(resolve(&tree, drafts, "~/docs/notes.txt", false).unwrap(), notes);
        assert_eq!(resolve(&tree, drafts, "/~/docs", false).unwrap(), docs);
        assert_eq!(resolve(&tree, drafts, "~", false).unwrap(), tree.root());
    }

    #[test]
    fn test_double_slash_is_single() {
        let (tree, _, notes, _) = sample();
        let root = tree.root();
        assert_eq!(resolve(&tree, root, "docs//notes.txt", false).unwrap(), notes);
    }

    #[test]
    fn test_own_path_then_dotdot_is_parent() {
        let (tree, docs, notes, _) = sample();
        let root = tree.root();
        let path = tree.path(notes);
        assert_eq!(resolve(&tree, root, &path, false).unwrap(), notes);
        let parent_path = format!("{}/..", tree.path(docs));
        assert_eq!(resolve(&tree, docs, &parent_path, false).unwrap(), root);
    }

    #[test]
    fn test_not_found_names_segment_and_path() {
        let (tree, _, _, _) = sample();
        let err = resolve(&tree, tree.root(), "docs/missing/x", false).unwrap_err();
        assert_eq!(err, FsError::not_found("missing", "docs/missing/x"));
    }

    #[test]
    fn test_file_mid_path() {
        let (tree, _, _, _) = sample();
        let err = resolve(&tree, tree.root(), "docs/notes.txt/x", false).unwrap_err();
        assert!(matches!(err, FsError::NotADirectory(_)));
        let err = resolve(&tree, tree.root(), "docs/notes.txt/..", false).unwrap_err();
        assert!(matches!(err, FsError::NotADirectory(_)));
    }

    #[test]
    fn test_dirs_only() {
        let (tree, _, notes, drafts) = sample();
        let root = tree.root();
        assert_eq!(resolve(&tree, root, "docs/drafts", true).unwrap(), drafts);
        assert_eq!(resolve(&tree, root, "docs/notes.txt", false).unwrap(), notes);
        let err = resolve(&tree, root, "docs/notes.txt", true).unwrap_err();
        assert!(matches!(err, FsError::IsAFile(_)));
    }

    #[test]
    fn test_split_parent() {
        assert_eq!(split_parent("a/b/c"), ("a/b", "c"));
        assert_eq!(split_parent("c"), ("", "c"));
        assert_eq!(split_parent("a/b/"), ("a", "b"));
        assert_eq!(split_parent("/c"), ("", "c"));
        assert_eq!(split_parent(""), ("", ""));
    }
}
