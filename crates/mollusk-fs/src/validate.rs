//! Structural repair pass ("chkdsk").
//!
//! Walks the tree once from the root and fixes the two link invariants:
//! every child's name matches the key it is stored under, and every
//! child's parent link points at the directory that holds it. A node found
//! under a second directory (or under itself) is unlinked from the later
//! one so the tree stays single-parented and acyclic.

use std::collections::{HashSet, VecDeque};
use std::fmt;

use crate::node::{is_valid_name, NodeId};
use crate::tree::Tree;

/// One fix applied by [`validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Repair {
    /// The entry was re-keyed to match the node's own name.
    Rekeyed { dir: String, from: String, to: String },
    /// The node was renamed to its key; its own name was taken or invalid.
    Renamed { dir: String, from: String, to: String },
    /// The node's parent link was pointed back at its container.
    Reparented { path: String },
    /// A link to a missing or already reachable node was dropped.
    Unlinked { dir: String, key: String },
}

impl fmt::Display for Repair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Repair::Rekeyed { dir, from, to } => {
                write!(f, "{dir}: entry '{from}' re-keyed as '{to}'")
            }
            Repair::Renamed { dir, from, to } => {
                write!(f, "{dir}: node '{from}' renamed to its key '{to}'")
            }
            Repair::Reparented { path } => write!(f, "{path}: parent link repaired"),
            Repair::Unlinked { dir, key } => write!(f, "{dir}: dangling entry '{key}' dropped"),
        }
    }
}

/// Outcome of a validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub repairs: Vec<Repair>,
}

impl ValidationReport {
    /// Returns true if anything had to be fixed.
    pub fn repaired(&self) -> bool {
        !self.repairs.is_empty()
    }
}

/// Repair name/key and parent/child disagreements below the root.
pub fn validate(tree: &mut Tree) -> ValidationReport {
    let mut report = ValidationReport::default();
    let root = tree.root();
    let reserved = tree.root_name().to_string();

    if let Some(node) = tree.node_mut(root) {
        if node.parent.take().is_some() {
            report.repairs.push(Repair::Reparented {
                path: node.name.clone(),
            });
        }
    }

    let mut visited = HashSet::from([root]);
    let mut queue = VecDeque::from([root]);

    while let Some(dir) = queue.pop_front() {
        let entries: Vec<(String, NodeId)> = match tree.node(dir).and_then(|n| n.children()) {
            Some(children) => children.iter().map(|(k, v)| (k.clone(), *v)).collect(),
            None => continue,
        };
        let dir_path = tree.path(dir);

        for (key, child) in entries {
            if tree.node(child).is_none() || !visited.insert(child) {
                unlink(tree, dir, &key);
                report.repairs.push(Repair::Unlinked {
                    dir: dir_path.clone(),
                    key,
                });
                continue;
            }

            let Some(node) = tree.node_mut(child) else {
                continue;
            };
            if node.parent != Some(dir) {
                node.parent = Some(dir);
                report.repairs.push(Repair::Reparented {
                    path: format!("{dir_path}/{key}"),
                });
            }

            if node.name != key {
                let name = node.name.clone();
                let free = is_valid_name(&name, &reserved) && tree.get_child(dir, &name).is_none();
                if free {
                    if let Some(children) = tree.node_mut(dir).and_then(|n| n.children_mut()) {
                        children.remove(&key);
                        children.insert(name.clone(), child);
                    }
                    report.repairs.push(Repair::Rekeyed {
                        dir: dir_path.clone(),
                        from: key,
                        to: name,
                    });
                } else {
                    if let Some(node) = tree.node_mut(child) {
                        node.name = key.clone();
                    }
                    report.repairs.push(Repair::Renamed {
                        dir: dir_path.clone(),
                        from: name,
                        to: key,
                    });
                }
            }

            if tree.node(child).is_some_and(|n| n.is_dir()) {
                queue.push_back(child);
            }
        }
    }

    report
}

fn unlink(tree: &mut Tree, dir: NodeId, key: &str) {
    if let Some(children) = tree.node_mut(dir).and_then(|n| n.children_mut()) {
        children.remove(key);
    }
}
