//! Node model.
//!
//! A node is either a file holding text content or a directory holding
//! named children. Nodes live in a [`Tree`](crate::Tree) arena and refer to
//! each other by [`NodeId`]; a parent link is plain data, never ownership.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumString};

/// Stable handle to a node slot in a tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Raw slot index, for diagnostics.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Node kind tag.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Kind {
    /// Plain file.
    File,
    /// Directory.
    #[strum(to_string = "dir", serialize = "directory")]
    #[serde(alias = "directory")]
    Dir,
}

impl Kind {
    /// Returns true if this is a plain file.
    pub fn is_file(&self) -> bool {
        matches!(self, Kind::File)
    }

    /// Returns true if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, Kind::Dir)
    }
}

/// Node payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// File content.
    File { content: String },
    /// Children keyed by name.
    Directory { children: BTreeMap<String, NodeId> },
}

impl NodeKind {
    /// Empty payload of the given kind.
    pub fn empty(kind: Kind) -> Self {
        match kind {
            Kind::File => NodeKind::File {
                content: String::new(),
            },
            Kind::Dir => NodeKind::Directory {
                children: BTreeMap::new(),
            },
        }
    }
}

/// A named entry in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub(crate) name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: NodeKind,
}

impl Node {
    pub(crate) fn new(name: impl Into<String>, kind: Kind) -> Self {
        Self {
            name: name.into(),
            parent: None,
            kind: NodeKind::empty(kind),
        }
    }

    pub(crate) fn file(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            kind: NodeKind::File {
                content: content.into(),
            },
        }
    }

    /// Entry name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning directory, `None` for a root or a detached subtree.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Payload.
    pub fn payload(&self) -> &NodeKind {
        &self.kind
    }

    /// Kind tag.
    pub fn kind(&self) -> Kind {
        match self.kind {
            NodeKind::File { .. } => Kind::File,
            NodeKind::Directory { .. } => Kind::Dir,
        }
    }

    /// Returns true if this node is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind().is_dir()
    }

    /// Returns true if this node is a file.
    pub fn is_file(&self) -> bool {
        self.kind().is_file()
    }

    /// File content, `None` for directories.
    pub fn content(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::File { content } => Some(content),
            NodeKind::Directory { .. } => None,
        }
    }

    /// Children map, `None` for files.
    pub fn children(&self) -> Option<&BTreeMap<String, NodeId>> {
        match &self.kind {
            NodeKind::Directory { children } => Some(children),
            NodeKind::File { .. } => None,
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut BTreeMap<String, NodeId>> {
        match &mut self.kind {
            NodeKind::Directory { children } => Some(children),
            NodeKind::File { .. } => None,
        }
    }

    /// Text after the last `.` in the name.
    ///
    /// Dotfiles such as `.profile` have no extension.
    pub fn extension(&self) -> Option<&str> {
        match self.name.rfind('.') {
            Some(0) | None => None,
            Some(pos) if pos + 1 < self.name.len() => Some(&self.name[pos + 1..]),
            Some(_) => None,
        }
    }
}

/// A single line of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntry {
    /// Entry name (not full path).
    pub name: String,
    /// Entry type.
    pub kind: Kind,
    /// Nesting level below the listed directory, 0 for direct children.
    pub depth: usize,
}

impl ListEntry {
    /// Create a new listing entry.
    pub fn new(name: impl Into<String>, kind: Kind, depth: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            depth,
        }
    }
}

/// Checks a candidate entry name.
///
/// `reserved` is the root's own name, which always refers to the anchor
/// during path resolution and so cannot name a child.
pub(crate) fn is_valid_name(name: &str, reserved: &str) -> bool {
    !name.is_empty() && !name.contains('/') && name != "." && name != ".." && name != reserved
}
