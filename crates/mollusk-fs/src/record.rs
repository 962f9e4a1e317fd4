//! Flat record serialization.
//!
//! A tree is flattened breadth-first into a list of [`Record`]s, each
//! pointing at its parent by index into the same list (`-1` for the root).
//! A child always comes after its parent, so rebuilding is a single
//! forward pass.
//!
//! Records carry an explicit `kind` tag. Older state files without one are
//! still accepted: a record with `data` is a file, anything else a
//! directory.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::error::RecordError;
use crate::node::{is_valid_name, Kind, Node, NodeId, NodeKind};
use crate::tree::{capacity_from_signed, capacity_to_signed, Tree};

/// One persisted node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Kind>,
    /// Index of the parent record, `-1` for the root.
    pub parent: i64,
    /// Byte budget, directories only; negative means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<i64>,
    /// Content, files only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl Record {
    /// A file record.
    pub fn file(name: impl Into<String>, parent: i64, data: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: Some(Kind::File),
            parent,
            capacity: None,
            data: Some(data.into()),
        }
    }

    /// A directory record.
    pub fn dir(name: impl Into<String>, parent: i64, capacity: i64) -> Self {
        Self {
            name: name.into(),
            kind: Some(Kind::Dir),
            parent,
            capacity: Some(capacity),
            data: None,
        }
    }

    /// Effective kind, inferring it for untagged records.
    pub fn kind(&self) -> Kind {
        self.kind.unwrap_or(if self.data.is_some() {
            Kind::File
        } else {
            Kind::Dir
        })
    }

    fn from_node(node: &Node, parent: i64, capacity: i64) -> Self {
        match node.payload() {
            NodeKind::File { content } => Self::file(node.name(), parent, content.clone()),
            NodeKind::Directory { .. } => Self::dir(node.name(), parent, capacity),
        }
    }
}

/// Flatten the whole tree, starting at its root.
pub fn to_records(tree: &Tree) -> Vec<Record> {
    subtree_records(tree, tree.root())
}

/// Flatten the subtree at `start`; `start` becomes the record root.
pub fn subtree_records(tree: &Tree, start: NodeId) -> Vec<Record> {
    let mut records = Vec::new();
    let Some(first) = tree.node(start) else {
        return records;
    };
    let capacity = if start == tree.root() {
        capacity_to_signed(tree.capacity())
    } else {
        -1
    };
    records.push(Record::from_node(first, -1, capacity));

    let mut queue = VecDeque::from([(start, 0_i64)]);
    while let Some((dir, index)) = queue.pop_front() {
        for (_, child) in tree.children(dir) {
            let Some(node) = tree.node(child) else {
                continue;
            };
            let child_index = records.len() as i64;
            records.push(Record::from_node(node, index, -1));
            if node.is_dir() {
                queue.push_back((child, child_index));
            }
        }
    }
    records
}

/// Rebuild a tree from records produced by [`to_records`].
pub fn from_records(records: &[Record]) -> Result<Tree, RecordError> {
    let (first, rest) = records.split_first().ok_or(RecordError::Empty)?;
    if first.parent >= 0 {
        return Err(RecordError::RootHasParent(first.parent));
    }
    if first.kind().is_file() {
        return Err(RecordError::RootIsFile(first.name.clone()));
    }
    if matches!(first.name.as_str(), "" | "." | "..") || first.name.contains('/') {
        return Err(RecordError::InvalidName {
            index: 0,
            name: first.name.clone(),
        });
    }

    let mut tree = Tree::new(first.name.clone(), None);
    let mut ids = vec![tree.root()];

    for (offset, record) in rest.iter().enumerate() {
        let index = offset + 1;
        if record.parent < 0 {
            return Err(RecordError::ExtraRoot(index));
        }
        let parent = usize::try_from(record.parent)
            .ok()
            .and_then(|p| ids.get(p).copied())
            .ok_or(RecordError::ParentOutOfRange {
                index,
                parent: record.parent,
            })?;
        if tree.node(parent).is_some_and(Node::is_file) {
            return Err(RecordError::ParentIsFile {
                index,
                parent: record.parent,
            });
        }
        if !is_valid_name(&record.name, tree.root_name()) {
            return Err(RecordError::InvalidName {
                index,
                name: record.name.clone(),
            });
        }
        if tree.get_child(parent, &record.name).is_some() {
            return Err(RecordError::DuplicateName {
                index,
                name: record.name.clone(),
            });
        }

        let id = tree
            .create_child(parent, &record.name, record.kind())
            .map_err(|source| RecordError::Rejected { index, source })?;
        if let (Kind::File, Some(data)) = (record.kind(), &record.data) {
            // The budget is applied once the whole tree is rebuilt.
            tree.edit(id, data.clone())
                .map_err(|source| RecordError::Rejected { index, source })?;
        }
        ids.push(id);
    }

    let capacity = first.capacity.and_then(capacity_from_signed);
    let used = tree.usage().used;
    tree.set_capacity(capacity)
        .map_err(|_| RecordError::OverCapacity {
            used,
            capacity: capacity.unwrap_or_default(),
        })?;
    Ok(tree)
}

/// Serialize a tree as a pretty-printed JSON record array.
pub fn to_json(tree: &Tree) -> Result<String, RecordError> {
    Ok(serde_json::to_string_pretty(&to_records(tree))?)
}

/// Rebuild a tree from a JSON record array.
pub fn from_json(text: &str) -> Result<Tree, RecordError> {
    let records: Vec<Record> = serde_json::from_str(text)?;
    from_records(&records)
}
