//! Arena-backed node tree.
//!
//! Every node of a filesystem (and every detached subtree a caller is
//! holding) lives in one [`Tree`]. Directories map names to [`NodeId`]
//! handles; a node's parent is stored as a plain handle, so there is no
//! reference cycle and no lifetime question between parent and child.
//!
//! The byte budget (`capacity`) bounds the subtree reachable from
//! [`Tree::root`]. Detached subtrees do not count against it until they are
//! linked back in.

use std::collections::BTreeMap;

use crate::error::{FsError, FsResult};
use crate::node::{is_valid_name, Kind, Node, NodeId, NodeKind};

/// Bytes used against the root's budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Usage {
    /// Sum of all file contents reachable from the root.
    pub used: usize,
    /// Byte budget, `None` when unbounded.
    pub capacity: Option<usize>,
}

impl Usage {
    /// Bytes still available, `None` when unbounded.
    pub fn available(&self) -> Option<usize> {
        self.capacity.map(|cap| cap.saturating_sub(self.used))
    }
}

/// Node arena with a single anchored root.
#[derive(Debug, Clone)]
pub struct Tree {
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
    root: NodeId,
    capacity: Option<usize>,
}

impl Tree {
    /// Create a tree holding an empty root directory.
    pub fn new(root_name: impl Into<String>, capacity: Option<usize>) -> Self {
        Self {
            slots: vec![Some(Node::new(root_name, Kind::Dir))],
            free: Vec::new(),
            root: NodeId(0),
            capacity,
        }
    }

    /// Create a tree from a signed capacity, where a negative value means unbounded.
    pub fn with_signed_capacity(root_name: impl Into<String>, capacity: i64) -> Self {
        Self::new(root_name, capacity_from_signed(capacity))
    }

    /// The anchored root directory.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The root's name, reserved as the path anchor.
    pub fn root_name(&self) -> &str {
        self.slots
            .get(self.root.0)
            .and_then(Option::as_ref)
            .map(Node::name)
            .unwrap_or_default()
    }

    /// Byte budget of the root, `None` when unbounded.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Change the byte budget.
    ///
    /// Fails if the root already holds more than the new budget allows.
    pub fn set_capacity(&mut self, capacity: Option<usize>) -> FsResult<()> {
        if let Some(cap) = capacity {
            let used = self.size(self.root);
            if used > cap {
                return Err(FsError::CapacityExceeded {
                    required: used,
                    capacity: cap,
                });
            }
        }
        self.capacity = capacity;
        Ok(())
    }

    /// Current usage against the budget.
    pub fn usage(&self) -> Usage {
        Usage {
            used: self.size(self.root),
            capacity: self.capacity,
        }
    }

    /// Number of live nodes, including detached subtrees.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Returns true if only the root exists.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Look up a node by handle.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Look up a node, treating a stale handle as an invalid target.
    pub(crate) fn at(&self, id: NodeId) -> FsResult<&Node> {
        self.node(id)
            .ok_or_else(|| FsError::invalid_target(format!("stale node handle {}", id.0)))
    }

    fn at_mut(&mut self, id: NodeId) -> FsResult<&mut Node> {
        self.node_mut(id)
            .ok_or_else(|| FsError::invalid_target(format!("stale node handle {}", id.0)))
    }

    fn dir(&self, id: NodeId) -> FsResult<&BTreeMap<String, NodeId>> {
        let node = self.at(id)?;
        node.children()
            .ok_or_else(|| FsError::not_a_directory(self.path(id)))
    }

    fn dir_mut(&mut self, id: NodeId) -> FsResult<&mut BTreeMap<String, NodeId>> {
        let path = self.path(id);
        self.at_mut(id)?
            .children_mut()
            .ok_or_else(|| FsError::not_a_directory(path))
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                NodeId(slot)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    fn check_name(&self, name: &str) -> FsResult<()> {
        if is_valid_name(name, self.root_name()) {
            Ok(())
        } else {
            Err(FsError::invalid_name(name))
        }
    }

    // ========================================================================
    // Structure queries
    // ========================================================================

    /// Look up a child by exact name.
    pub fn get_child(&self, dir: NodeId, name: &str) -> Option<NodeId> {
        self.node(dir)?.children()?.get(name).copied()
    }

    /// Children of a directory, sorted by name. Empty for files.
    pub fn children(&self, dir: NodeId) -> Vec<(&str, NodeId)> {
        self.node(dir)
            .and_then(Node::children)
            .map(|children| {
                children
                    .iter()
                    .map(|(name, id)| (name.as_str(), *id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// File content, `None` for directories.
    pub fn content(&self, id: NodeId) -> Option<&str> {
        self.node(id)?.content()
    }

    /// Total bytes of file content at or below `id`.
    pub fn size(&self, id: NodeId) -> usize {
        let mut total = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            match self.node(current).map(Node::payload) {
                Some(NodeKind::File { content }) => total += content.len(),
                Some(NodeKind::Directory { children }) => stack.extend(children.values()),
                None => {}
            }
        }
        total
    }

    /// Walk parent links to the parentless node above `id`.
    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        // Bounded by arena size so a corrupted link cannot loop forever.
        for _ in 0..self.slots.len() {
            match self.node(current).and_then(Node::parent) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        current
    }

    /// Slash-joined names from the topmost ancestor down to `id`.
    pub fn path(&self, id: NodeId) -> String {
        let mut names = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let Some(node) = self.node(node_id) else {
                break;
            };
            names.push(node.name());
            if names.len() > self.slots.len() {
                break;
            }
            current = node.parent();
        }
        names.reverse();
        names.join("/")
    }

    /// Returns true if `node` is `ancestor` or lies somewhere below it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        let mut steps = 0;
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.slots.len() {
                return false;
            }
            current = self.node(id).and_then(Node::parent);
        }
        false
    }

    /// Returns true if `id` is linked under the anchored root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.node(id).is_some() && self.root_of(id) == self.root
    }

    /// Ensure a size change of the anchored subtree stays within budget.
    fn check_capacity(&self, added: usize, removed: usize) -> FsResult<()> {
        let Some(capacity) = self.capacity else {
            return Ok(());
        };
        let required = (self.size(self.root) + added).saturating_sub(removed);
        if added > removed && required > capacity {
            return Err(FsError::CapacityExceeded { required, capacity });
        }
        Ok(())
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Return the child `name` of `dir`, creating it with `kind` if absent.
    ///
    /// An existing child is returned as-is, whatever its kind.
    pub fn create_child(&mut self, dir: NodeId, name: &str, kind: Kind) -> FsResult<NodeId> {
        self.dir(dir)?;
        self.check_name(name)?;
        if let Some(existing) = self.get_child(dir, name) {
            return Ok(existing);
        }

        let mut node = Node::new(name, kind);
        node.parent = Some(dir);
        let id = self.alloc(node);
        self.dir_mut(dir)?.insert(name.to_string(), id);
        Ok(id)
    }

    /// Link an existing node as a child of `dir` under the node's own name.
    ///
    /// Fails if the name is taken and `replace` is false, or if the insert
    /// would push the root over its capacity. A replaced child is dropped
    /// together with its subtree. The node's previous container is not
    /// touched; callers moving a node must unlink it from there themselves.
    pub fn add_child(&mut self, dir: NodeId, node: NodeId, replace: bool) -> FsResult<()> {
        self.dir(dir)?;
        let name = self.at(node)?.name().to_string();
        self.check_name(&name)?;
        if self.contains(node, dir) {
            return Err(FsError::invalid_target(format!(
                "cannot place '{}' inside itself",
                self.path(node)
            )));
        }

        let existing = self.get_child(dir, &name).filter(|id| *id != node);
        if let Some(existing) = existing {
            if !replace {
                return Err(FsError::already_exists(name));
            }
            if self.contains(existing, node) {
                return Err(FsError::invalid_target(format!(
                    "cannot replace '{}' with its own descendant",
                    self.path(existing)
                )));
            }
        }

        if self.root_of(dir) == self.root {
            // A node already under the root is being relinked; its bytes are counted.
            let added = if self.root_of(node) == self.root {
                0
            } else {
                self.size(node)
            };
            let removed = existing.map(|id| self.size(id)).unwrap_or(0);
            self.check_capacity(added, removed)?;
        }

        if let Some(existing) = existing {
            self.dir_mut(dir)?.remove(&name);
            self.at_mut(existing)?.parent = None;
            self.discard(existing)?;
        }
        self.dir_mut(dir)?.insert(name, node);
        self.at_mut(node)?.parent = Some(dir);
        Ok(())
    }

    /// Unlink the child `name` from `dir` and hand its subtree to the caller.
    ///
    /// A non-empty directory is only detached when `recursive` is set.
    pub fn remove_child(&mut self, dir: NodeId, name: &str, recursive: bool) -> FsResult<NodeId> {
        let child = self.dir(dir)?.get(name).copied().ok_or_else(|| {
            FsError::not_found(name, format!("{}/{}", self.path(dir), name))
        })?;

        let populated = self
            .at(child)?
            .children()
            .is_some_and(|children| !children.is_empty());
        if populated && !recursive {
            return Err(FsError::not_empty(self.path(child)));
        }

        self.dir_mut(dir)?.remove(name);
        self.at_mut(child)?.parent = None;
        Ok(child)
    }

    /// Re-key a child of `dir` from `old` to `new`.
    pub fn rename_child(&mut self, dir: NodeId, old: &str, new: &str) -> FsResult<()> {
        let child = self.dir(dir)?.get(old).copied().ok_or_else(|| {
            FsError::not_found(old, format!("{}/{}", self.path(dir), old))
        })?;
        if old == new {
            return Ok(());
        }
        self.check_name(new)?;
        if self.get_child(dir, new).is_some() {
            return Err(FsError::already_exists(new));
        }

        let children = self.dir_mut(dir)?;
        children.remove(old);
        children.insert(new.to_string(), child);
        self.at_mut(child)?.name = new.to_string();
        Ok(())
    }

    /// Replace a file's content, refusing edits that would exceed capacity.
    pub fn edit(&mut self, file: NodeId, content: impl Into<String>) -> FsResult<()> {
        let content = content.into();
        let old_len = match self.at(file)?.content() {
            Some(old) => old.len(),
            None => return Err(FsError::is_a_directory(self.path(file))),
        };
        if self.is_attached(file) {
            self.check_capacity(content.len(), old_len)?;
        }

        if let NodeKind::File { content: slot } = &mut self.at_mut(file)?.kind {
            *slot = content;
        }
        Ok(())
    }

    /// Relink `node` under `new_parent` as `new_name`.
    ///
    /// The node is linked at the destination first and only then unlinked
    /// from its old container, so a failed link leaves everything in place.
    pub fn move_node(&mut self, node: NodeId, new_parent: NodeId, new_name: &str) -> FsResult<()> {
        let (old_parent, old_name) = {
            let current = self.at(node)?;
            match current.parent() {
                Some(parent) => (parent, current.name().to_string()),
                None => {
                    return Err(FsError::invalid_target(format!(
                        "'{}' has no parent to move from",
                        current.name()
                    )));
                }
            }
        };
        if old_parent == new_parent && old_name == new_name {
            return Ok(());
        }
        self.check_name(new_name)?;
        if self.get_child(new_parent, new_name).is_some() {
            return Err(FsError::already_exists(new_name));
        }

        self.at_mut(node)?.name = new_name.to_string();
        if let Err(err) = self.add_child(new_parent, node, false) {
            let restored = self.at_mut(node)?;
            restored.name = old_name;
            restored.parent = Some(old_parent);
            return Err(err);
        }

        let children = self.dir_mut(old_parent)?;
        if children.get(&old_name) == Some(&node) {
            children.remove(&old_name);
        }
        Ok(())
    }

    /// Duplicate the subtree at `node` into fresh slots.
    ///
    /// The copy is detached (parentless) and shares nothing with the source.
    pub fn deep_copy(&mut self, node: NodeId) -> FsResult<NodeId> {
        self.at(node)?;
        self.copy_into(node, None)
    }

    fn copy_into(&mut self, source: NodeId, parent: Option<NodeId>) -> FsResult<NodeId> {
        let original = self.at(source)?;
        let name = original.name().to_string();
        let (mut copy, child_ids) = match original.payload() {
            NodeKind::File { content } => (Node::file(name, content.clone()), Vec::new()),
            NodeKind::Directory { children } => (
                Node::new(name, Kind::Dir),
                children.values().copied().collect::<Vec<_>>(),
            ),
        };
        copy.parent = parent;
        let id = self.alloc(copy);

        for child in child_ids {
            let child_copy = self.copy_into(child, Some(id))?;
            let child_name = self.at(child_copy)?.name().to_string();
            self.dir_mut(id)?.insert(child_name, child_copy);
        }
        Ok(id)
    }

    /// Free a detached subtree's slots.
    pub fn discard(&mut self, node: NodeId) -> FsResult<()> {
        let detached = self.at(node)?.parent().is_none() && node != self.root;
        if !detached {
            return Err(FsError::invalid_target(format!(
                "'{}' is still linked into the tree",
                self.path(node)
            )));
        }

        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(freed) = self.slots.get_mut(id.0).and_then(Option::take) {
                if let NodeKind::Directory { children } = freed.kind {
                    stack.extend(children.into_values());
                }
                self.free.push(id.0);
            }
        }
        Ok(())
    }

    /// Create a detached file node holding `content`.
    pub(crate) fn new_detached_file(&mut self, name: &str, content: impl Into<String>) -> FsResult<NodeId> {
        self.check_name(name)?;
        Ok(self.alloc(Node::file(name, content)))
    }
}

/// Map a signed capacity onto a budget, negative meaning unbounded.
pub fn capacity_from_signed(capacity: i64) -> Option<usize> {
    usize::try_from(capacity).ok()
}

/// Map a budget back to its signed form, `-1` for unbounded.
pub fn capacity_to_signed(capacity: Option<usize>) -> i64 {
    capacity
        .and_then(|cap| i64::try_from(cap).ok())
        .unwrap_or(-1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounded(capacity: usize) -> Tree {
        Tree::new("~", Some(capacity))
    }

    #[test]
    fn test_create_child_is_idempotent() {
        let mut tree = Tree::new("~", None);
        let root = tree.root();
        let first = tree.create_child(root, "docs", Kind::Dir).unwrap();
        let second = tree.create_child(root, "docs", Kind::Dir).unwrap();
        assert_eq!(first, second);
        assert_eq!(tree.children(root).len(), 1);
        assert_eq!(tree.node(first).unwrap().parent(), Some(root));
    }

    #[test]
    fn test_create_child_on_file_fails() {
        let mut tree = Tree::new("~", None);
        let root = tree.root();
        let file = tree.create_child(root, "a.txt", Kind::File).unwrap();
        let err = tree.create_child(file, "b", Kind::File).unwrap_err();
        assert!(matches!(err, FsError::NotADirectory(_)));
    }

    #[test]
    fn test_create_child_rejects_bad_names() {
        let mut tree = Tree::new("~", None);
        let root = tree.root();
        for name in ["", "a/b", ".", "..", "~"] {
            let err = tree.create_child(root, name, Kind::File).unwrap_err();
            assert!(matches!(err, FsError::InvalidName(_)), "{name:?}");
        }
    }

    #[test]
    fn test_size_and_path() {
        let mut tree = Tree::new("~", None);
        let root = tree.root();
        let a = tree.create_child(root, "a", Kind::Dir).unwrap();
        let b = tree.create_child(a, "b.txt", Kind::File).unwrap();
        let c = tree.create_child(root, "c.txt", Kind::File).unwrap();
        tree.edit(b, "12345").unwrap();
        tree.edit(c, "678").unwrap();

        assert_eq!(tree.size(a), 5);
        assert_eq!(tree.size(root), 8);
        assert_eq!(tree.path(b), "~/a/b.txt");
        assert_eq!(tree.path(root), "~");
        assert_eq!(tree.root_of(b), root);
    }

    #[test]
    fn test_edit_respects_capacity() {
        let mut tree = bounded(10);
        let root = tree.root();
        let file = tree.create_child(root, "f", Kind::File).unwrap();
        tree.edit(file, "0123456789").unwrap();

        let err = tree.edit(file, "01234567890").unwrap_err();
        assert_eq!(
            err,
            FsError::CapacityExceeded {
                required: 11,
                capacity: 10
            }
        );
        assert_eq!(tree.content(file), Some("0123456789"));

        // Shrinking is always allowed.
        tree.edit(file, "").unwrap();
        assert_eq!(tree.usage().used, 0);
    }

    #[test]
    fn test_edit_directory_fails() {
        let mut tree = Tree::new("~", None);
        let root = tree.root();
        assert!(matches!(
            tree.edit(root, "x").unwrap_err(),
            FsError::IsADirectory(_)
        ));
    }

    #[test]
    fn test_add_child_collision_and_replace() {
        let mut tree = Tree::new("~", None);
        let root = tree.root();
        let original = tree.create_child(root, "a.txt", Kind::File).unwrap();
        tree.edit(original, "old").unwrap();

        let incoming = tree.new_detached_file("a.txt", "new").unwrap();
        let err = tree.add_child(root, incoming, false).unwrap_err();
        assert!(matches!(err, FsError::AlreadyExists(_)));
        assert_eq!(tree.get_child(root, "a.txt"), Some(original));

        tree.add_child(root, incoming, true).unwrap();
        assert_eq!(tree.get_child(root, "a.txt"), Some(incoming));
        assert!(tree.node(original).is_none());
    }

    #[test]
    fn test_add_child_checks_capacity() {
        let mut tree = bounded(4);
        let root = tree.root();
        let incoming = tree.new_detached_file("big", "12345").unwrap();
        let err = tree.add_child(root, incoming, false).unwrap_err();
        assert!(matches!(err, FsError::CapacityExceeded { .. }));
        assert!(tree.get_child(root, "big").is_none());
        assert_eq!(tree.node(incoming).unwrap().parent(), None);
    }

    #[test]
    fn test_add_child_refuses_cycles() {
        let mut tree = Tree::new("~", None);
        let root = tree.root();
        let a = tree.create_child(root, "a", Kind::Dir).unwrap();
        let b = tree.create_child(a, "b", Kind::Dir).unwrap();
        let err = tree.add_child(b, a, false).unwrap_err();
        assert!(matches!(err, FsError::InvalidTarget(_)));
    }

    #[test]
    fn test_remove_child() {
        let mut tree = Tree::new("~", None);
        let root = tree.root();
        let docs = tree.create_child(root, "docs", Kind::Dir).unwrap();
        tree.create_child(docs, "notes.txt", Kind::File).unwrap();

        let err = tree.remove_child(root, "docs", false).unwrap_err();
        assert!(matches!(err, FsError::NotEmpty(_)));
        assert_eq!(tree.get_child(root, "docs"), Some(docs));

        let detached = tree.remove_child(root, "docs", true).unwrap();
        assert_eq!(detached, docs);
        assert_eq!(tree.node(docs).unwrap().parent(), None);
        assert!(tree.get_child(root, "docs").is_none());

        let live = tree.len();
        tree.discard(docs).unwrap();
        assert_eq!(tree.len(), live - 2);
    }

    #[test]
    fn test_remove_missing_child() {
        let mut tree = Tree::new("~", None);
        let root = tree.root();
        let err = tree.remove_child(root, "ghost", true).unwrap_err();
        assert!(matches!(err, FsError::NotFound { .. }));
    }

    #[test]
    fn test_rename_child_collision_leaves_both() {
        let mut tree = Tree::new("~", None);
        let root = tree.root();
        let a = tree.create_child(root, "a", Kind::File).unwrap();
        let b = tree.create_child(root, "b", Kind::File).unwrap();

        let err = tree.rename_child(root, "a", "b").unwrap_err();
        assert!(matches!(err, FsError::AlreadyExists(_)));
        assert_eq!(tree.get_child(root, "a"), Some(a));
        assert_eq!(tree.get_child(root, "b"), Some(b));

        tree.rename_child(root, "a", "c").unwrap();
        assert_eq!(tree.get_child(root, "c"), Some(a));
        assert_eq!(tree.node(a).unwrap().name(), "c");
        assert!(tree.get_child(root, "a").is_none());
    }

    #[test]
    fn test_move_node_links_then_unlinks() {
        let mut tree = Tree::new("~", None);
        let root = tree.root();
        let src = tree.create_child(root, "src", Kind::Dir).unwrap();
        let dst = tree.create_child(root, "dst", Kind::Dir).unwrap();
        let file = tree.create_child(src, "f.txt", Kind::File).unwrap();

        tree.move_node(file, dst, "g.txt").unwrap();
        assert!(tree.get_child(src, "f.txt").is_none());
        assert_eq!(tree.get_child(dst, "g.txt"), Some(file));
        assert_eq!(tree.path(file), "~/dst/g.txt");
    }

    #[test]
    fn test_move_node_failure_leaves_source() {
        let mut tree = Tree::new("~", None);
        let root = tree.root();
        let a = tree.create_child(root, "a", Kind::Dir).unwrap();
        let inner = tree.create_child(a, "inner", Kind::Dir).unwrap();

        let err = tree.move_node(a, inner, "a").unwrap_err();
        assert!(matches!(err, FsError::InvalidTarget(_)));
        assert_eq!(tree.get_child(root, "a"), Some(a));
        assert_eq!(tree.node(a).unwrap().name(), "a");
        assert_eq!(tree.node(a).unwrap().parent(), Some(root));
    }

    #[test]
    fn test_deep_copy_is_independent() {
        let mut tree = Tree::new("~", None);
        let root = tree.root();
        let dir = tree.create_child(root, "d", Kind::Dir).unwrap();
        let file = tree.create_child(dir, "f", Kind::File).unwrap();
        tree.edit(file, "data").unwrap();

        let copy = tree.deep_copy(dir).unwrap();
        assert_ne!(copy, dir);
        assert_eq!(tree.node(copy).unwrap().parent(), None);
        let copied_file = tree.get_child(copy, "f").unwrap();
        assert_ne!(copied_file, file);

        tree.edit(copied_file, "changed").unwrap();
        assert_eq!(tree.content(file), Some("data"));
    }

    #[test]
    fn test_discard_refuses_linked_nodes() {
        let mut tree = Tree::new("~", None);
        let root = tree.root();
        let a = tree.create_child(root, "a", Kind::Dir).unwrap();
        assert!(tree.discard(a).is_err());
        assert!(tree.discard(root).is_err());
    }

    #[test]
    fn test_slots_are_reused() {
        let mut tree = Tree::new("~", None);
        let root = tree.root();
        tree.create_child(root, "a", Kind::File).unwrap();
        let detached = tree.remove_child(root, "a", false).unwrap();
        tree.discard(detached).unwrap();
        let b = tree.create_child(root, "b", Kind::File).unwrap();
        assert_eq!(b, detached);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_set_capacity_below_usage_fails() {
        let mut tree = Tree::new("~", None);
        let root = tree.root();
        let file = tree.create_child(root, "f", Kind::File).unwrap();
        tree.edit(file, "abcdef").unwrap();
        assert!(tree.set_capacity(Some(3)).is_err());
        assert_eq!(tree.capacity(), None);
        tree.set_capacity(Some(6)).unwrap();
        assert_eq!(tree.usage().available(), Some(0));
    }

    #[test]
    fn test_signed_capacity() {
        assert_eq!(capacity_from_signed(-1), None);
        assert_eq!(capacity_from_signed(10), Some(10));
        assert_eq!(capacity_to_signed(None), -1);
        assert_eq!(capacity_to_signed(Some(7)), 7);
        assert_eq!(Tree::with_signed_capacity("~", -5).capacity(), None);
    }
}
