//! User-facing filesystem verbs.
//!
//! [`FileSystem`] owns a [`Tree`] and a current-directory cursor. Every verb
//! resolves its paths relative to the cursor (unless root-anchored), checks
//! everything it needs up front, and only then mutates, so a failed verb
//! leaves the tree untouched.

use crate::error::{FsError, FsResult};
use crate::node::{Kind, ListEntry, Node, NodeId};
use crate::resolve::{resolve, split_parent};
use crate::tree::{Tree, Usage};
use crate::validate::{validate, ValidationReport};

/// Name given to a fresh root.
pub const DEFAULT_ROOT_NAME: &str = "~";

/// Deepest nesting a recursive listing descends to.
pub const MAX_LS_DEPTH: usize = 5;

/// A rooted tree plus a current-directory cursor.
#[derive(Debug, Clone)]
pub struct FileSystem {
    tree: Tree,
    cwd: NodeId,
}

impl Default for FileSystem {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_NAME, None)
    }
}

impl FileSystem {
    /// Create a filesystem with an empty root.
    pub fn new(root_name: impl Into<String>, capacity: Option<usize>) -> Self {
        Self::from_tree(Tree::new(root_name, capacity))
    }

    /// Wrap an existing tree; the cursor starts at its root.
    pub fn from_tree(tree: Tree) -> Self {
        let cwd = tree.root();
        Self { tree, cwd }
    }

    /// Borrow the underlying tree.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Give up the cursor and return the tree.
    pub fn into_tree(self) -> Tree {
        self.tree
    }

    /// The root's name, which also names this filesystem when mounted.
    pub fn name(&self) -> &str {
        self.tree.root_name()
    }

    /// The root directory.
    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    /// The current directory.
    pub fn cwd(&self) -> NodeId {
        self.cwd
    }

    /// Path of the current directory.
    pub fn cwd_path(&self) -> String {
        self.tree.path(self.cwd)
    }

    /// Bytes used and budget.
    pub fn usage(&self) -> Usage {
        self.tree.usage()
    }

    /// Change the byte budget.
    pub fn set_capacity(&mut self, capacity: Option<usize>) -> FsResult<()> {
        self.tree.set_capacity(capacity)
    }

    /// Resolve `path` against the cursor.
    pub fn resolve(&self, path: &str, dirs_only: bool) -> FsResult<NodeId> {
        resolve(&self.tree, self.cwd, path, dirs_only)
    }

    /// Resolve `path` and borrow the node.
    pub fn get(&self, path: &str) -> FsResult<&Node> {
        let id = self.resolve(path, false)?;
        self.tree.at(id)
    }

    /// Full path of whatever `path` resolves to.
    pub fn path_of(&self, path: &str) -> FsResult<String> {
        Ok(self.tree.path(self.resolve(path, false)?))
    }

    // ========================================================================
    // Reading
    // ========================================================================

    /// List the directory at `path` (the cursor when empty).
    ///
    /// Entries are sorted by name. Names starting with `.` are hidden unless
    /// `show_all`. A recursive listing descends at most [`MAX_LS_DEPTH`]
    /// levels. Listing a file yields just that file.
    pub fn ls(&self, path: &str, recursive: bool, show_all: bool) -> FsResult<Vec<ListEntry>> {
        let target = self.resolve(path, false)?;
        let node = self.tree.at(target)?;
        if node.is_file() {
            return Ok(vec![ListEntry::new(node.name(), Kind::File, 0)]);
        }

        let mut entries = Vec::new();
        self.list_into(target, 0, recursive, show_all, &mut entries);
        Ok(entries)
    }

    fn list_into(
        &self,
        dir: NodeId,
        depth: usize,
        recursive: bool,
        show_all: bool,
        out: &mut Vec<ListEntry>,
    ) {
        for (name, child) in self.tree.children(dir) {
            if name.starts_with('.') && !show_all {
                continue;
            }
            let Some(node) = self.tree.node(child) else {
                continue;
            };
            out.push(ListEntry::new(name, node.kind(), depth));
            if recursive && node.is_dir() && depth + 1 < MAX_LS_DEPTH {
                self.list_into(child, depth + 1, recursive, show_all, out);
            }
        }
    }

    /// Content of the file at `path`.
    pub fn read(&self, path: &str) -> FsResult<&str> {
        let id = self.resolve(path, false)?;
        self.tree
            .content(id)
            .ok_or_else(|| FsError::is_a_directory(path))
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Move the cursor to the directory at `path`.
    pub fn cd(&mut self, path: &str) -> FsResult<()> {
        self.cwd = self.resolve(path, true)?;
        Ok(())
    }

    // ========================================================================
    // Writing
    // ========================================================================

    /// Create a directory (or return the existing one).
    pub fn mkdir(&mut self, path: &str) -> FsResult<NodeId> {
        self.make(path, Kind::Dir)
    }

    /// Create an empty file (or return the existing one).
    pub fn mkfile(&mut self, path: &str) -> FsResult<NodeId> {
        self.make(path, Kind::File)
    }

    fn make(&mut self, path: &str, kind: Kind) -> FsResult<NodeId> {
        let (parent_path, name) = split_parent(path);
        let dir = self.resolve(parent_path, true)?;
        if let Some(existing) = self.tree.get_child(dir, name) {
            if self.tree.at(existing)?.kind() != kind {
                return Err(FsError::already_exists(self.tree.path(existing)));
            }
        }
        self.tree.create_child(dir, name, kind)
    }

    /// Replace the content of the file at `path`, creating it if missing.
    ///
    /// A file created here is removed again if the content does not fit.
    pub fn write(&mut self, path: &str, content: impl Into<String>) -> FsResult<NodeId> {
        let (parent_path, name) = split_parent(path);
        let dir = self.resolve(parent_path, true)?;

        if let Some(existing) = self.tree.get_child(dir, name) {
            self.tree.edit(existing, content)?;
            return Ok(existing);
        }

        let created = self.tree.create_child(dir, name, Kind::File)?;
        if let Err(err) = self.tree.edit(created, content) {
            let detached = self.tree.remove_child(dir, name, false)?;
            self.tree.discard(detached)?;
            return Err(err);
        }
        Ok(created)
    }

    /// Link a new file named `name` into the directory at `dir_path`.
    ///
    /// Unlike [`write`](Self::write) this never touches an existing entry.
    pub fn insert_file(
        &mut self,
        dir_path: &str,
        name: &str,
        content: impl Into<String>,
    ) -> FsResult<NodeId> {
        let dir = self.resolve(dir_path, true)?;
        let file = self.tree.new_detached_file(name, content)?;
        if let Err(err) = self.tree.add_child(dir, file, false) {
            self.tree.discard(file)?;
            return Err(err);
        }
        Ok(file)
    }

    /// Remove the node at `path`.
    ///
    /// Directories need `recursive`; without it an empty directory is
    /// refused as [`FsError::IsADirectory`] and a populated one as
    /// [`FsError::NotEmpty`]. If the cursor sat inside the removed subtree
    /// it moves to the removed node's parent.
    pub fn rm(&mut self, path: &str, recursive: bool) -> FsResult<()> {
        let target = self.resolve(path, false)?;
        let (parent, name) = self.linked(target, "remove")?;

        let node = self.tree.at(target)?;
        if let Some(children) = node.children() {
            if !recursive {
                return Err(if children.is_empty() {
                    FsError::is_a_directory(self.tree.path(target))
                } else {
                    FsError::not_empty(self.tree.path(target))
                });
            }
        }

        let cursor_inside = self.tree.contains(target, self.cwd);
        let detached = self.tree.remove_child(parent, &name, recursive)?;
        self.tree.discard(detached)?;
        if cursor_inside {
            self.cwd = parent;
        }
        Ok(())
    }

    /// Detach the file at `path` and hand back its name and content.
    pub fn take_file(&mut self, path: &str) -> FsResult<(String, String)> {
        let target = self.resolve(path, false)?;
        let (parent, name) = self.linked(target, "take")?;
        let content = self
            .tree
            .content(target)
            .ok_or_else(|| FsError::is_a_directory(self.tree.path(target)))?
            .to_string();

        let detached = self.tree.remove_child(parent, &name, false)?;
        self.tree.discard(detached)?;
        Ok((name, content))
    }

    /// Give the node at `path` a new name within its directory.
    pub fn rename(&mut self, path: &str, new_name: &str) -> FsResult<()> {
        let target = self.resolve(path, false)?;
        let (parent, name) = self.linked(target, "rename")?;
        self.tree.rename_child(parent, &name, new_name)
    }

    /// Move `from` to `to`.
    ///
    /// If `to` names an existing directory the source moves into it. If it
    /// does not exist, the source is relinked under `to`'s parent with `to`'s
    /// final segment as its name (a plain rename when the parent is
    /// unchanged).
    pub fn mv(&mut self, from: &str, to: &str) -> FsResult<NodeId> {
        self.transfer(from, to, true)
    }

    /// Copy `from` to `to` with the same destination rules as [`mv`](Self::mv).
    ///
    /// The copy is a deep duplicate; the source is left untouched.
    pub fn cp(&mut self, from: &str, to: &str) -> FsResult<NodeId> {
        self.transfer(from, to, false)
    }

    fn transfer(&mut self, from: &str, to: &str, remove_source: bool) -> FsResult<NodeId> {
        let source = self.resolve(from, false)?;
        let verb = if remove_source { "move" } else { "copy" };
        let (source_parent, source_name) = self.linked(source, verb)?;

        match self.resolve(to, false) {
            Ok(existing) => {
                if self.tree.at(existing)?.is_file() {
                    return Err(FsError::already_exists(self.tree.path(existing)));
                }
                self.place(source, existing, &source_name, remove_source)
            }
            Err(FsError::NotFound { .. }) => {
                let (parent_path, name) = split_parent(to);
                let dest_parent = self.resolve(parent_path, true)?;
                if dest_parent == source_parent && remove_source {
                    self.tree.rename_child(source_parent, &source_name, name)?;
                    return Ok(source);
                }
                self.place(source, dest_parent, name, remove_source)
            }
            Err(err) => Err(err),
        }
    }

    fn place(&mut self, source: NodeId, dir: NodeId, name: &str, remove_source: bool) -> FsResult<NodeId> {
        if remove_source {
            self.tree.move_node(source, dir, name)?;
            return Ok(source);
        }

        let copy = self.tree.deep_copy(source)?;
        if let Some(node) = self.tree.node_mut(copy) {
            node.name = name.to_string();
        }
        if let Err(err) = self.tree.add_child(dir, copy, false) {
            self.tree.discard(copy)?;
            return Err(err);
        }
        Ok(copy)
    }

    /// Parent and name of a linked, non-root node.
    fn linked(&self, id: NodeId, verb: &str) -> FsResult<(NodeId, String)> {
        let node = self.tree.at(id)?;
        match node.parent() {
            Some(parent) => Ok((parent, node.name().to_string())),
            None => Err(FsError::invalid_target(format!(
                "cannot {} root '{}'",
                verb,
                node.name()
            ))),
        }
    }

    // ========================================================================
    // Maintenance
    // ========================================================================

    /// Repair inconsistent links; see [`validate`].
    ///
    /// The cursor is reset to the root if it no longer points at a reachable
    /// directory afterwards.
    pub fn validate(&mut self) -> ValidationReport {
        let report = validate(&mut self.tree);
        let cwd_ok = self.tree.is_attached(self.cwd)
            && self.tree.node(self.cwd).is_some_and(Node::is_dir);
        if !cwd_ok {
            self.cwd = self.tree.root();
        }
        report
    }
}
