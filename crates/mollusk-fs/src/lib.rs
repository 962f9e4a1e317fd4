//! Capacity-bounded hierarchical filesystem engine.
//!
//! This crate holds the in-memory world state the mollusk shell plays in.
//! Key components:
//!
//! - [`Tree`] - Arena of nodes with a byte budget on the root
//! - [`FileSystem`] - A tree plus a current-directory cursor and the
//!   shell-facing verbs (`ls`, `cd`, `mkdir`, `rm`, `mv`, ...)
//! - [`resolve()`] - Path resolution relative to a start node
//! - [`Record`] - Flat, parent-indexed serialization
//! - [`validate()`] - Structural repair pass
//! - [`Host`] - A named machine with a home filesystem and mounts
//! - [`Cache`] - The player's bounded file cache
//!
//! ## Design Decisions
//!
//! - **Arena, not pointers**: nodes live in a slot vector and refer to each
//!   other by [`NodeId`]. Parent links are plain handles, so there are no
//!   reference cycles to manage.
//! - **Capacity on the root only**: every size check is against the root's
//!   budget. Subtrees moving within a tree cost nothing.
//! - **Check, then mutate**: a verb that fails leaves the tree untouched.
//! - **No I/O**: persistence and logging belong to the shell.

mod cache;
mod error;
mod filesystem;
mod host;
mod node;
mod record;
mod resolve;
mod tree;
mod validate;

pub use cache::{Cache, CachedFile, CACHE_ROOT_NAME, DEFAULT_CACHE_SLOTS};
pub use error::{FsError, FsResult, RecordError};
pub use filesystem::{FileSystem, DEFAULT_ROOT_NAME, MAX_LS_DEPTH};
pub use host::Host;
pub use node::{Kind, ListEntry, Node, NodeId, NodeKind};
pub use record::{from_json, from_records, subtree_records, to_json, to_records, Record};
pub use resolve::{resolve, split_parent};
pub use tree::{capacity_from_signed, capacity_to_signed, Tree, Usage};
pub use validate::{validate, Repair, ValidationReport};
