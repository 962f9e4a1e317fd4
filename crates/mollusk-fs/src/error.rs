//! Filesystem error types.

use thiserror::Error;

/// Filesystem error type.
///
/// Every variant is a local, recoverable condition. A verb that returns one
/// of these has left the tree exactly as it found it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsError {
    /// A path segment does not exist.
    #[error("not found: '{segment}' in '{path}'")]
    NotFound { segment: String, path: String },

    /// A file appeared where a directory was required mid-path.
    #[error("not a directory: {0}")]
    NotADirectory(String),

    /// The target resolved to a file where only directories are accepted.
    #[error("is a file: {0}")]
    IsAFile(String),

    /// The target is a directory and the operation needs a file (or a recursive flag).
    #[error("is a directory: {0}")]
    IsADirectory(String),

    /// An entry with that name already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Directory not empty.
    #[error("directory not empty: {0}")]
    NotEmpty(String),

    /// The operation would push the root above its byte budget.
    #[error("capacity exceeded: {required} bytes needed, capacity is {capacity}")]
    CapacityExceeded { required: usize, capacity: usize },

    /// The operation is not allowed on this node (e.g. removing the root).
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    /// Entry names must be non-empty, slash-free and not reserved.
    #[error("invalid name: '{0}'")]
    InvalidName(String),

    /// Every cache slot is taken.
    #[error("cache full: all {slots} slots in use")]
    CacheFull { slots: usize },
}

impl FsError {
    /// Create a NotFound error.
    pub fn not_found(segment: impl Into<String>, path: impl Into<String>) -> Self {
        Self::NotFound {
            segment: segment.into(),
            path: path.into(),
        }
    }

    /// Create a NotADirectory error.
    pub fn not_a_directory(path: impl Into<String>) -> Self {
        Self::NotADirectory(path.into())
    }

    /// Create an IsAFile error.
    pub fn is_a_file(path: impl Into<String>) -> Self {
        Self::IsAFile(path.into())
    }

    /// Create an IsADirectory error.
    pub fn is_a_directory(path: impl Into<String>) -> Self {
        Self::IsADirectory(path.into())
    }

    /// Create an AlreadyExists error.
    pub fn already_exists(name: impl Into<String>) -> Self {
        Self::AlreadyExists(name.into())
    }

    /// Create a NotEmpty error.
    pub fn not_empty(path: impl Into<String>) -> Self {
        Self::NotEmpty(path.into())
    }

    /// Create an InvalidTarget error.
    pub fn invalid_target(reason: impl Into<String>) -> Self {
        Self::InvalidTarget(reason.into())
    }

    /// Create an InvalidName error.
    pub fn invalid_name(name: impl Into<String>) -> Self {
        Self::InvalidName(name.into())
    }
}

/// Filesystem result type.
pub type FsResult<T> = Result<T, FsError>;

/// Errors raised while rebuilding a tree from persisted records.
#[derive(Debug, Error)]
pub enum RecordError {
    /// The record list is empty; there is no root to rebuild.
    #[error("record list is empty")]
    Empty,

    /// The first record must be the root (parent index -1).
    #[error("first record has parent index {0}, expected -1")]
    RootHasParent(i64),

    /// The root record must describe a directory.
    #[error("root record '{0}' is not a directory")]
    RootIsFile(String),

    /// The rebuilt tree holds more bytes than its recorded capacity.
    #[error("tree uses {used} bytes but capacity is {capacity}")]
    OverCapacity { used: usize, capacity: usize },

    /// Only the first record may be parentless.
    #[error("record {0} has no parent but is not the root")]
    ExtraRoot(usize),

    /// A parent index points outside the records constructed so far.
    #[error("record {index} refers to parent {parent}, which is out of range")]
    ParentOutOfRange { index: usize, parent: i64 },

    /// A parent index points at a file, which cannot have children.
    #[error("record {index} refers to parent {parent}, which is a file")]
    ParentIsFile { index: usize, parent: i64 },

    /// Two records share a name under the same parent.
    #[error("record {index} duplicates name '{name}' in its parent")]
    DuplicateName { index: usize, name: String },

    /// A record carries a name the tree would reject.
    #[error("record {index} has invalid name '{name}'")]
    InvalidName { index: usize, name: String },

    /// The tree refused to build the node a record describes.
    #[error("record {index} rejected: {source}")]
    Rejected {
        index: usize,
        #[source]
        source: FsError,
    },

    /// The persisted text is not a valid record list.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
