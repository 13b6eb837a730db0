use crate::nintendo::ntr::fs::node::NodeId;
use thiserror::Error;

/// Failures while reconstructing the directory tree; any of them aborts the whole build.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("ROM doesn't include a file system")]
    NoFileSystem,

    #[error("Root folder not found in the file name table")]
    RootNotFound,

    #[error("File name table ends before {needed} bytes at offset {position:#x} could be read")]
    TruncatedNameTable { position: usize, needed: usize },

    #[error("Corrupt file system index: {0}")]
    CorruptIndex(String),
}

pub type TreeResult<T> = Result<T, TreeError>;

/// Per-operation failures of the virtual file system, the tree itself stays usable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VfsError {
    #[error("No node with id {0}")]
    UnknownNode(NodeId),

    #[error("{0} is a folder, not a file")]
    NotAFile(String),

    #[error("Access [{offset:#x}, +{size:#x}) is out of bounds of {limit:#x} bytes")]
    OutOfBounds { offset: u64, size: u64, limit: u64 },

    #[error("File needs {requested:#x} bytes but only {capacity:#x} are allocated")]
    CapacityExceeded { requested: u64, capacity: u32 },
}

pub type VfsResult<T> = Result<T, VfsError>;
