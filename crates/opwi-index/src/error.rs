//! Error types for the index crate.

use std::path::PathBuf;

/// Errors that can occur during index operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory traversal failed during a rebuild.
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    /// The temp file could not be renamed over its target.
    #[error("persist error: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// The storage root does not exist.
    #[error("storage root not found: {}", .0.display())]
    MissingRoot(PathBuf),
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;
