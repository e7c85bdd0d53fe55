use opwi_codec::{CodecError, CorruptRecord};
use opwi_document::DocumentError;
use opwi_index::IndexError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("document already exists: {0}")]
    AlreadyExists(String),

    /// The stored file has records the decoder had to skip. Writing it back
    /// would erase them, so writes are refused until it is repaired.
    #[error("document {address} has {} unreadable records", records.len())]
    Damaged {
        address: String,
        records: Vec<CorruptRecord>,
    },

    #[error("invalid {field}: {reason}")]
    InvalidContent { field: &'static str, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("index error: {0}")]
    Index(#[from] IndexError),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("document error: {0}")]
    Document(DocumentError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("lock poisoned: {0}")]
    LockPoisoned(&'static str),
}

impl From<DocumentError> for StoreError {
    fn from(e: DocumentError) -> Self {
        match e {
            DocumentError::InvalidContent { field, reason } => Self::InvalidContent { field, reason },
            other => Self::Document(other),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
