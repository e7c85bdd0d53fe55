use opwi_document::DocumentError;

/// Errors that abort encoding or decoding of a whole file.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("missing DOC header")]
    MissingHeader,

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("document error: {0}")]
    Document(#[from] DocumentError),
}

pub type CodecResult<T> = Result<T, CodecError>;
