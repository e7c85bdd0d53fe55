use opwi_diff::DiffError;

/// Errors produced by document operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    /// Caller-supplied text cannot be stored.
    #[error("invalid {field}: {reason}")]
    InvalidContent { field: &'static str, reason: String },

    /// The revision chain does not replay.
    #[error("replay failed: {0}")]
    Replay(#[from] DiffError),
}

impl DocumentError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidContent {
            field,
            reason: reason.into(),
        }
    }
}

/// Convenience alias for document results.
pub type DocumentResult<T> = Result<T, DocumentError>;
