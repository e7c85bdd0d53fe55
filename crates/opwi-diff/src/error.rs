//! Error types for the diff crate.

/// Errors raised while applying change ops to a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    /// The op addresses lines past the end of the current content.
    #[error("op {position} ({opcode}) is out of range for {available} lines")]
    OpOutOfRange {
        position: usize,
        opcode: String,
        available: usize,
    },

    /// The op text does not split into `line_count` lines.
    #[error("op {position} ({opcode}) text does not hold {expected} lines")]
    LineCountMismatch {
        position: usize,
        opcode: String,
        expected: usize,
    },

    /// Ops must be sorted by base-content position and must not overlap.
    #[error("op {position} starts at line {line_index}, before the previous op ends at {cursor}")]
    OpsOutOfOrder {
        position: usize,
        line_index: usize,
        cursor: usize,
    },

    /// A delete's recorded text differs from the lines it removes.
    #[error("op {position} ({opcode}) removes lines that differ from its recorded text")]
    DeleteMismatch { position: usize, opcode: String },

    /// Replaying a revision failed.
    #[error("revision {revision}: {source}")]
    Revision {
        revision: usize,
        #[source]
        source: Box<DiffError>,
    },
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
