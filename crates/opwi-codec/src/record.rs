use std::fmt;

/// What was wrong with a skipped record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordKind {
    DuplicateHeader,
    InvalidHeader,
    InvalidMeta,
    InvalidRevisionHeader,
    /// A `REVUSER` line that no block followed.
    OrphanRevisionHeader,
    /// A block with no preceding `REVUSER` line.
    MissingRevisionHeader,
    StrayLine,
    UnknownMarker,
    UnterminatedBlock,
    InvalidChanges,
    ReplayFailed,
    /// Kept, but earlier than the revision before it.
    TimestampRegression,
}

impl RecordKind {
    /// Returns `true` if the record's content did not make it into the
    /// decoded document, so re-encoding would lose it.
    pub fn drops_data(self) -> bool {
        !matches!(self, Self::TimestampRegression)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::DuplicateHeader => "duplicate header",
            Self::InvalidHeader => "invalid header",
            Self::InvalidMeta => "invalid meta",
            Self::InvalidRevisionHeader => "invalid revision header",
            Self::OrphanRevisionHeader => "orphan revision header",
            Self::MissingRevisionHeader => "missing revision header",
            Self::StrayLine => "stray line",
            Self::UnknownMarker => "unknown marker",
            Self::UnterminatedBlock => "unterminated block",
            Self::InvalidChanges => "invalid changes",
            Self::ReplayFailed => "replay failed",
            Self::TimestampRegression => "timestamp regression",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recoverable defect found while decoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorruptRecord {
    /// 1-based line number where the record starts.
    pub line: usize,
    pub kind: RecordKind,
    pub detail: String,
}

impl CorruptRecord {
    pub fn new(line: usize, kind: RecordKind, detail: impl Into<String>) -> Self {
        Self {
            line,
            kind,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for CorruptRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}: {}", self.line, self.kind, self.detail)
    }
}
