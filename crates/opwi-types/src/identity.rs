use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Identifier recorded in a document's `DOC:` line.
///
/// New identifiers are UUID v7 (128-bit, time-ordered). Any single-line,
/// non-empty string is accepted when reading so documents written with other
/// UUID versions keep their identity.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Generate a new time-ordered identifier (UUID v7).
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    /// Accept an identifier read from storage.
    pub fn parse(value: &str) -> Result<Self, TypeError> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.contains('\n') {
            return Err(TypeError::InvalidDocumentId(value.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short representation (first 8 characters).
    pub fn short_id(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({})", self.short_id())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
