use std::fmt;

use serde::{Deserialize, Serialize};

use crate::op::{ChangeOp, OpKind};
use crate::temporal::Timestamp;

/// Content-derived revision identifier (BLAKE3).
///
/// Never persisted: it is recomputed from the revision's author, origin,
/// timestamp and ops, so two stores holding the same history agree on it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RevisionId([u8; 32]);

impl RevisionId {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Git-style short form (first 7 hex characters).
    pub fn short_hex(&self) -> String {
        let mut hex = hex::encode(&self.0[..4]);
        hex.truncate(7);
        hex
    }
}

impl fmt::Debug for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RevisionId({})", self.short_hex())
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// One recorded edit event.
///
/// Applying `ops` in order to the content before this revision yields the
/// content after it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    pub author: String,
    pub origin_address: String,
    pub timestamp: Timestamp,
    pub ops: Vec<ChangeOp>,
}

impl Revision {
    pub fn new(
        author: impl Into<String>,
        origin_address: impl Into<String>,
        timestamp: Timestamp,
        ops: Vec<ChangeOp>,
    ) -> Self {
        Self {
            author: author.into(),
            origin_address: origin_address.into(),
            timestamp,
            ops,
        }
    }

    /// Derive the revision identifier.
    pub fn revision_id(&self) -> RevisionId {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"opwi-revision-v1:");
        for field in [
            self.author.as_str(),
            self.origin_address.as_str(),
            self.timestamp.as_str(),
        ] {
            hasher.update(&(field.len() as u64).to_le_bytes());
            hasher.update(field.as_bytes());
        }
        for op in &self.ops {
            let opcode = op.opcode();
            hasher.update(&(opcode.len() as u64).to_le_bytes());
            hasher.update(opcode.as_bytes());
            hasher.update(&(op.text.len() as u64).to_le_bytes());
            hasher.update(op.text.as_bytes());
        }
        RevisionId(*hasher.finalize().as_bytes())
    }

    /// Returns `true` if every op is an insert (the shape of a creation revision).
    pub fn is_pure_insert(&self) -> bool {
        self.ops.iter().all(|op| op.kind == OpKind::Insert)
    }

    /// Returns `true` if the revision carries no ops.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Revision {
        Revision::new(
            "alice",
            "127.0.0.1",
            Timestamp::from_string("2025-01-01T00:00:00.000000Z"),
            vec![ChangeOp::insert(0, 1, "Hello world")],
        )
    }

    #[test]
    fn revision_id_is_deterministic() {
        assert_eq!(sample().revision_id(), sample().revision_id());
    }

    #[test]
    fn revision_id_changes_with_content() {
        let mut other = sample();
        other.ops[0].text = "Hello there".into();
        assert_ne!(sample().revision_id(), other.revision_id());
    }

    #[test]
    fn revision_id_separates_fields() {
        let a = Revision::new("ab", "c", Timestamp::from_string("t"), vec![]);
        let b = Revision::new("a", "bc", Timestamp::from_string("t"), vec![]);
        assert_ne!(a.revision_id(), b.revision_id());
    }

    #[test]
    fn short_hex_is_seven_chars() {
        assert_eq!(sample().revision_id().short_hex().len(), 7);
    }

    #[test]
    fn pure_insert_detection() {
        assert!(sample().is_pure_insert());
        let mut edited = sample();
        edited.ops.push(ChangeOp::delete(0, 1, "Hello world"));
        assert!(!edited.is_pure_insert());
    }
}
