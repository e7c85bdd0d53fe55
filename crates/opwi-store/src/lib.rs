//! Filesystem-backed document store for OPWI documents.
//!
//! [`DocumentManager`] is the entry point: it owns the storage layout, the
//! [`DocumentIndex`](opwi_index::DocumentIndex) cache and the per-document
//! locks that serialize concurrent edits to the same address.

pub mod config;
pub mod error;
pub mod locks;
pub mod manager;
pub mod search;

pub use config::{NamespaceConfig, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use locks::DocumentLocks;
pub use manager::DocumentManager;
pub use search::{MatchKind, SearchHit, SearchScope};

// Re-export key types
pub use opwi_codec::{CorruptRecord, Decoded, RecordKind};
pub use opwi_document::{Document, UpdateOutcome, ValidationReport};
pub use opwi_index::{IndexEntry, NamespaceEntry, RebuildReport};
pub use opwi_types::{ChangeOp, DocumentId, OpKind, Revision, RevisionId, Timestamp};
