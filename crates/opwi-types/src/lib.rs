//! Foundation types for the OPWI document revision store.
//!
//! This crate provides the leaf types shared by every other `opwi-*` crate:
//! the typed line edit, the revision record that groups edits, and the
//! identity and time types that label them.
//!
//! # Key Types
//!
//! - [`ChangeOp`] / [`OpKind`] -- A typed insert/delete/replace over a line range
//! - [`Revision`] -- One recorded edit event (author, origin, time, ops)
//! - [`RevisionId`] -- BLAKE3-derived revision identifier (never stored)
//! - [`Timestamp`] -- ISO-8601 timestamp preserved verbatim
//! - [`DocumentId`] -- Identifier carried in a document's `DOC:` line

pub mod error;
pub mod identity;
pub mod op;
pub mod revision;
pub mod temporal;

pub use error::TypeError;
pub use identity::DocumentId;
pub use op::{ChangeOp, OpKind};
pub use revision::{Revision, RevisionId};
pub use temporal::Timestamp;
