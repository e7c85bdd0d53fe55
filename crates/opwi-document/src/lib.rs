//! Document aggregate for the OPWI revision store.
//!
//! A [`Document`] owns its identity, metadata, materialized content and the
//! ordered revision chain that produces that content. Content only changes
//! through [`Document::update`], which records a line diff as a new
//! [`Revision`](opwi_types::Revision) or reports [`UpdateOutcome::NoChange`].
//!
//! - Content always equals a full replay of the revision chain
//! - The first revision is a pure insert (document creation)
//! - Contributors are the ordered, duplicate-free set of revision authors
//! - [`DocumentValidator`] checks all of the above on untrusted documents

pub mod contributors;
pub mod document;
pub mod error;
pub mod validation;

pub use contributors::Contributors;
pub use document::{Document, DocumentHeader, UpdateOutcome};
pub use error::{DocumentError, DocumentResult};
pub use validation::{DocumentValidator, ValidationReport, Violation, ViolationKind};
