//! Document index for the OPWI revision store.
//!
//! The [`DocumentIndex`] maps document addresses (`main/Home`) to summary
//! [`IndexEntry`] records and tracks known namespaces. It is a cache: the
//! `.opwi` files under the pages directory are the source of truth, and
//! [`DocumentIndex::rebuild`] regenerates the whole index from them.

pub mod address;
pub mod atomic;
pub mod entry;
pub mod error;
pub mod index;

pub use address::{address_for, address_of, relative_path};
pub use atomic::write_atomic;
pub use entry::{IndexEntry, NamespaceEntry};
pub use error::{IndexError, IndexResult};
pub use index::{DocumentIndex, RebuildReport, ScanOptions};
