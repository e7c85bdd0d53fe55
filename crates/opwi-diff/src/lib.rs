//! Line diff engine for the OPWI revision store.
//!
//! Computes the ordered [`ChangeOp`](opwi_types::ChangeOp) sequence that turns
//! one text into another, and applies such sequences back.
//!
//! # Key Functions
//!
//! - [`diff`] -- Myers line diff producing typed ops
//! - [`apply_ops`] -- Apply one revision's ops to a snapshot
//! - [`replay`] -- Rebuild content from empty by applying every revision
//! - [`split_lines`] / [`join_lines`] -- The line model shared by all of the above
//!
//! Laws: `diff(x, x)` is empty, and `apply_ops(old, &diff(old, new)) == new`.

pub mod apply;
pub mod error;
pub mod line_diff;
pub mod lines;

pub use apply::{apply_ops, replay};
pub use error::{DiffError, DiffResult};
pub use line_diff::{diff, DiffStats};
pub use lines::{join_lines, split_lines, split_op_text};
