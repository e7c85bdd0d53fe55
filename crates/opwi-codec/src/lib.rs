//! OPWI file format.
//!
//! One document per file, one record per line:
//!
//! ```text
//! DOC:<doc_id>
//! META:{"title":..,"created_at":..,"tags":[..],"category":..,"namespace":..}
//! REVUSER:<author>:<origin_address>
//! REVTIME:<timestamp>
//! REVBLOCK:START
//! CHANGES:[{"+0|1":"Hello world"}]
//! REVBLOCK:END
//! ```
//!
//! The `REVUSER` .. `REVBLOCK:END` group repeats once per revision. Decoding
//! is tolerant: only a missing `DOC:` line is fatal, every other defect is
//! reported as a [`CorruptRecord`] and the offending block is skipped.

pub mod codec;
pub mod error;
pub mod legacy;
pub mod record;

pub use codec::{Decoded, OpwiCodec};
pub use error::{CodecError, CodecResult};
pub use record::{CorruptRecord, RecordKind};
