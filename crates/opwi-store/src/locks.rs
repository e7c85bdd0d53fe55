use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Per-address exclusive sections.
///
/// Each address maps to its own mutex, so edits to different documents run
/// in parallel while read-modify-write cycles on one document are serialized.
#[derive(Debug, Default)]
pub struct DocumentLocks {
    table: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DocumentLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `address`.
    pub fn with_lock<T>(
        &self,
        address: &str,
        f: impl FnOnce() -> StoreResult<T>,
    ) -> StoreResult<T> {
        let slot = {
            let mut table = self
                .table
                .lock()
                .map_err(|_| StoreError::LockPoisoned("document lock table"))?;
            Arc::clone(table.entry(address.to_string()).or_default())
        };
        let result = match slot.lock() {
            Ok(_guard) => {
                debug!(address, "document lock acquired");
                f()
            }
            Err(_) => Err(StoreError::LockPoisoned("document lock")),
        };
        self.release(address, &slot)?;
        result
    }

    /// Drop the table entry for `address` once no other caller holds or
    /// waits on `slot`. Clones are only taken under the table lock, so the
    /// count cannot grow while it is checked.
    fn release(&self, address: &str, slot: &Arc<Mutex<()>>) -> StoreResult<()> {
        let mut table = self
            .table
            .lock()
            .map_err(|_| StoreError::LockPoisoned("document lock table"))?;
        // One reference in the table, one held by this caller.
        if Arc::strong_count(slot) == 2 {
            table.remove(address);
        }
        Ok(())
    }

    /// Number of addresses currently locked or waited on.
    pub fn len(&self) -> usize {
        self.table.lock().map(|t| t.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
