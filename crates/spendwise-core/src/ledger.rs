//! Append-only history of observed expenses.
//!
//! Entries are kept in arrival order and are never edited or removed.
//! Appends take the write lock, so concurrent producers are serialized and
//! no append is lost; readers clone the whole list under the read lock and
//! therefore always see a complete snapshot.

use std::sync::{PoisonError, RwLock};

use tracing::debug;

use crate::error::Result;
use crate::models::ExpenseRecord;

#[derive(Debug, Default)]
pub struct HistoryLedger {
    entries: RwLock<Vec<ExpenseRecord>>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append a copy of `record`
    pub fn append(&self, record: ExpenseRecord) -> Result<()> {
        record.validate()?;
        // A panic while holding the lock can't leave a half-pushed record,
        // so a poisoned lock still guards a consistent list.
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.push(record);
        debug!(entries = entries.len(), "Recorded expense");
        Ok(())
    }

    /// Snapshot of every entry in arrival order
    pub fn all(&self) -> Vec<ExpenseRecord> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
