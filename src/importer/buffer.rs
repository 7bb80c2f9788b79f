//! Shared buffer for fetched records awaiting persistence.

use crate::db::NewObject;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Accumulates fetched records until a flush drains them to the database.
///
/// Cheap to clone; all clones share the same underlying buffer.
#[derive(Clone, Default)]
pub(crate) struct RecordBuffer {
    records: Arc<Mutex<Vec<NewObject>>>,
}

impl RecordBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append a record, returning the buffered count including it
    pub(crate) async fn append(&self, record: NewObject) -> usize {
        let mut records = self.records.lock().await;
        records.push(record);
        records.len()
    }

    /// Drain all buffered records
    pub(crate) async fn take_all(&self) -> Vec<NewObject> {
        std::mem::take(&mut *self.records.lock().await)
    }

    /// Put records back after a failed write so a later flush can retry them
    pub(crate) async fn restore(&self, records: Vec<NewObject>) {
        self.records.lock().await.extend(records);
    }

    /// Test-only accessor for the buffered record count
    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub(crate) async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}
