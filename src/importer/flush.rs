//! Batched persistence of buffered records.

use crate::db::ObjectStore;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::buffer::RecordBuffer;

/// Drains the record buffer into the object store.
///
/// Only one flush runs at a time; the lock is held across the database
/// write so concurrent flush requests queue up instead of interleaving
/// half-drained batches.
pub(crate) struct BatchFlusher {
    buffer: RecordBuffer,
    store: Arc<dyn ObjectStore>,
    flush_lock: Mutex<()>,
}

impl BatchFlusher {
    pub(crate) fn new(buffer: RecordBuffer, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            buffer,
            store,
            flush_lock: Mutex::new(()),
        }
    }

    /// Persist everything currently buffered
    ///
    /// A failed write puts the drained records back so the next flush can
    /// retry them; errors are logged, never propagated.
    pub(crate) async fn flush(&self) {
        if self.buffer.is_empty().await {
            return;
        }

        let _guard = self.flush_lock.lock().await;

        // Another flush may have drained the buffer while we waited
        if self.buffer.is_empty().await {
            return;
        }

        let batch = self.buffer.take_all().await;
        match self.store.upsert_batch(&batch).await {
            Ok(written) => {
                tracing::info!(count = written, "Flushed objects to database");
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    count = batch.len(),
                    "Flush failed, returning records to buffer"
                );
                self.buffer.restore(batch).await;
            }
        }
    }
}
