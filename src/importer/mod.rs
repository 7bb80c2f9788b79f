//! Concurrent collection import pipeline.
//!
//! Fetches the full object ID listing, then fans the per-object fetches out
//! across a bounded number of concurrent tasks. Fetched records accumulate
//! in a shared buffer and are batch-upserted into SQLite whenever the batch
//! threshold is reached, with a final flush before the run returns.

use crate::client::MetClient;
use crate::config::Config;
use crate::db::{Database, ObjectStore};
use crate::error::{Error, Result};
use crate::types::ImportReport;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

mod buffer;
mod flush;
mod progress;
mod task;

use buffer::RecordBuffer;
use flush::BatchFlusher;
use progress::ProgressTracker;
use task::{FetchTaskContext, OutcomeCounters, process_object};

/// Orchestrates a full collection import run
///
/// Owns the HTTP client and the cancellation token; the database handle is
/// created per run so repeated runs reopen the configured path.
pub struct Importer {
    config: Arc<Config>,
    client: Arc<MetClient>,
    cancel_token: CancellationToken,
}

impl Importer {
    /// Create an importer from configuration
    pub fn new(config: Config) -> Result<Self> {
        let client = MetClient::new(&config)?;

        Ok(Self {
            config: Arc::new(config),
            client: Arc::new(client),
            cancel_token: CancellationToken::new(),
        })
    }

    /// Token observed by the run loop; cancel it to stop the import early
    ///
    /// A cancelled run still flushes buffered records before returning
    /// [`Error::Cancelled`].
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Run the import to completion
    ///
    /// Returns the outcome tally, or [`Error::Cancelled`] if the run was
    /// stopped early. Per-object fetch failures are counted in the report
    /// rather than aborting the run; only the initial listing fetch and
    /// database setup are fatal.
    pub async fn run(&self) -> Result<ImportReport> {
        tracing::info!("Starting collection import");

        let database = match Database::new(&self.config.persistence.database_path).await {
            Ok(db) => Arc::new(db),
            Err(e) => {
                tracing::error!(error = %e, "Error initializing database");
                return Err(e);
            }
        };
        let store: Arc<dyn ObjectStore> = database.clone();

        let object_ids = match self.client.list_object_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch object IDs");
                return Err(e);
            }
        };

        let total = object_ids.len() as u64;
        tracing::info!(total, "Fetched object ID listing");

        let buffer = RecordBuffer::new();
        let flusher = Arc::new(BatchFlusher::new(buffer.clone(), store));
        let progress = Arc::new(ProgressTracker::new(total));
        let counters = Arc::new(OutcomeCounters::default());
        let semaphore = Arc::new(Semaphore::new(self.config.import.parallelism));

        let ctx = Arc::new(FetchTaskContext {
            client: self.client.clone(),
            buffer,
            flusher: flusher.clone(),
            progress: progress.clone(),
            counters: counters.clone(),
            cancel_token: self.cancel_token.clone(),
            batch_size: self.config.import.batch_size,
            throttle_min_ms: self.config.import.throttle_min_ms,
            throttle_max_ms: self.config.import.throttle_max_ms,
        });

        let mut handles = Vec::with_capacity(object_ids.len());
        for id in object_ids {
            let permit = tokio::select! {
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    // The semaphore is never closed, but don't hang if it is
                    Err(_) => break,
                },
                _ = self.cancel_token.cancelled() => break,
            };

            let ctx = Arc::clone(&ctx);
            handles.push(tokio::spawn(process_object(ctx, id, permit)));
        }

        for result in futures::future::join_all(handles).await {
            if let Err(e) = result {
                tracing::error!(error = %e, "Fetch task panicked");
            }
        }

        // Persist whatever is still buffered, cancelled or not
        flusher.flush().await;
        progress.finish();

        let report = ImportReport {
            total,
            succeeded: counters.succeeded.load(Ordering::SeqCst),
            skipped: counters.skipped.load(Ordering::SeqCst),
            failed: counters.failed.load(Ordering::SeqCst),
        };

        drop(ctx);
        drop(flusher);
        // All fetch tasks have joined, so this is the last database handle
        if let Ok(db) = Arc::try_unwrap(database) {
            db.close().await;
        }

        if self.cancel_token.is_cancelled() {
            tracing::warn!(
                processed = report.processed(),
                total = report.total,
                "Import cancelled"
            );
            return Err(Error::Cancelled);
        }

        tracing::info!(
            succeeded = report.succeeded,
            skipped = report.skipped,
            failed = report.failed,
            "Import finished"
        );
        Ok(report)
    }
}
