//! Per-object fetch task.

use crate::client::MetClient;
use crate::types::ObjectId;
use rand::Rng;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::OwnedSemaphorePermit;
use tokio_util::sync::CancellationToken;

use super::buffer::RecordBuffer;
use super::flush::BatchFlusher;
use super::progress::ProgressTracker;

/// Outcome tallies for a whole import run
#[derive(Default)]
pub(crate) struct OutcomeCounters {
    pub(crate) succeeded: AtomicU64,
    pub(crate) skipped: AtomicU64,
    pub(crate) failed: AtomicU64,
}

/// Shared state handed to every fetch task
pub(crate) struct FetchTaskContext {
    pub(crate) client: Arc<MetClient>,
    pub(crate) buffer: RecordBuffer,
    pub(crate) flusher: Arc<BatchFlusher>,
    pub(crate) progress: Arc<ProgressTracker>,
    pub(crate) counters: Arc<OutcomeCounters>,
    pub(crate) cancel_token: CancellationToken,
    pub(crate) batch_size: usize,
    pub(crate) throttle_min_ms: u64,
    pub(crate) throttle_max_ms: u64,
}

/// Fetch one object, buffer it, and flush once the batch threshold is reached
///
/// Fetch failures are tallied, never propagated; a cancelled task abandons
/// its fetch without counting the object as processed. The permit is
/// released on every exit path, and before the trailing throttle delay so
/// the delay never starves the pool.
pub(crate) async fn process_object(
    ctx: Arc<FetchTaskContext>,
    id: ObjectId,
    permit: OwnedSemaphorePermit,
) {
    let fetched = tokio::select! {
        result = ctx.client.fetch_object(id) => result,
        _ = ctx.cancel_token.cancelled() => return,
    };

    match fetched {
        Ok(Some(record)) => {
            let buffered = ctx.buffer.append(record).await;
            if buffered >= ctx.batch_size {
                ctx.flusher.flush().await;
            }
            ctx.counters.succeeded.fetch_add(1, Ordering::SeqCst);
        }
        Ok(None) => {
            tracing::warn!(object_id = id.get(), "Skipping object after retries");
            ctx.counters.skipped.fetch_add(1, Ordering::SeqCst);
        }
        Err(e) => {
            tracing::error!(object_id = id.get(), error = %e, "Error processing object");
            ctx.counters.failed.fetch_add(1, Ordering::SeqCst);
        }
    }

    ctx.progress.increment_and_render();
    drop(permit);

    // ThreadRng is not Send, so pick the delay before awaiting
    let delay_ms = if ctx.throttle_min_ms >= ctx.throttle_max_ms {
        ctx.throttle_min_ms
    } else {
        rand::thread_rng().gen_range(ctx.throttle_min_ms..ctx.throttle_max_ms)
    };

    tokio::select! {
        _ = tokio::time::sleep(Duration::from_millis(delay_ms)) => {}
        _ = ctx.cancel_token.cancelled() => {}
    }
}
