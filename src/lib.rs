//! # met-importer
//!
//! Bulk importer for the Metropolitan Museum of Art open-access collection API.
//!
//! Fetches the complete object ID listing, downloads every object record with
//! bounded parallelism, strips configured bulky subfields, and batch-upserts
//! the trimmed records into a local SQLite database.
//!
//! ## Design Philosophy
//!
//! met-importer is designed to be:
//! - **Polite by default** - Bounded parallelism with per-request throttling and retry backoff
//! - **Idempotent** - Reruns update existing records instead of duplicating them
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Cancellable** - Cooperative cancellation with a final flush, no torn batches
//!
//! ## Quick Start
//!
//! ```no_run
//! use met_importer::{Config, Importer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let importer = Importer::new(config)?;
//!
//!     let report = importer.run().await?;
//!     println!(
//!         "{} succeeded, {} skipped, {} failed",
//!         report.succeeded, report.skipped, report.failed
//!     );
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// HTTP client for the collection API
pub mod client;
/// Configuration types
pub mod config;
/// Database persistence layer
pub mod db;
/// Error types
pub mod error;
/// Concurrent import pipeline
pub mod importer;
/// Retry logic with exponential backoff
pub mod retry;
/// Core types
pub mod types;

// Re-export commonly used types
pub use client::MetClient;
pub use config::{ApiConfig, Config, ImportConfig, PersistenceConfig, RetryConfig};
pub use db::{Database, NewObject, ObjectStore, StoredObject};
pub use error::{DatabaseError, Error, Result};
pub use importer::Importer;
pub use types::{ImportReport, ObjectId};

/// Helper function to run an import with graceful signal handling.
///
/// Runs the import while listening for a termination signal. On signal the
/// run is cancelled, buffered records are flushed, and the call returns
/// [`Error::Cancelled`].
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use met_importer::{Config, Importer, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let importer = Importer::new(Config::default())?;
///
///     // Run with automatic signal handling
///     let report = run_with_shutdown(importer).await?;
///     println!("imported {} of {} objects", report.succeeded, report.total);
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(importer: Importer) -> Result<ImportReport> {
    let cancel_token = importer.cancel_token();
    let signal_task = tokio::spawn(async move {
        wait_for_signal().await;
        cancel_token.cancel();
    });

    let result = importer.run().await;
    signal_task.abort();
    result
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration can fail in restricted environments (containers, tests);
    // fall back to the portable ctrl_c handler in that case
    match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM, shutting down"),
                _ = sigint.recv() => tracing::info!("Received SIGINT, shutting down"),
            }
        }
        (term, int) => {
            let e = term.err().or(int.err());
            tracing::warn!(error = ?e, "Signal registration failed, falling back to ctrl_c");
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Received Ctrl+C, shutting down");
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
        Err(e) => tracing::error!(error = %e, "Could not listen for Ctrl+C"),
    }
}
