//! Database layer for met-importer
//!
//! Handles SQLite persistence for imported collection objects.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] — Database lifecycle, schema migrations
//! - [`objects`] — Object record upserts and queries

use crate::error::Result;
use crate::types::ObjectId;
use async_trait::async_trait;
use sqlx::{FromRow, sqlite::SqlitePool};

mod migrations;
mod objects;

/// New object record ready to be written to the database
#[derive(Debug, Clone)]
pub struct NewObject {
    /// Remote collection identifier
    pub id: ObjectId,
    /// Title extracted from the payload, if present
    pub title: Option<String>,
    /// Transformed JSON payload, serialized
    pub payload: String,
    /// Unix timestamp when the record was fetched
    pub retrieved_at: i64,
}

/// Object record from database
#[derive(Debug, Clone, FromRow)]
pub struct StoredObject {
    /// Remote collection identifier
    pub object_id: ObjectId,
    /// Title extracted from the payload, if present
    pub title: Option<String>,
    /// Transformed JSON payload, serialized
    pub payload: String,
    /// Unix timestamp when the record was fetched
    pub retrieved_at: i64,
}

/// Persistence seam for batched object writes
///
/// Implemented by [`Database`]. Tests substitute their own stores to
/// exercise flush failure handling without a real database.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Insert or update a batch of records atomically
    ///
    /// Returns the number of records written. An error means none of the
    /// batch was persisted.
    async fn upsert_batch(&self, records: &[NewObject]) -> Result<usize>;
}

/// Database handle for met-importer
pub struct Database {
    pool: SqlitePool,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
