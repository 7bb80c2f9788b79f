//! Object record upserts and queries.

use crate::error::DatabaseError;
use crate::types::ObjectId;
use crate::{Error, Result};
use async_trait::async_trait;
use sqlx::SqliteConnection;
use std::collections::HashSet;

use super::{Database, NewObject, ObjectStore, StoredObject};

fn query_failed(context: impl std::fmt::Display) -> Error {
    Error::Database(DatabaseError::QueryFailed(context.to_string()))
}

impl Database {
    /// Insert or update a batch of object records
    ///
    /// Records whose id already exists are updated in place; the rest are
    /// inserted. The whole batch is written in a single transaction, so an
    /// error means the table is unchanged.
    pub async fn upsert_batch(&self, records: &[NewObject]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| query_failed(format!("acquire connection: {e}")))?;

        sqlx::query("BEGIN")
            .execute(&mut *conn)
            .await
            .map_err(|e| query_failed(format!("begin batch: {e}")))?;

        let result = async {
            let existing = Self::existing_ids(&mut conn, records).await?;
            for record in records {
                if existing.contains(&record.id) {
                    Self::update_object(&mut conn, record).await?;
                } else {
                    Self::insert_object(&mut conn, record).await?;
                }
            }
            Ok::<(), Error>(())
        }
        .await;

        match result {
            Ok(()) => {
                sqlx::query("COMMIT")
                    .execute(&mut *conn)
                    .await
                    .map_err(|e| query_failed(format!("commit batch: {e}")))?;
            }
            Err(e) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                return Err(e);
            }
        }

        Ok(records.len())
    }

    /// Query which of the batch ids already exist in the objects table
    async fn existing_ids(
        conn: &mut SqliteConnection,
        records: &[NewObject],
    ) -> Result<HashSet<ObjectId>> {
        let placeholders = vec!["?"; records.len()].join(", ");
        let sql = format!(
            "SELECT object_id FROM objects WHERE object_id IN ({})",
            placeholders
        );

        let mut query = sqlx::query_scalar::<_, ObjectId>(&sql);
        for record in records {
            query = query.bind(record.id);
        }

        let ids = query
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| query_failed(format!("select existing ids: {e}")))?;

        Ok(ids.into_iter().collect())
    }

    async fn insert_object(conn: &mut SqliteConnection, record: &NewObject) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO objects (object_id, title, payload, retrieved_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(record.id)
        .bind(&record.title)
        .bind(&record.payload)
        .bind(record.retrieved_at)
        .execute(&mut *conn)
        .await
        .map_err(|e| query_failed(format!("insert object {}: {e}", record.id)))?;

        Ok(())
    }

    async fn update_object(conn: &mut SqliteConnection, record: &NewObject) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE objects
            SET title = ?, payload = ?, retrieved_at = ?
            WHERE object_id = ?
            "#,
        )
        .bind(&record.title)
        .bind(&record.payload)
        .bind(record.retrieved_at)
        .bind(record.id)
        .execute(&mut *conn)
        .await
        .map_err(|e| query_failed(format!("update object {}: {e}", record.id)))?;

        Ok(())
    }

    /// Get a stored object by id
    pub async fn get_object(&self, id: ObjectId) -> Result<Option<StoredObject>> {
        let object = sqlx::query_as::<_, StoredObject>(
            r#"
            SELECT object_id, title, payload, retrieved_at
            FROM objects
            WHERE object_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_failed(format!("fetch object {id}: {e}")))?;

        Ok(object)
    }

    /// Count stored objects
    pub async fn count_objects(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM objects")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| query_failed(format!("count objects: {e}")))?;

        Ok(count)
    }
}

#[async_trait]
impl ObjectStore for Database {
    async fn upsert_batch(&self, records: &[NewObject]) -> Result<usize> {
        Database::upsert_batch(self, records).await
    }
}
