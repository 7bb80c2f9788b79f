//! Database lifecycle and schema migrations.

use crate::error::DatabaseError;
use crate::{Error, Result};
use sqlx::SqliteConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool};
use std::path::Path;

use super::Database;

fn connection_failed(context: impl std::fmt::Display) -> Error {
    Error::Database(DatabaseError::ConnectionFailed(context.to_string()))
}

fn migration_failed(context: impl std::fmt::Display) -> Error {
    Error::Database(DatabaseError::MigrationFailed(context.to_string()))
}

impl Database {
    /// Open the database at `path`, creating file and schema as needed
    pub async fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| connection_failed(format!("create database directory: {e}")))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| connection_failed(format!("open {}: {e}", path.display())))?;

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Bring the schema up to the current version
    async fn run_migrations(&self) -> Result<()> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| migration_failed(format!("acquire connection: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY,
                applied_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&mut *conn)
        .await
        .map_err(|e| migration_failed(format!("create schema_version table: {e}")))?;

        let applied: Option<i64> = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| migration_failed(format!("read schema version: {e}")))?
            .flatten();

        if applied.unwrap_or(0) < 1 {
            Self::migrate_v1(&mut conn).await?;
        }

        Ok(())
    }

    /// Migration v1: objects table and title index
    async fn migrate_v1(conn: &mut SqliteConnection) -> Result<()> {
        tracing::info!("Applying database migration v1");

        sqlx::query("BEGIN")
            .execute(&mut *conn)
            .await
            .map_err(|e| migration_failed(format!("begin migration v1: {e}")))?;

        let result = async {
            sqlx::query(
                r#"
                CREATE TABLE objects (
                    object_id INTEGER PRIMARY KEY,
                    title TEXT,
                    payload TEXT NOT NULL,
                    retrieved_at INTEGER NOT NULL
                )
                "#,
            )
            .execute(&mut *conn)
            .await
            .map_err(|e| migration_failed(format!("create objects table: {e}")))?;

            sqlx::query("CREATE INDEX idx_objects_title ON objects(title)")
                .execute(&mut *conn)
                .await
                .map_err(|e| migration_failed(format!("create title index: {e}")))?;

            Self::record_migration(conn, 1).await
        }
        .await;

        match result {
            Ok(()) => {
                sqlx::query("COMMIT")
                    .execute(&mut *conn)
                    .await
                    .map_err(|e| migration_failed(format!("commit migration v1: {e}")))?;
            }
            Err(e) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                return Err(e);
            }
        }

        tracing::info!("Database migration v1 complete");
        Ok(())
    }

    async fn record_migration(conn: &mut SqliteConnection, version: i64) -> Result<()> {
        sqlx::query("INSERT INTO schema_version (version, applied_at) VALUES (?, ?)")
            .bind(version)
            .bind(chrono::Utc::now().timestamp())
            .execute(&mut *conn)
            .await
            .map_err(|e| migration_failed(format!("record migration {version}: {e}")))?;

        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool
    pub async fn close(self) {
        self.pool.close().await;
    }
}
