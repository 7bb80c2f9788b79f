//! Error types for met-importer
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (Config, Transform, RateLimited, etc.)
//! - Database error variants for connection, migration, and query failures
//! - Automatic conversions from reqwest and serde_json errors

use thiserror::Error;

/// Result type alias for met-importer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for met-importer
///
/// This is the primary error type used throughout the library. Each variant includes
/// contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "api.base_url")
        key: Option<String>,
    },

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// Network error from the HTTP client
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Remote API responded with HTTP 429 and retries are exhausted
    #[error("rate limited by remote API")]
    RateLimited,

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Record transformation error (unexpected payload shape)
    #[error("transform error: {0}")]
    Transform(String),

    /// Import was cancelled before completing
    #[error("import cancelled")]
    Cancelled,
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),
}
