//! Configuration types for met-importer

use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Top-level configuration for an import run
///
/// All settings have sensible defaults targeting the Met Museum public
/// collection API, so `Config::default()` is enough for a full import.
/// Sub-configs deserialize independently; omitted sections fall back to
/// their defaults.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote collection API settings (endpoint, identity, timeout)
    #[serde(default)]
    pub api: ApiConfig,

    /// Retry behavior for transient fetch failures
    #[serde(default)]
    pub retry: RetryConfig,

    /// Concurrency, batching, and throttling for the import pipeline
    #[serde(default)]
    pub import: ImportConfig,

    /// Data storage settings
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

/// Remote collection API configuration
///
/// Groups settings for how the importer talks to the collection API.
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the collection API (default: the Met Museum public endpoint)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout (default: 60 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// Retry configuration for transient failures
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retries after the initial attempt (default: 3)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry (default: 2 seconds)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(2),
            backoff_multiplier: 2.0,
        }
    }
}

/// Import pipeline configuration (concurrency, batching, throttling)
///
/// Groups settings that shape how aggressively the importer fetches and
/// how often it writes to the database.
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Maximum concurrent object fetches (default: 5)
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,

    /// Number of buffered records that triggers a database flush (default: 50)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Top-level payload fields removed before storage
    ///
    /// The collection API returns several large array fields (alternate
    /// image URLs, constituent records, raw measurements) that bloat each
    /// payload without being useful to most consumers.
    #[serde(default = "default_strip_fields")]
    pub strip_fields: Vec<String>,

    /// Minimum per-task pause between fetches in milliseconds (default: 100)
    #[serde(default = "default_throttle_min_ms")]
    pub throttle_min_ms: u64,

    /// Maximum per-task pause between fetches in milliseconds, exclusive (default: 500)
    #[serde(default = "default_throttle_max_ms")]
    pub throttle_max_ms: u64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            parallelism: default_parallelism(),
            batch_size: default_batch_size(),
            strip_fields: default_strip_fields(),
            throttle_min_ms: default_throttle_min_ms(),
            throttle_max_ms: default_throttle_max_ms(),
        }
    }
}

/// Data storage configuration
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Database path (default: "./metmuseum.db")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

// Default value functions for serde

fn default_base_url() -> String {
    "https://collectionapi.metmuseum.org/public/collection/v1/".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; MetMuseumClient/1.0)".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(2)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_parallelism() -> usize {
    5
}

fn default_batch_size() -> usize {
    50
}

fn default_strip_fields() -> Vec<String> {
    vec![
        "additionalImages".to_string(),
        "constituents".to_string(),
        "measurements".to_string(),
    ]
}

fn default_throttle_min_ms() -> u64 {
    100
}

fn default_throttle_max_ms() -> u64 {
    500
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./metmuseum.db")
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
