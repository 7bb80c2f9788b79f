//! Custom configuration example
//!
//! This example shows how to configure met-importer with various options:
//! - Alternate API endpoint and user agent
//! - Retry tuning
//! - Parallelism, batching, and throttling
//! - Stripped payload fields
//! - Database location

use met_importer::Importer;
use met_importer::config::{ApiConfig, Config, ImportConfig, PersistenceConfig, RetryConfig};
use std::path::PathBuf;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    // Retry configuration with exponential backoff
    let retry = RetryConfig {
        max_retries: 5,
        initial_delay: Duration::from_secs(1),
        backoff_multiplier: 2.0,
    };

    // Gentler fetch profile: fewer workers, bigger batches, longer pauses
    let import = ImportConfig {
        parallelism: 2,
        batch_size: 100,
        strip_fields: vec![
            "additionalImages".to_string(),
            "constituents".to_string(),
            "measurements".to_string(),
            "tags".to_string(),
        ],
        throttle_min_ms: 250,
        throttle_max_ms: 1000,
    };

    // Build complete configuration
    let config = Config {
        api: ApiConfig {
            base_url: "https://collectionapi.metmuseum.org/public/collection/v1/".to_string(),
            user_agent: "met-importer-example/0.1".to_string(),
            request_timeout: Duration::from_secs(30),
        },
        retry,
        import,
        persistence: PersistenceConfig {
            database_path: PathBuf::from("/data/metmuseum.db"),
        },
    };

    println!("Configuration:");
    println!("  Endpoint:    {}", config.api.base_url);
    println!("  Parallelism: {}", config.import.parallelism);
    println!("  Batch size:  {}", config.import.batch_size);
    println!("  Stripping:   {:?}", config.import.strip_fields);
    println!("  Database:    {:?}", config.persistence.database_path);

    let importer = Importer::new(config)?;
    println!("✓ Importer initialized with custom configuration");

    let report = importer.run().await?;
    println!(
        "✓ Imported {} of {} objects",
        report.succeeded, report.total
    );

    Ok(())
}
