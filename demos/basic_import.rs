//! Basic import example
//!
//! This example demonstrates the core functionality of met-importer:
//! - Creating an importer with default configuration
//! - Running a full import with graceful Ctrl+C handling
//! - Reading the outcome report

use met_importer::{Config, Importer, run_with_shutdown};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging (optional)
    // Uncomment if you add tracing-subscriber to your dependencies:
    // tracing_subscriber::fmt::init();

    // Default configuration targets the public Met collection API and
    // writes to ./metmuseum.db
    let config = Config::default();

    let importer = Importer::new(config)?;

    // Run with automatic signal handling; Ctrl+C cancels the run after
    // flushing whatever is already buffered
    let report = run_with_shutdown(importer).await?;

    println!("✓ Import complete");
    println!("  Total listed: {}", report.total);
    println!("  Succeeded:    {}", report.succeeded);
    println!("  Skipped:      {}", report.skipped);
    println!("  Failed:       {}", report.failed);

    Ok(())
}
