//! Console progress bar for interactive runs.

use std::io::{IsTerminal, Write};
use std::sync::atomic::{AtomicU64, Ordering};

const BAR_WIDTH: usize = 50;

/// Tracks how many objects have been processed and redraws a progress bar
/// on stdout after each one.
///
/// Rendering is skipped when stdout is not a terminal so piped or captured
/// output stays clean.
pub(crate) struct ProgressTracker {
    total: u64,
    processed: AtomicU64,
    interactive: bool,
}

impl ProgressTracker {
    pub(crate) fn new(total: u64) -> Self {
        Self {
            total,
            processed: AtomicU64::new(0),
            interactive: std::io::stdout().is_terminal(),
        }
    }

    /// Count one processed object and redraw the bar
    pub(crate) fn increment_and_render(&self) {
        let processed = self.processed.fetch_add(1, Ordering::SeqCst) + 1;
        if let Err(e) = self.render(processed) {
            tracing::debug!(error = %e, "Failed to draw progress bar");
        }
    }

    fn render(&self, processed: u64) -> std::io::Result<()> {
        if !self.interactive || self.total == 0 {
            return Ok(());
        }

        let filled = self.filled_width(processed);
        let mut stdout = std::io::stdout();
        write!(
            stdout,
            "\r[{}{}] {}/{}",
            "#".repeat(filled),
            "-".repeat(BAR_WIDTH - filled),
            processed,
            self.total
        )?;
        stdout.flush()
    }

    fn filled_width(&self, processed: u64) -> usize {
        let fraction = processed as f64 / self.total as f64;
        ((fraction * BAR_WIDTH as f64) as usize).min(BAR_WIDTH)
    }

    /// Move off the bar line once the run is over
    pub(crate) fn finish(&self) {
        if self.interactive && self.total > 0 {
            println!();
        }
    }

    /// Test-only accessor for the processed count
    #[cfg(test)]
    pub(crate) fn processed(&self) -> u64 {
        self.processed.load(Ordering::SeqCst)
    }
}
