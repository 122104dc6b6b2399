//! Spinner and summary reporting for terminal listings.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{FetchProgress, Session, format_size};

const SEPARATOR: &str = "────────────────────────────────────────────────────────────";

/// Spinner shown while listing pages are fetched.
pub struct SpinnerProgress {
    bar: ProgressBar,
}

impl SpinnerProgress {
    /// Creates and starts a spinner.
    pub fn new(bucket: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(format!("Loading {bucket}..."));
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Stops and clears the spinner.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl FetchProgress for SpinnerProgress {
    fn on_page(&self, page: usize, total_objects: usize) {
        self.bar
            .set_message(format!("Fetched page {page} ({total_objects} objects)"));
    }

    fn on_retry(&self, page: usize, attempt: u32, error: &str) {
        self.bar
            .println(format!("  page {page} failed ({error}), retry {attempt}"));
    }
}

/// Prints a summary of the loaded listing.
pub fn print_summary(session: &Session) {
    let total: u64 = session.files().iter().map(|f| f.size).sum();

    println!("{SEPARATOR}");
    println!(
        "  {} file(s), {} total, {} modified since {}",
        session.files().len(),
        format_size(total),
        session.recent().len(),
        session.window_start().format("%Y-%m-%d"),
    );
    println!("{SEPARATOR}");
}
