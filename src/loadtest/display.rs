//! Batch progress reporting.
//!
//! The engine reports each finished batch through the [`ProgressSink`] trait.
//! [`TerminalProgress`] renders a progress bar on an interactive stdout and
//! falls back to one plain line per batch when stdout is piped.

use std::io::IsTerminal;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::loadtest::engine::BatchProgress;

/// Receives progress after every batch of the dispatch loop.
pub trait ProgressSink {
    /// Called once per batch, after every request of the batch resolved.
    fn batch_completed(&mut self, progress: &BatchProgress);

    /// Called once when the dispatch loop is done.
    fn finish(&mut self) {}
}

/// Formats the per-batch progress line.
pub fn format_progress(progress: &BatchProgress) -> String {
    format!(
        "Completed {} requests per server",
        progress.completed_per_server
    )
}

/// Progress output on stdout.
pub struct TerminalProgress {
    bar: Option<ProgressBar>,
}

impl TerminalProgress {
    /// Creates the progress output for `total_per_server` requests.
    ///
    /// A bar is drawn only when stdout is a terminal.
    pub fn new(total_per_server: u32) -> Self {
        let bar = std::io::stdout().is_terminal().then(|| {
            let bar = ProgressBar::with_draw_target(
                Some(u64::from(total_per_server)),
                ProgressDrawTarget::stdout(),
            );
            if let Ok(style) = ProgressStyle::with_template(
                "{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}",
            ) {
                bar.set_style(style.progress_chars("=> "));
            }
            bar
        });
        Self { bar }
    }

    /// Progress output that prints plain lines regardless of the terminal.
    pub fn plain() -> Self {
        Self { bar: None }
    }
}

impl ProgressSink for TerminalProgress {
    fn batch_completed(&mut self, progress: &BatchProgress) {
        let line = format_progress(progress);
        match &self.bar {
            Some(bar) => {
                bar.set_position(u64::from(progress.completed_per_server));
                bar.println(&line);
                bar.set_message(format!(
                    "batch {}/{}",
                    progress.batch_index + 1,
                    progress.batch_count
                ));
            },
            None => println!("{line}"),
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
