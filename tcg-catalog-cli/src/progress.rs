//! Terminal progress display for a pipeline run.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tcg_catalog_import::{PipelineProgress, Stage};

/// Spinner while a stage runs, switching to a bar once item counts arrive.
pub(crate) struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    /// When `quiet` is true, nothing is drawn.
    pub(crate) fn new(quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new_spinner();
            bar.set_style(spinner_style());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        };
        Self { bar }
    }

    /// Remove the display without a final message.
    pub(crate) fn clear(&self) {
        self.bar.finish_and_clear();
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("  {spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("/-\\|")
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("  [{bar:30.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

impl PipelineProgress for BarProgress {
    fn on_stage(&self, stage: Stage, message: &str) {
        log::debug!("[{}] {}", stage, message);
        self.bar.set_style(spinner_style());
        self.bar.set_message(format!("{}...", message));
    }

    fn on_item(&self, current: usize, total: usize, name: &str) {
        let total = total as u64;
        if self.bar.length() != Some(total) {
            self.bar.set_length(total);
            self.bar.set_style(bar_style());
        }
        self.bar.set_position(current as u64);
        self.bar.set_message(name.to_string());
    }

    fn on_complete(&self, message: &str) {
        self.bar.finish_and_clear();
        log::debug!("{}", message);
    }
}
