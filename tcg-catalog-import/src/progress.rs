//! Pipeline progress reporting.

use crate::pipeline::Stage;

/// Trait for receiving pipeline progress updates.
pub trait PipelineProgress {
    /// Called when a stage starts.
    fn on_stage(&self, stage: Stage, message: &str);

    /// Called after each item of the current stage is processed.
    fn on_item(&self, current: usize, total: usize, name: &str);

    /// Called when the run is complete.
    fn on_complete(&self, message: &str);
}

/// A no-op progress reporter that discards all updates.
pub struct SilentProgress;

impl PipelineProgress for SilentProgress {
    fn on_stage(&self, _stage: Stage, _message: &str) {}
    fn on_item(&self, _current: usize, _total: usize, _name: &str) {}
    fn on_complete(&self, _message: &str) {}
}

/// A progress reporter that logs to the `log` crate.
pub struct LogProgress;

impl PipelineProgress for LogProgress {
    fn on_stage(&self, stage: Stage, message: &str) {
        log::info!("[{}] {}", stage, message);
    }

    fn on_item(&self, current: usize, total: usize, name: &str) {
        if current.is_multiple_of(500) || current == total {
            log::info!("  [{}/{}] {}", current, total, name);
        }
    }

    fn on_complete(&self, message: &str) {
        log::info!("{}", message);
    }
}
