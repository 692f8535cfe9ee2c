use log::Level;
use std::fmt::Debug;

// @module: Progress observer interface for the batch runner

/// Observer for batch progress and log events.
///
/// The batch runner reports through this interface instead of logging
/// directly, so callers can drive a progress bar, capture logs for a job
/// record, or stay silent in tests.
pub trait ProgressReporter: Send + Sync + Debug {
    /// Called as chunks complete; `fraction` is in `0.0..=1.0`
    fn on_progress(&self, fraction: f32, message: &str);

    /// Called for noteworthy events during the batch
    fn on_log(&self, level: Level, message: &str);
}

/// Reporter that discards everything
#[derive(Debug, Default)]
pub struct NullReporter;

impl ProgressReporter for NullReporter {
    fn on_progress(&self, _fraction: f32, _message: &str) {}

    fn on_log(&self, _level: Level, _message: &str) {}
}

/// Reporter that forwards to the global logger
#[derive(Debug, Default)]
pub struct LogReporter;

impl ProgressReporter for LogReporter {
    fn on_progress(&self, fraction: f32, message: &str) {
        log::debug!("[{:>5.1}%] {}", fraction * 100.0, message);
    }

    fn on_log(&self, level: Level, message: &str) {
        log::log!(level, "{}", message);
    }
}
