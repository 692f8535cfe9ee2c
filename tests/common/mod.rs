/*!
 * Common test utilities for the talespeak test suite
 */

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use talespeak::engine::mock::MockEngine;
use talespeak::engine::{EventStream, SpeechEngine, VoiceParams};
use talespeak::errors::EngineError;
use talespeak::synthesis::ProgressReporter;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &PathBuf, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Reporter that records every progress and log callback
#[derive(Debug, Default)]
pub struct CapturingReporter {
    pub progress: Mutex<Vec<(f32, String)>>,
    pub logs: Mutex<Vec<String>>,
}

impl ProgressReporter for CapturingReporter {
    fn on_progress(&self, fraction: f32, message: &str) {
        self.progress.lock().push((fraction, message.to_string()));
    }

    fn on_log(&self, _level: log::Level, message: &str) {
        self.logs.lock().push(message.to_string());
    }
}

/// Engine wrapper that refuses any text containing a marker string and
/// otherwise behaves like a working mock engine. Lets tests fail a specific
/// chunk deterministically.
#[derive(Debug)]
pub struct MarkerFailEngine {
    marker: String,
    inner: MockEngine,
}

impl MarkerFailEngine {
    pub fn new(marker: &str) -> Self {
        Self {
            marker: marker.to_string(),
            inner: MockEngine::working(),
        }
    }
}

#[async_trait]
impl SpeechEngine for MarkerFailEngine {
    async fn stream(&self, text: &str, params: &VoiceParams) -> Result<EventStream, EngineError> {
        if text.contains(&self.marker) {
            return Err(EngineError::ApiError {
                status_code: 500,
                message: format!("Refusing text containing '{}'", self.marker),
            });
        }
        self.inner.stream(text, params).await
    }

    async fn test_connection(&self) -> Result<(), EngineError> {
        self.inner.test_connection().await
    }
}
