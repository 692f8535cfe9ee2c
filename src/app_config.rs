use anyhow::{anyhow, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;

use crate::engine::VoiceParams;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Speech engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Synthesis settings
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// Text chunking settings
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Speech engine connection settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EngineConfig {
    // @field: Service URL
    #[serde(default = "default_engine_endpoint")]
    pub endpoint: String,

    // @field: Timeout seconds per chunk request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            endpoint: default_engine_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Voice and concurrency settings for synthesis
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SynthesisConfig {
    /// Voice name (e.g., "en-US-JennyNeural")
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Speaking rate adjustment (e.g., "+10%", "-5%")
    #[serde(default = "default_rate")]
    pub rate: String,

    /// Pitch adjustment (e.g., "+2Hz")
    #[serde(default = "default_pitch")]
    pub pitch: String,

    /// Volume adjustment (e.g., "+0%")
    #[serde(default = "default_volume")]
    pub volume: String,

    /// Maximum number of chunks synthesized at once
    #[serde(default = "default_concurrent_chunks")]
    pub concurrent_chunks: usize,

    /// Generate per-chunk SRT subtitle files
    #[serde(default = "default_true")]
    pub generate_subtitles: bool,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            voice: default_voice(),
            rate: default_rate(),
            pitch: default_pitch(),
            volume: default_volume(),
            concurrent_chunks: default_concurrent_chunks(),
            generate_subtitles: true,
        }
    }
}

impl SynthesisConfig {
    /// Voice parameters for engine requests
    pub fn voice_params(&self) -> VoiceParams {
        VoiceParams {
            voice: self.voice.clone(),
            rate: self.rate.clone(),
            pitch: self.pitch.clone(),
            volume: self.volume.clone(),
        }
    }
}

/// Text chunking settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChunkingConfig {
    /// Preferred minimum chunk size in characters
    #[serde(default = "default_min_chunk_chars")]
    pub min_chars: usize,

    /// Hard maximum chunk size in characters
    #[serde(default = "default_max_chunk_chars")]
    pub max_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            min_chars: default_min_chunk_chars(),
            max_chars: default_max_chunk_chars(),
        }
    }
}

/// Output artifact settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    /// Merge chunk audio files into one with ffmpeg when available
    #[serde(default = "default_true")]
    pub merge_audio: bool,

    /// Remove per-chunk audio files after a successful merge
    #[serde(default)]
    pub delete_chunks_after_merge: bool,

    /// ffmpeg timeout in seconds
    #[serde(default = "default_merge_timeout_secs")]
    pub merge_timeout_secs: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            merge_audio: true,
            delete_chunks_after_merge: false,
            merge_timeout_secs: default_merge_timeout_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

/// Known voices and their human-readable descriptions
pub const KNOWN_VOICES: &[(&str, &str)] = &[
    ("en-US-JennyNeural", "English (US) - Female"),
    ("en-US-GuyNeural", "English (US) - Male"),
    ("en-GB-SoniaNeural", "English (UK) - Female"),
    ("en-GB-RyanNeural", "English (UK) - Male"),
    ("en-AU-NatashaNeural", "English (Australian) - Female"),
    ("en-AU-WilliamNeural", "English (Australian) - Male"),
    ("vi-VN-HoaiMyNeural", "Vietnamese - Female"),
    ("vi-VN-NamMinhNeural", "Vietnamese - Male"),
];

/// Chunk size bounds accepted by validation, in characters
pub const CHUNK_CHARS_RANGE: std::ops::RangeInclusive<usize> = 500..=5000;

fn default_engine_endpoint() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_voice() -> String {
    "en-US-JennyNeural".to_string()
}

fn default_rate() -> String {
    "+0%".to_string()
}

fn default_pitch() -> String {
    "+0Hz".to_string()
}

fn default_volume() -> String {
    "+0%".to_string()
}

fn default_concurrent_chunks() -> usize {
    3
}

fn default_min_chunk_chars() -> usize {
    1500
}

fn default_max_chunk_chars() -> usize {
    2000
}

fn default_merge_timeout_secs() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.engine.endpoint.is_empty() {
            return Err(anyhow!("Engine endpoint must not be empty"));
        }

        if self.synthesis.voice.is_empty() {
            return Err(anyhow!("Voice name must not be empty"));
        }
        if !KNOWN_VOICES.iter().any(|(v, _)| *v == self.synthesis.voice) {
            // Unknown voices are passed through; the engine has the final say
            warn!("Voice '{}' is not in the known voice list", self.synthesis.voice);
        }

        if !CHUNK_CHARS_RANGE.contains(&self.chunking.min_chars) {
            return Err(anyhow!(
                "min_chars {} is out of the accepted range {}..={}",
                self.chunking.min_chars,
                CHUNK_CHARS_RANGE.start(),
                CHUNK_CHARS_RANGE.end()
            ));
        }
        if !CHUNK_CHARS_RANGE.contains(&self.chunking.max_chars) {
            return Err(anyhow!(
                "max_chars {} is out of the accepted range {}..={}",
                self.chunking.max_chars,
                CHUNK_CHARS_RANGE.start(),
                CHUNK_CHARS_RANGE.end()
            ));
        }
        if self.chunking.min_chars > self.chunking.max_chars {
            return Err(anyhow!(
                "min_chars {} exceeds max_chars {}",
                self.chunking.min_chars,
                self.chunking.max_chars
            ));
        }

        if self.synthesis.concurrent_chunks == 0 {
            return Err(anyhow!("concurrent_chunks must be at least 1"));
        }
        if self.synthesis.concurrent_chunks > 5 {
            warn!(
                "concurrent_chunks {} is high; remote engines may throttle",
                self.synthesis.concurrent_chunks
            );
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            engine: EngineConfig::default(),
            synthesis: SynthesisConfig::default(),
            chunking: ChunkingConfig::default(),
            output: OutputConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
