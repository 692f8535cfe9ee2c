/*!
 * Error types for the talespeak application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when talking to the speech synthesis engine
#[derive(Error, Debug)]
pub enum EngineError {
    /// Error when making the synthesis request fails
    #[error("Synthesis request failed: {0}")]
    RequestFailed(String),

    /// Error when the event stream carries data we cannot decode
    #[error("Malformed event stream: {0}")]
    Protocol(String),

    /// Error returned by the service itself
    #[error("Engine responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the service
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The stream ended abnormally partway through
    #[error("Event stream interrupted: {0}")]
    StreamInterrupted(String),
}

/// Errors that can occur while synthesizing a single text chunk
#[derive(Error, Debug)]
pub enum SynthesisError {
    /// The stream finished but no audio was written
    #[error("Chunk {chunk_index}: engine produced no audio output")]
    EmptyOutput {
        /// 1-based index of the failing chunk
        chunk_index: usize,
    },

    /// The engine call itself failed
    #[error("Chunk {chunk_index}: {source}")]
    Engine {
        /// 1-based index of the failing chunk
        chunk_index: usize,
        /// Underlying engine error
        #[source]
        source: EngineError,
    },

    /// Writing or validating the chunk artifacts failed
    #[error("Chunk {chunk_index}: I/O error: {source}")]
    Io {
        /// 1-based index of the failing chunk
        chunk_index: usize,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl SynthesisError {
    /// The 1-based index of the chunk this error belongs to
    pub fn chunk_index(&self) -> usize {
        match self {
            Self::EmptyOutput { chunk_index }
            | Self::Engine { chunk_index, .. }
            | Self::Io { chunk_index, .. } => *chunk_index,
        }
    }
}

/// Errors that abort a whole conversion
#[derive(Error, Debug)]
pub enum ConversionError {
    /// The input text was empty or whitespace-only
    #[error("Input text is empty: {0}")]
    EmptyInput(PathBuf),

    /// Chunk size bounds are inconsistent
    #[error("Invalid chunk bounds: min {min} / max {max}")]
    InvalidChunkBounds {
        /// Configured minimum chunk size in characters
        min: usize,
        /// Configured maximum chunk size in characters
        max: usize,
    },

    /// Segmentation failed to advance (guarded against, should not occur)
    #[error("Segmentation stalled at position {position}")]
    SegmentationDegenerate {
        /// Character position where the cursor stopped advancing
        position: usize,
    },

    /// Every chunk in the batch failed
    #[error("No chunks were successfully synthesized ({} failures)", failures.len())]
    NoChunksSucceeded {
        /// Chunk index and error message for every failed chunk
        failures: Vec<(usize, String)>,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the synthesis engine
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Error from chunk synthesis
    #[error("Synthesis error: {0}")]
    Synthesis(#[from] SynthesisError),

    /// Error aborting a conversion
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
