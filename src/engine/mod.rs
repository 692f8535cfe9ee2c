/*!
 * Speech engine boundary.
 *
 * The pipeline treats text-to-speech as an opaque streaming capability: given
 * a chunk of text and voice parameters, an engine yields a finite, single-pass
 * sequence of typed timed events (audio payloads interleaved with sentence and
 * word timing metadata). Implementations:
 * - `remote`: HTTP client for a streaming synthesis service
 * - `mock`: scriptable engine for tests and dry runs
 */

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use std::fmt::Debug;

use crate::errors::EngineError;

/// One event from a synthesis stream.
///
/// Within one chunk's stream events arrive in order; offsets and durations are
/// in 100-nanosecond ticks (10,000 ticks = 1 ms).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimedEvent {
    /// A slice of encoded audio, to be appended in arrival order
    Audio {
        /// Raw audio payload bytes
        data: Bytes,
    },

    /// Timing for one spoken sentence
    SentenceBoundary {
        /// Offset from stream start, in ticks
        offset_ticks: u64,
        /// Spoken duration, in ticks
        duration_ticks: u64,
        /// The sentence text
        text: String,
    },

    /// Timing for one spoken word. Decoded but unused by the pipeline;
    /// sentence-level cues are the sole subtitle source.
    WordBoundary {
        /// Offset from stream start, in ticks
        offset_ticks: u64,
        /// Spoken duration, in ticks
        duration_ticks: u64,
        /// The word text
        text: String,
    },
}

/// Voice identity and prosody settings for a synthesis request.
///
/// Rate, pitch and volume are opaque string-encoded adjustments passed through
/// to the engine verbatim (e.g. `+0%`, `-5Hz`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceParams {
    /// Engine voice identifier (e.g. `en-US-JennyNeural`)
    pub voice: String,
    /// Speech rate adjustment
    pub rate: String,
    /// Speech pitch adjustment
    pub pitch: String,
    /// Speech volume adjustment
    pub volume: String,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            voice: "en-US-JennyNeural".to_string(),
            rate: "+0%".to_string(),
            pitch: "+0Hz".to_string(),
            volume: "+0%".to_string(),
        }
    }
}

/// A lazy, finite, non-restartable sequence of timed events
pub type EventStream = BoxStream<'static, Result<TimedEvent, EngineError>>;

/// Common trait for speech synthesis engines
///
/// This trait defines the interface that all engine implementations must
/// follow, allowing them to be used interchangeably by the synthesis pipeline.
#[async_trait]
pub trait SpeechEngine: Send + Sync + Debug {
    /// Open a synthesis stream for one chunk of text
    ///
    /// # Arguments
    /// * `text` - The text to synthesize
    /// * `params` - Voice identity and prosody settings
    ///
    /// # Returns
    /// * `Result<EventStream, EngineError>` - The event stream, or an error if
    ///   the session could not be opened
    async fn stream(&self, text: &str, params: &VoiceParams) -> Result<EventStream, EngineError>;

    /// Test the connection to the engine
    ///
    /// # Returns
    /// * `Result<(), EngineError>` - Ok if the engine is reachable
    async fn test_connection(&self) -> Result<(), EngineError>;
}

pub mod mock;
pub mod remote;
