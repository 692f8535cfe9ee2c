/*!
 * Mock speech engine for testing.
 *
 * This module provides a scriptable engine that simulates different stream
 * behaviors:
 * - `MockEngine::working()` - Full stream: audio, word and sentence events
 * - `MockEngine::failing()` - Refuses to open a stream
 * - `MockEngine::mid_stream_error(n)` - Errors after n events
 * - `MockEngine::empty_audio()` - Boundary events but no audio payloads
 * - `MockEngine::no_boundaries()` - Audio payloads but no timing events
 * - `MockEngine::intermittent(n)` - Every nth stream fails to open
 */

use async_trait::async_trait;
use bytes::Bytes;
use rand::Rng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::engine::{EventStream, SpeechEngine, TimedEvent, VoiceParams};
use crate::errors::EngineError;

/// Synthetic speaking time per character, in 100 ns ticks (50 ms)
const TICKS_PER_CHAR: u64 = 500_000;

/// Behavior mode for the mock engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Emits audio, word and sentence events for every sentence
    Working,
    /// Always fails to open the stream
    Failing,
    /// Opens the stream, then errors after the given number of events
    MidStreamError {
        /// Events emitted before the failure
        after_events: usize,
    },
    /// Emits boundary events only, never any audio payload
    EmptyAudio,
    /// Emits audio payloads only, never any boundary event
    NoBoundaries,
    /// Fails to open every nth stream
    Intermittent {
        /// Every nth request fails
        fail_every: usize,
    },
}

/// Mock engine for exercising the synthesis pipeline without a service
#[derive(Debug)]
pub struct MockEngine {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
    /// Upper bound of a random per-event delay, to shuffle completion order
    jitter_ms: u64,
}

impl MockEngine {
    /// Create a new mock engine with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            jitter_ms: 0,
        }
    }

    /// Create a working mock engine that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a failing mock engine that refuses every stream
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock whose streams error after `after_events` events
    pub fn mid_stream_error(after_events: usize) -> Self {
        Self::new(MockBehavior::MidStreamError { after_events })
    }

    /// Create a mock that emits timing events but no audio
    pub fn empty_audio() -> Self {
        Self::new(MockBehavior::EmptyAudio)
    }

    /// Create a mock that emits audio but no timing events
    pub fn no_boundaries() -> Self {
        Self::new(MockBehavior::NoBoundaries)
    }

    /// Create an intermittently failing mock engine. An interval of zero is
    /// treated as one, so every stream fails.
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent {
            fail_every: fail_every.max(1),
        })
    }

    /// Add a random per-event delay of up to `ms` milliseconds, so that
    /// concurrent chunks complete in shuffled order
    pub fn with_jitter(mut self, ms: u64) -> Self {
        self.jitter_ms = ms;
        self
    }

    /// Split text into sentence-sized pieces, terminator included
    fn sentences(text: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut current = String::new();
        for ch in text.chars() {
            current.push(ch);
            if matches!(ch, '.' | '!' | '?') {
                out.push(std::mem::take(&mut current));
            }
        }
        if !current.trim().is_empty() {
            out.push(current);
        }
        out
    }

    /// Build the full event sequence a working stream would emit
    fn script_events(text: &str, behavior: MockBehavior) -> Vec<TimedEvent> {
        let mut events = Vec::new();
        let mut offset_ticks = 0u64;

        for sentence in Self::sentences(text) {
            let duration_ticks = sentence.chars().count() as u64 * TICKS_PER_CHAR;

            if behavior != MockBehavior::EmptyAudio {
                events.push(TimedEvent::Audio {
                    data: Bytes::from(sentence.clone().into_bytes()),
                });
            }

            if behavior != MockBehavior::NoBoundaries {
                if let Some(first_word) = sentence.split_whitespace().next() {
                    events.push(TimedEvent::WordBoundary {
                        offset_ticks,
                        duration_ticks: first_word.chars().count() as u64 * TICKS_PER_CHAR,
                        text: first_word.to_string(),
                    });
                }
                events.push(TimedEvent::SentenceBoundary {
                    offset_ticks,
                    duration_ticks,
                    text: sentence.trim().to_string(),
                });
            }

            offset_ticks += duration_ticks;
        }

        events
    }
}

impl Clone for MockEngine {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            request_count: Arc::clone(&self.request_count),
            jitter_ms: self.jitter_ms,
        }
    }
}

#[async_trait]
impl SpeechEngine for MockEngine {
    async fn stream(&self, text: &str, _params: &VoiceParams) -> Result<EventStream, EngineError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            MockBehavior::Failing => {
                return Err(EngineError::ApiError {
                    status_code: 500,
                    message: "Simulated engine failure".to_string(),
                });
            }
            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    return Err(EngineError::ApiError {
                        status_code: 503,
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                    });
                }
            }
            _ => {}
        }

        let events = Self::script_events(text, self.behavior);
        let cutoff = match self.behavior {
            MockBehavior::MidStreamError { after_events } => Some(after_events),
            _ => None,
        };
        let jitter_ms = self.jitter_ms;

        let stream = async_stream::try_stream! {
            for (i, event) in events.into_iter().enumerate() {
                if let Some(cutoff) = cutoff {
                    if i >= cutoff {
                        Err(EngineError::StreamInterrupted(
                            "Simulated mid-stream failure".to_string(),
                        ))?;
                    }
                }
                if jitter_ms > 0 {
                    let delay = rand::rng().random_range(0..=jitter_ms);
                    tokio::time::sleep(tokio::time::Duration::from_millis(delay)).await;
                }
                yield event;
            }
        };

        Ok(Box::pin(stream))
    }

    async fn test_connection(&self) -> Result<(), EngineError> {
        match self.behavior {
            MockBehavior::Failing => Err(EngineError::ConnectionError(
                "Simulated engine failure".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
