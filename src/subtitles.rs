use std::fmt;

use anyhow::{anyhow, Result};
use log::debug;

use crate::engine::TimedEvent;

// @module: Subtitle cue accumulation and SRT serialization

/// Ticks per millisecond in engine timing events (1 tick = 100 ns)
pub const TICKS_PER_MS: u64 = 10_000;

// @struct: Single subtitle cue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleCue {
    // @field: Sequence number, 1-based and gapless per output
    pub index: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Trimmed cue text
    pub text: String,
}

impl SubtitleCue {
    // @creates: Validated subtitle cue
    // @validates: Time range and non-empty text
    pub fn new_validated(index: usize, start_time_ms: u64, end_time_ms: u64, text: String) -> Result<Self> {
        if end_time_ms < start_time_ms {
            return Err(anyhow!(
                "Invalid time range: end time {} < start time {}",
                end_time_ms,
                start_time_ms
            ));
        }

        let trimmed_text = text.trim();
        if trimmed_text.is_empty() {
            return Err(anyhow!("Empty cue text for entry {}", index));
        }

        Ok(SubtitleCue {
            index,
            start_time_ms,
            end_time_ms,
            text: trimmed_text.to_string(),
        })
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_time_ms)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_time_ms)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

impl fmt::Display for SubtitleCue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Builds ordered subtitle cues from sentence-level timing events.
///
/// One accumulator serves one chunk's event stream; cue numbering starts at 1
/// per accumulator. Only `SentenceBoundary` events produce cues; audio and
/// word-level events are ignored here.
#[derive(Debug, Default)]
pub struct SubtitleAccumulator {
    cues: Vec<SubtitleCue>,
}

impl SubtitleAccumulator {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one timing event. Sentence boundaries with non-empty trimmed text
    /// become cues; everything else is discarded without consuming an index.
    pub fn feed(&mut self, event: &TimedEvent) {
        let TimedEvent::SentenceBoundary {
            offset_ticks,
            duration_ticks,
            text,
        } = event
        else {
            return;
        };

        let trimmed = text.trim();
        if trimmed.is_empty() {
            debug!("Dropping sentence boundary with empty text at {} ticks", offset_ticks);
            return;
        }

        let start_ms = offset_ticks / TICKS_PER_MS;
        let duration_ms = duration_ticks / TICKS_PER_MS;
        let end_ms = start_ms + duration_ms;

        self.cues.push(SubtitleCue {
            index: self.cues.len() + 1,
            start_time_ms: start_ms,
            end_time_ms: end_ms,
            text: trimmed.to_string(),
        });
    }

    /// Number of cues accepted so far
    pub fn cue_count(&self) -> usize {
        self.cues.len()
    }

    /// The accepted cues, in creation order
    pub fn cues(&self) -> &[SubtitleCue] {
        &self.cues
    }

    /// Serialize all cues to SRT. Returns an empty string when no cue was
    /// accepted.
    pub fn to_srt(&self) -> String {
        let mut output = String::new();
        for cue in &self.cues {
            // Display writes index, time range, text, and the separator line
            output.push_str(&cue.to_string());
        }
        output
    }
}
