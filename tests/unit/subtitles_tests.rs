/*!
 * Tests for subtitle cue accumulation and SRT formatting
 */

use std::fmt::Write;

use talespeak::engine::TimedEvent;
use talespeak::subtitles::{SubtitleAccumulator, SubtitleCue, TICKS_PER_MS};

fn sentence(offset_ticks: u64, duration_ticks: u64, text: &str) -> TimedEvent {
    TimedEvent::SentenceBoundary {
        offset_ticks,
        duration_ticks,
        text: text.to_string(),
    }
}

/// Test tick-to-millisecond conversion on the documented scale
#[test]
fn test_feed_withTickOffsets_shouldDivideByTenThousand() {
    let mut acc = SubtitleAccumulator::new();
    acc.feed(&sentence(25_000_000, 10_000_000, "Hello."));

    let cue = &acc.cues()[0];
    assert_eq!(cue.start_time_ms, 2_500);
    assert_eq!(cue.end_time_ms, 3_500);
    assert_eq!(TICKS_PER_MS, 10_000);
}

/// Test that cue end time is start plus duration
#[test]
fn test_feed_withDuration_shouldDeriveEndTime() {
    let mut acc = SubtitleAccumulator::new();
    acc.feed(&sentence(0, 42_000_000, "First."));
    acc.feed(&sentence(42_000_000, 30_000_000, "Second."));

    assert_eq!(acc.cues()[0].end_time_ms, 4_200);
    assert_eq!(acc.cues()[1].start_time_ms, 4_200);
    assert_eq!(acc.cues()[1].end_time_ms, 7_200);
}

/// Test the full SRT block layout
#[test]
fn test_toSrt_withTwoCues_shouldFormatBlocks() {
    let mut acc = SubtitleAccumulator::new();
    acc.feed(&sentence(0, 25_000_000, "Hello there."));
    acc.feed(&sentence(25_000_000, 15_000_000, "General greeting."));

    let srt = acc.to_srt();
    let expected = "1\n00:00:00,000 --> 00:00:02,500\nHello there.\n\n\
                    2\n00:00:02,500 --> 00:00:04,000\nGeneral greeting.\n\n";
    assert_eq!(srt, expected);
}

/// Test that an accumulator with no cues serializes to an empty string
#[test]
fn test_toSrt_withNoCues_shouldReturnEmptyString() {
    let acc = SubtitleAccumulator::new();
    assert_eq!(acc.to_srt(), "");
    assert_eq!(acc.cue_count(), 0);
}

/// Test that whitespace-only sentences are dropped without consuming an index
#[test]
fn test_feed_withBlankSentences_shouldKeepNumberingGapless() {
    let mut acc = SubtitleAccumulator::new();
    acc.feed(&sentence(0, 1_000_000, "  "));
    acc.feed(&sentence(1_000_000, 1_000_000, "Kept one."));
    acc.feed(&sentence(2_000_000, 1_000_000, "\t\n"));
    acc.feed(&sentence(3_000_000, 1_000_000, "Kept two."));

    assert_eq!(acc.cue_count(), 2);
    assert_eq!(acc.cues()[0].index, 1);
    assert_eq!(acc.cues()[1].index, 2);
}

/// Test that cue text is trimmed on the way in
#[test]
fn test_feed_withPaddedText_shouldTrim() {
    let mut acc = SubtitleAccumulator::new();
    acc.feed(&sentence(0, 1_000_000, "  padded sentence.  "));
    assert_eq!(acc.cues()[0].text, "padded sentence.");
}

/// Test validated cue construction rejects bad input
#[test]
fn test_newValidated_withBadInput_shouldFail() {
    assert!(SubtitleCue::new_validated(1, 2_000, 1_000, "backwards".to_string()).is_err());
    assert!(SubtitleCue::new_validated(1, 0, 1_000, "   ".to_string()).is_err());
    assert!(SubtitleCue::new_validated(1, 1_000, 1_000, "zero length is fine".to_string()).is_ok());
}

/// Test Display output of a single cue
#[test]
fn test_display_withValidCue_shouldWriteSrtBlock() {
    let cue = SubtitleCue::new_validated(3, 61_234, 65_432, "Hello\nWorld".to_string()).unwrap();
    let mut output = String::new();
    write!(output, "{}", cue).unwrap();

    assert_eq!(output, "3\n00:01:01,234 --> 00:01:05,432\nHello\nWorld\n\n");
}
