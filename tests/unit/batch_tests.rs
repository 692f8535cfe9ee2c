/*!
 * Tests for concurrent batch synthesis
 */

use std::sync::Arc;

use talespeak::engine::mock::MockEngine;
use talespeak::engine::VoiceParams;
use talespeak::errors::ConversionError;
use talespeak::synthesis::{BatchRunner, NullReporter};
use talespeak::text_segmenter::TextChunk;

use crate::common::{create_temp_dir, CapturingReporter, MarkerFailEngine};

fn chunks_from(texts: &[&str]) -> Vec<TextChunk> {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| TextChunk {
            index: i + 1,
            text: text.to_string(),
        })
        .collect()
}

/// Test the full happy path: every chunk produces audio and subtitles
#[tokio::test]
async fn test_run_withWorkingEngine_shouldSynthesizeAllChunks() {
    let temp_dir = create_temp_dir().unwrap();
    let chunks = chunks_from(&[
        "First chunk of narration. It has two sentences.",
        "Second chunk follows.",
        "Third and final chunk ends the story.",
    ]);

    let runner = BatchRunner::new(Arc::new(MockEngine::working().with_jitter(5)), 2);
    let reporter = NullReporter;
    let outcome = runner
        .run(
            &chunks,
            &VoiceParams::default(),
            temp_dir.path(),
            "story",
            true,
            &reporter,
        )
        .await
        .unwrap();

    assert_eq!(outcome.successes.len(), 3);
    assert!(outcome.failures.is_empty());

    for (i, result) in outcome.successes.iter().enumerate() {
        assert_eq!(result.index, i + 1);
        assert!(result.audio_path.exists());
        assert!(result.subtitle_path.as_ref().unwrap().exists());
        let audio = std::fs::read(&result.audio_path).unwrap();
        assert!(!audio.is_empty());
    }
}

/// Test that results come back ordered by chunk index even with shuffled completion
#[tokio::test]
async fn test_run_withJitter_shouldRestoreChunkOrder() {
    let temp_dir = create_temp_dir().unwrap();
    let texts: Vec<String> = (1..=8)
        .map(|i| format!("Chunk number {} speaks a sentence.", i))
        .collect();
    let chunks = chunks_from(&texts.iter().map(|s| s.as_str()).collect::<Vec<_>>());

    let runner = BatchRunner::new(Arc::new(MockEngine::working().with_jitter(20)), 4);
    let reporter = NullReporter;
    let outcome = runner
        .run(
            &chunks,
            &VoiceParams::default(),
            temp_dir.path(),
            "ordered",
            false,
            &reporter,
        )
        .await
        .unwrap();

    let indices: Vec<usize> = outcome.successes.iter().map(|r| r.index).collect();
    assert_eq!(indices, vec![1, 2, 3, 4, 5, 6, 7, 8]);
}

/// Test that one failing chunk is isolated while its siblings succeed
#[tokio::test]
async fn test_run_withOneFailingChunk_shouldIsolateFailure() {
    let temp_dir = create_temp_dir().unwrap();
    let chunks = chunks_from(&[
        "Chunk one is fine.",
        "Chunk two is fine.",
        "Chunk three FAILHERE breaks.",
        "Chunk four is fine.",
        "Chunk five is fine.",
    ]);

    let runner = BatchRunner::new(Arc::new(MarkerFailEngine::new("FAILHERE")), 2);
    let reporter = NullReporter;
    let outcome = runner
        .run(
            &chunks,
            &VoiceParams::default(),
            temp_dir.path(),
            "partial",
            true,
            &reporter,
        )
        .await
        .unwrap();

    let success_indices: Vec<usize> = outcome.successes.iter().map(|r| r.index).collect();
    assert_eq!(success_indices, vec![1, 2, 4, 5]);

    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].0, 3);

    // The failed chunk must not leave artifacts behind
    assert!(!temp_dir.path().join("partial_003.mp3").exists());
    assert!(!temp_dir.path().join("partial_003.srt").exists());
}

/// Test that an all-failed batch aborts with per-chunk diagnostics
#[tokio::test]
async fn test_run_withAllChunksFailing_shouldAbortWithDiagnostics() {
    let temp_dir = create_temp_dir().unwrap();
    let chunks = chunks_from(&["One.", "Two.", "Three."]);

    let runner = BatchRunner::new(Arc::new(MockEngine::failing()), 3);
    let reporter = NullReporter;
    let result = runner
        .run(
            &chunks,
            &VoiceParams::default(),
            temp_dir.path(),
            "doomed",
            false,
            &reporter,
        )
        .await;

    match result {
        Err(ConversionError::NoChunksSucceeded { failures }) => {
            let indices: Vec<usize> = failures.iter().map(|(i, _)| *i).collect();
            assert_eq!(indices, vec![1, 2, 3]);
            for (_, message) in &failures {
                assert!(!message.is_empty());
            }
        }
        other => panic!("Expected NoChunksSucceeded, got {:?}", other),
    }
}

/// Test that subtitle files are skipped when generation is disabled
#[tokio::test]
async fn test_run_withSubtitlesDisabled_shouldOnlyWriteAudio() {
    let temp_dir = create_temp_dir().unwrap();
    let chunks = chunks_from(&["A single chunk with a sentence."]);

    let runner = BatchRunner::new(Arc::new(MockEngine::working()), 1);
    let reporter = NullReporter;
    let outcome = runner
        .run(
            &chunks,
            &VoiceParams::default(),
            temp_dir.path(),
            "audioonly",
            false,
            &reporter,
        )
        .await
        .unwrap();

    assert!(outcome.successes[0].subtitle_path.is_none());
    assert!(!temp_dir.path().join("audioonly_001.srt").exists());
}

/// Test that a stream yielding no audio counts as a chunk failure
#[tokio::test]
async fn test_run_withEmptyAudioEngine_shouldFailChunks() {
    let temp_dir = create_temp_dir().unwrap();
    let chunks = chunks_from(&["Only boundaries come back."]);

    let runner = BatchRunner::new(Arc::new(MockEngine::empty_audio()), 1);
    let reporter = NullReporter;
    let result = runner
        .run(
            &chunks,
            &VoiceParams::default(),
            temp_dir.path(),
            "silent",
            true,
            &reporter,
        )
        .await;

    assert!(matches!(result, Err(ConversionError::NoChunksSucceeded { .. })));
    assert!(!temp_dir.path().join("silent_001.mp3").exists());
}

/// Test that a stream with no boundary events still produces audio, no SRT
#[tokio::test]
async fn test_run_withNoBoundaryEngine_shouldSkipSubtitleFile() {
    let temp_dir = create_temp_dir().unwrap();
    let chunks = chunks_from(&["Audio but no timing events."]);

    let runner = BatchRunner::new(Arc::new(MockEngine::no_boundaries()), 1);
    let reporter = NullReporter;
    let outcome = runner
        .run(
            &chunks,
            &VoiceParams::default(),
            temp_dir.path(),
            "untimed",
            true,
            &reporter,
        )
        .await
        .unwrap();

    assert_eq!(outcome.successes.len(), 1);
    assert!(outcome.successes[0].audio_path.exists());
    assert!(outcome.successes[0].subtitle_path.is_none());
}

/// Test that progress callbacks arrive for every chunk and end at 1.0
#[tokio::test]
async fn test_run_withWorkingEngine_shouldReportProgressToCompletion() {
    let temp_dir = create_temp_dir().unwrap();
    let chunks = chunks_from(&["One.", "Two.", "Three.", "Four."]);

    let runner = BatchRunner::new(Arc::new(MockEngine::working()), 2);
    let reporter = CapturingReporter::default();
    runner
        .run(
            &chunks,
            &VoiceParams::default(),
            temp_dir.path(),
            "progress",
            false,
            &reporter,
        )
        .await
        .unwrap();

    let progress = reporter.progress.lock();
    assert_eq!(progress.len(), 4);
    assert!((progress.last().unwrap().0 - 1.0).abs() < f32::EPSILON);
}
