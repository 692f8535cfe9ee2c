use futures_util::StreamExt;
use log::{debug, info};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::engine::{SpeechEngine, TimedEvent, VoiceParams};
use crate::errors::SynthesisError;
use crate::subtitles::SubtitleAccumulator;
use crate::text_segmenter::TextChunk;

// @module: Single-chunk synthesis against the engine event stream

/// Artifacts produced for one successfully synthesized chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkResult {
    /// 1-based chunk index
    pub index: usize,

    /// Path of the written audio artifact
    pub audio_path: PathBuf,

    /// Path of the written subtitle artifact, when one was requested and the
    /// stream yielded at least one cue
    pub subtitle_path: Option<PathBuf>,
}

/// Synthesize one chunk: consume the engine's event stream to exhaustion,
/// appending audio payloads to `audio_path` in arrival order and, when
/// `subtitle_path` is given, accumulating sentence boundaries into an SRT
/// file alongside.
///
/// Word boundary events are observed but never produce cues. On any failure
/// all partial artifacts are removed before the error is returned, so a
/// failed chunk leaves nothing on disk.
pub async fn synthesize_chunk(
    engine: &dyn SpeechEngine,
    chunk: &TextChunk,
    params: &VoiceParams,
    audio_path: &Path,
    subtitle_path: Option<&Path>,
) -> Result<ChunkResult, SynthesisError> {
    let index = chunk.index;
    debug!(
        "Synthesizing chunk {} ({} chars) -> {}",
        index,
        chunk.char_len(),
        audio_path.display()
    );

    let result = write_chunk_stream(engine, chunk, params, audio_path, subtitle_path).await;

    if result.is_err() {
        cleanup_partial(audio_path, subtitle_path).await;
    }
    result
}

async fn write_chunk_stream(
    engine: &dyn SpeechEngine,
    chunk: &TextChunk,
    params: &VoiceParams,
    audio_path: &Path,
    subtitle_path: Option<&Path>,
) -> Result<ChunkResult, SynthesisError> {
    let index = chunk.index;
    let io_err = |source| SynthesisError::Io {
        chunk_index: index,
        source,
    };

    let mut audio_file = fs::File::create(audio_path).await.map_err(io_err)?;
    let mut accumulator = subtitle_path.map(|_| SubtitleAccumulator::new());
    let mut word_events = 0usize;

    let mut stream = engine
        .stream(&chunk.text, params)
        .await
        .map_err(|source| SynthesisError::Engine {
            chunk_index: index,
            source,
        })?;

    while let Some(event) = stream.next().await {
        let event = event.map_err(|source| SynthesisError::Engine {
            chunk_index: index,
            source,
        })?;

        match event {
            TimedEvent::Audio { data } => {
                // Stream order is write order; audio bytes are never reordered
                audio_file.write_all(&data).await.map_err(io_err)?;
            }
            TimedEvent::SentenceBoundary { .. } => {
                if let Some(acc) = accumulator.as_mut() {
                    acc.feed(&event);
                }
            }
            TimedEvent::WordBoundary { .. } => {
                word_events += 1;
            }
        }
    }

    audio_file.flush().await.map_err(io_err)?;
    drop(audio_file);

    if word_events > 0 {
        debug!("Chunk {}: ignored {} word boundary events", index, word_events);
    }

    // The stream ended cleanly; make sure it actually produced audio
    let audio_size = fs::metadata(audio_path)
        .await
        .map(|m| m.len())
        .unwrap_or(0);
    if audio_size == 0 {
        return Err(SynthesisError::EmptyOutput { chunk_index: index });
    }

    let mut written_subtitle = None;
    if let (Some(path), Some(acc)) = (subtitle_path, accumulator.as_ref()) {
        if acc.cue_count() > 0 {
            fs::write(path, acc.to_srt()).await.map_err(io_err)?;
            debug!("Chunk {}: wrote {} cues to {}", index, acc.cue_count(), path.display());
            written_subtitle = Some(path.to_path_buf());
        } else {
            // Some voices and inputs yield no sentence events; not an error
            info!("Chunk {}: no sentence events received, skipping subtitle file", index);
        }
    }

    debug!("Chunk {}: wrote {} bytes of audio", index, audio_size);

    Ok(ChunkResult {
        index,
        audio_path: audio_path.to_path_buf(),
        subtitle_path: written_subtitle,
    })
}

/// Remove whatever partial artifacts a failed chunk left behind
async fn cleanup_partial(audio_path: &Path, subtitle_path: Option<&Path>) {
    if fs::try_exists(audio_path).await.unwrap_or(false) {
        let _ = fs::remove_file(audio_path).await;
    }
    if let Some(path) = subtitle_path {
        if fs::try_exists(path).await.unwrap_or(false) {
            let _ = fs::remove_file(path).await;
        }
    }
}
