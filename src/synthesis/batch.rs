/*!
 * Concurrent batch synthesis.
 *
 * This module fans a batch of text chunks out to the engine under a
 * concurrency cap, keeps per-chunk failures isolated, and re-imposes chunk
 * order on the results regardless of completion order.
 */

use futures::stream::{self, StreamExt};
use log::Level;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::engine::{SpeechEngine, VoiceParams};
use crate::errors::{ConversionError, SynthesisError};
use crate::file_utils::FileManager;
use crate::synthesis::chunk::{synthesize_chunk, ChunkResult};
use crate::synthesis::progress::ProgressReporter;
use crate::text_segmenter::TextChunk;

/// Aggregate outcome of a batch run.
///
/// Successes and failures are each ordered by chunk index; together they
/// cover every input chunk exactly once.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Chunks that produced artifacts, ordered by index
    pub successes: Vec<ChunkResult>,

    /// Chunks that failed, ordered by index
    pub failures: Vec<(usize, SynthesisError)>,
}

impl BatchOutcome {
    /// Ordered audio paths of the successful chunks
    pub fn audio_paths(&self) -> Vec<std::path::PathBuf> {
        self.successes.iter().map(|r| r.audio_path.clone()).collect()
    }
}

/// Batch runner for synthesizing chunks concurrently
pub struct BatchRunner {
    /// The engine every chunk task talks to
    engine: Arc<dyn SpeechEngine>,

    /// Maximum number of chunks synthesized at once
    concurrency_limit: usize,
}

impl BatchRunner {
    /// Create a new batch runner; a limit of 0 is treated as 1
    pub fn new(engine: Arc<dyn SpeechEngine>, concurrency_limit: usize) -> Self {
        Self {
            engine,
            concurrency_limit: concurrency_limit.max(1),
        }
    }

    /// Synthesize all chunks, writing artifacts named
    /// `{prefix}_{index:03}.mp3` (and `.srt`) into `output_dir`.
    ///
    /// One chunk's failure never cancels its siblings; every task is awaited
    /// before this returns. The call fails only when no chunk at all
    /// succeeded.
    pub async fn run(
        &self,
        chunks: &[TextChunk],
        params: &VoiceParams,
        output_dir: &Path,
        prefix: &str,
        generate_subtitles: bool,
        reporter: &dyn ProgressReporter,
    ) -> Result<BatchOutcome, ConversionError> {
        let total = chunks.len();
        let semaphore = Arc::new(Semaphore::new(self.concurrency_limit));
        let completed = Arc::new(AtomicUsize::new(0));

        reporter.on_log(
            Level::Info,
            &format!(
                "Synthesizing {} chunks, up to {} at once",
                total, self.concurrency_limit
            ),
        );

        let results: Vec<(usize, Result<ChunkResult, SynthesisError>)> =
            stream::iter(chunks.iter())
                .map(|chunk| {
                    let engine = Arc::clone(&self.engine);
                    let semaphore = Arc::clone(&semaphore);
                    let completed = Arc::clone(&completed);
                    let params = params.clone();
                    let audio_path =
                        FileManager::chunk_artifact_path(output_dir, prefix, chunk.index, "mp3");
                    let subtitle_path = generate_subtitles.then(|| {
                        FileManager::chunk_artifact_path(output_dir, prefix, chunk.index, "srt")
                    });

                    async move {
                        // Admission gate: at most `concurrency_limit` chunks
                        // are streaming at any moment
                        let _permit = semaphore.acquire().await.expect("semaphore closed");

                        let result = synthesize_chunk(
                            engine.as_ref(),
                            chunk,
                            &params,
                            &audio_path,
                            subtitle_path.as_deref(),
                        )
                        .await;

                        let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                        (chunk.index, result, done)
                    }
                })
                .buffer_unordered(self.concurrency_limit)
                .map(|(index, result, done)| {
                    let fraction = done as f32 / total.max(1) as f32;
                    match &result {
                        Ok(_) => reporter.on_progress(
                            fraction,
                            &format!("Chunk {} of {} done", done, total),
                        ),
                        Err(e) => {
                            reporter.on_log(Level::Error, &format!("Chunk {} failed: {}", index, e));
                            reporter.on_progress(
                                fraction,
                                &format!("Chunk {} of {} failed", done, total),
                            );
                        }
                    }
                    (index, result)
                })
                .collect()
                .await;

        // Completion order is unconstrained; restore chunk order here
        let mut sorted = results;
        sorted.sort_by_key(|(index, _)| *index);

        let mut successes = Vec::new();
        let mut failures = Vec::new();
        for (index, result) in sorted {
            match result {
                Ok(chunk_result) => successes.push(chunk_result),
                Err(e) => failures.push((index, e)),
            }
        }

        if successes.is_empty() {
            return Err(ConversionError::NoChunksSucceeded {
                failures: failures
                    .into_iter()
                    .map(|(index, e)| (index, e.to_string()))
                    .collect(),
            });
        }

        if !failures.is_empty() {
            reporter.on_log(
                Level::Warn,
                &format!(
                    "{} of {} chunks failed: indices {:?}",
                    failures.len(),
                    total,
                    failures.iter().map(|(i, _)| *i).collect::<Vec<_>>()
                ),
            );
        }

        Ok(BatchOutcome { successes, failures })
    }
}
