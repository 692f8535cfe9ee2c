use anyhow::{anyhow, Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::Config;
use crate::engine::remote::RemoteEngine;
use crate::engine::SpeechEngine;
use crate::errors::ConversionError;
use crate::file_utils::FileManager;
use crate::job_store::{JobStatus, JobStore};
use crate::merger::ArtifactMerger;
use crate::synthesis::{BatchRunner, ChunkResult, LogReporter, ProgressReporter};
use crate::text_segmenter;

// @module: Application controller for text-to-speech conversion

/// Everything one conversion produced
#[derive(Debug)]
pub struct ConversionOutcome {
    /// Per-chunk artifacts, ordered by chunk index
    pub chunks: Vec<ChunkResult>,

    /// Chunks that failed, ordered by index
    pub failures: Vec<(usize, String)>,

    /// Path of the merged audio file, when merging ran and succeeded
    pub merged_audio: Option<PathBuf>,
}

/// Main application controller for text-to-speech conversion
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Speech engine the pipeline talks to
    engine: Arc<dyn SpeechEngine>,

    // @field: Optional job tracking
    job_store: Option<Arc<dyn JobStore>>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let engine = RemoteEngine::new(&config.engine.endpoint, config.engine.timeout_secs)?;
        Ok(Self {
            config,
            engine: Arc::new(engine),
            job_store: None,
        })
    }

    /// Create a controller around an existing engine, used by tests
    pub fn with_engine(config: Config, engine: Arc<dyn SpeechEngine>) -> Self {
        Self {
            config,
            engine,
            job_store: None,
        }
    }

    /// Attach a job store; every conversion then records its lifecycle there
    pub fn with_job_store(mut self, store: Arc<dyn JobStore>) -> Self {
        self.job_store = Some(store);
        self
    }

    /// Run the main workflow for a single text file
    pub async fn run(&self, input_file: PathBuf, output_dir: PathBuf, force_overwrite: bool) -> Result<()> {
        let multi_progress = MultiProgress::new();
        self.run_with_progress(input_file, output_dir, &multi_progress, force_overwrite)
            .await
    }

    /// Run the controller with progress reporting
    async fn run_with_progress(
        &self,
        input_file: PathBuf,
        output_dir: PathBuf,
        multi_progress: &MultiProgress,
        force_overwrite: bool,
    ) -> Result<()> {
        let start_time = std::time::Instant::now();

        if !FileManager::file_exists(&input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }
        FileManager::ensure_dir(&output_dir)?;

        let prefix = FileManager::artifact_prefix(&input_file);
        let merged_path = FileManager::merged_output_path(&output_dir, &prefix);
        if merged_path.exists() && !force_overwrite {
            warn!("Skipping file, output already exists (use -f to force overwrite)");
            return Ok(());
        }

        let text = FileManager::read_to_string(&input_file)?;
        let chunk_count_hint = text.chars().count().div_ceil(self.config.chunking.max_chars.max(1));

        let progress_bar = multi_progress.add(ProgressBar::new(chunk_count_hint.max(1) as u64));
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("#>-"));
        progress_bar.set_message("Synthesizing");

        let reporter = ProgressBarReporter {
            bar: progress_bar.clone(),
        };

        let outcome = self
            .convert_text(&text, &output_dir, &prefix, &reporter)
            .await
            .with_context(|| format!("Conversion failed for {:?}", input_file))?;

        progress_bar.finish_and_clear();

        if !outcome.failures.is_empty() {
            warn!(
                "Completed with {} failed chunks: {:?}",
                outcome.failures.len(),
                outcome.failures.iter().map(|(i, _)| *i).collect::<Vec<_>>()
            );
            for (index, error) in &outcome.failures {
                warn!("  chunk {}: {}", index, error);
            }
        }

        match &outcome.merged_audio {
            Some(path) => info!("Success: {}", path.display()),
            None => info!(
                "Success: {} chunk files in {}",
                outcome.chunks.len(),
                output_dir.display()
            ),
        }
        info!(
            "Conversion completed in {}.",
            Self::format_duration(start_time.elapsed())
        );

        Ok(())
    }

    /// Convert one text into per-chunk artifacts and an optional merged file.
    ///
    /// This is the whole pipeline: segment, synthesize under the concurrency
    /// cap, then merge what succeeded.
    pub async fn convert_text(
        &self,
        text: &str,
        output_dir: &Path,
        prefix: &str,
        reporter: &dyn ProgressReporter,
    ) -> Result<ConversionOutcome, ConversionError> {
        let job_id = self.job_store.as_ref().map(|store| {
            let id = store.create_job();
            store.update_progress(id, JobStatus::Processing, 0.0, "Segmenting text");
            id
        });

        let result = self.convert_text_inner(text, output_dir, prefix, reporter).await;

        if let (Some(store), Some(id)) = (self.job_store.as_ref(), job_id) {
            match &result {
                Ok(outcome) => {
                    for chunk in &outcome.chunks {
                        store.add_artifact(id, chunk.audio_path.clone());
                        if let Some(srt) = &chunk.subtitle_path {
                            store.add_artifact(id, srt.clone());
                        }
                    }
                    if let Some(merged) = &outcome.merged_audio {
                        store.add_artifact(id, merged.clone());
                    }
                    store.update_progress(id, JobStatus::Completed, 1.0, "Completed");
                }
                Err(e) => store.mark_failed(id, &e.to_string()),
            }
        }

        result
    }

    async fn convert_text_inner(
        &self,
        text: &str,
        output_dir: &Path,
        prefix: &str,
        reporter: &dyn ProgressReporter,
    ) -> Result<ConversionOutcome, ConversionError> {
        let chunks = text_segmenter::segment(
            text,
            self.config.chunking.min_chars,
            self.config.chunking.max_chars,
        )?;
        if chunks.is_empty() {
            return Err(ConversionError::EmptyInput(PathBuf::from(prefix)));
        }

        info!("Segmented input into {} chunks", chunks.len());

        let runner = BatchRunner::new(
            Arc::clone(&self.engine),
            self.config.synthesis.concurrent_chunks,
        );
        let batch = runner
            .run(
                &chunks,
                &self.config.synthesis.voice_params(),
                output_dir,
                prefix,
                self.config.synthesis.generate_subtitles,
                reporter,
            )
            .await?;

        let merged_audio = if self.config.output.merge_audio && batch.successes.len() > 1 {
            let merger = ArtifactMerger::new(
                self.config.output.merge_timeout_secs,
                self.config.output.delete_chunks_after_merge,
            );
            let merged_path = FileManager::merged_output_path(output_dir, prefix);
            match merger.merge(&batch.audio_paths(), &merged_path).await {
                Ok(result) => result,
                Err(e) => {
                    // A failed merge never discards the chunk files
                    warn!("Merge failed, keeping chunk files: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Ok(ConversionOutcome {
            chunks: batch.successes,
            failures: batch
                .failures
                .into_iter()
                .map(|(index, e)| (index, e.to_string()))
                .collect(),
            merged_audio,
        })
    }

    /// Run the workflow in folder mode, processing all text files in a directory
    /// Files whose merged output already exists will be skipped
    pub async fn run_folder(&self, input_dir: PathBuf, output_dir: Option<PathBuf>, force_overwrite: bool) -> Result<()> {
        let start_time = std::time::Instant::now();

        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let text_files = FileManager::find_files(&input_dir, "txt")?;
        if text_files.is_empty() {
            warn!("No .txt files found in {:?}", input_dir);
            return Ok(());
        }
        info!("Found {} text files to convert", text_files.len());

        let output_dir = output_dir.unwrap_or_else(|| input_dir.clone());

        let multi_progress = MultiProgress::new();
        let folder_bar = multi_progress.add(ProgressBar::new(text_files.len() as u64));
        let folder_style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.green/white}] {pos}/{len} files {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_bar.set_style(folder_style);

        let mut failed_files = Vec::new();
        for file in &text_files {
            folder_bar.set_message(
                file.file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
            );

            if let Err(e) = self
                .run_with_progress(file.clone(), output_dir.clone(), &multi_progress, force_overwrite)
                .await
            {
                warn!("Failed to convert {:?}: {}", file, e);
                failed_files.push(file.clone());
            }
            folder_bar.inc(1);
        }
        folder_bar.finish_and_clear();

        info!(
            "Folder conversion completed in {}. {} of {} files succeeded.",
            Self::format_duration(start_time.elapsed()),
            text_files.len() - failed_files.len(),
            text_files.len()
        );
        if !failed_files.is_empty() {
            return Err(anyhow!("{} files failed to convert", failed_files.len()));
        }

        Ok(())
    }

    /// Verify that the configured engine is reachable
    pub async fn check_engine(&self) -> Result<()> {
        self.engine
            .test_connection()
            .await
            .map_err(|e| anyhow!("Engine connection check failed: {}", e))
    }

    // Format duration in a human-readable format
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}

/// Reporter that drives an indicatif progress bar
#[derive(Debug)]
struct ProgressBarReporter {
    bar: ProgressBar,
}

impl ProgressReporter for ProgressBarReporter {
    fn on_progress(&self, fraction: f32, message: &str) {
        let len = self.bar.length().unwrap_or(0).max(1);
        self.bar.set_position((fraction * len as f32).round() as u64);
        self.bar.set_message(message.to_string());
    }

    fn on_log(&self, level: log::Level, message: &str) {
        // Route through the bar so log lines don't tear it
        self.bar.suspend(|| LogReporter.on_log(level, message));
    }
}
