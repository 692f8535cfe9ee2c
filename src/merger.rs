use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::process::Command;

// @module: Merging per-chunk audio artifacts with ffmpeg

/// Merges chunk audio files into a single output via ffmpeg's concat demuxer.
///
/// ffmpeg is an optional external dependency. When it is missing the merge
/// degrades gracefully: the per-chunk files are left in place and the caller
/// gets `Ok(None)` instead of an error.
pub struct ArtifactMerger {
    /// Seconds to wait for ffmpeg before giving up
    timeout_secs: u64,

    /// Remove the per-chunk audio files after a successful merge
    delete_chunks: bool,
}

impl Default for ArtifactMerger {
    fn default() -> Self {
        Self {
            timeout_secs: 300,
            delete_chunks: false,
        }
    }
}

impl ArtifactMerger {
    /// Create a merger with an ffmpeg timeout in seconds
    pub fn new(timeout_secs: u64, delete_chunks: bool) -> Self {
        Self {
            timeout_secs,
            delete_chunks,
        }
    }

    /// Check whether an ffmpeg binary is reachable on PATH
    pub async fn ffmpeg_available() -> bool {
        Command::new("ffmpeg")
            .arg("-version")
            .output()
            .await
            .map(|out| out.status.success())
            .unwrap_or(false)
    }

    /// Merge the given audio files, in order, into `output_path`.
    ///
    /// Returns `Ok(Some(path))` on success and `Ok(None)` when ffmpeg is not
    /// installed, exits nonzero, or exceeds the configured timeout; merging
    /// is best-effort and `None` means
    /// the per-chunk files remain the deliverable. Inputs must share a parent
    /// directory with the output; the concat manifest uses bare file names
    /// and ffmpeg runs with that directory as its working directory.
    pub async fn merge(
        &self,
        audio_paths: &[PathBuf],
        output_path: &Path,
    ) -> Result<Option<PathBuf>> {
        if audio_paths.is_empty() {
            return Err(anyhow!("No audio files to merge"));
        }

        if !Self::ffmpeg_available().await {
            warn!("ffmpeg not found on PATH, leaving {} chunk files unmerged", audio_paths.len());
            return Ok(None);
        }

        let work_dir = output_path
            .parent()
            .ok_or_else(|| anyhow!("Output path has no parent directory: {:?}", output_path))?;

        let manifest_path = work_dir.join("concat_list.txt");
        let manifest = Self::build_manifest(audio_paths)?;
        fs::write(&manifest_path, &manifest)
            .await
            .with_context(|| format!("Failed to write concat manifest: {:?}", manifest_path))?;

        debug!("Merging {} files into {:?}", audio_paths.len(), output_path);

        let output_name = output_path
            .file_name()
            .ok_or_else(|| anyhow!("Output path has no file name: {:?}", output_path))?;

        let mut command = Command::new("ffmpeg");
        command
            .current_dir(work_dir)
            .args(["-f", "concat", "-safe", "0", "-i", "concat_list.txt", "-c", "copy"])
            .arg(output_name)
            .arg("-y")
            .kill_on_drop(true);

        let timeout_duration = std::time::Duration::from_secs(self.timeout_secs);
        let result = tokio::select! {
            result = command.output() => {
                Some(result.map_err(|e| anyhow!("Failed to execute ffmpeg: {}", e)))
            },
            _ = tokio::time::sleep(timeout_duration) => None,
        };

        // The manifest is an intermediate file either way
        let _ = fs::remove_file(&manifest_path).await;

        let result = match result {
            Some(result) => result?,
            None => {
                // Timed out; the dropped child is killed and its partial
                // output is discarded
                warn!(
                    "ffmpeg merge timed out after {} seconds, keeping chunk files",
                    self.timeout_secs
                );
                let _ = fs::remove_file(output_path).await;
                return Ok(None);
            }
        };
        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let filtered = Self::filter_ffmpeg_stderr(&stderr);
            // Nonzero exit keeps the chunk files as the deliverable
            warn!("ffmpeg merge failed, keeping chunk files: {}", filtered);
            let _ = fs::remove_file(output_path).await;
            return Ok(None);
        }

        if self.delete_chunks {
            for path in audio_paths {
                if let Err(e) = fs::remove_file(path).await {
                    warn!("Failed to remove merged chunk {:?}: {}", path, e);
                }
            }
            debug!("Removed {} merged chunk files", audio_paths.len());
        }

        info!("Merged {} chunks into {:?}", audio_paths.len(), output_path);
        Ok(Some(output_path.to_path_buf()))
    }

    /// Build the concat demuxer manifest, one `file '<name>'` line per input
    fn build_manifest(audio_paths: &[PathBuf]) -> Result<String> {
        let mut manifest = String::new();
        for path in audio_paths {
            let name = path
                .file_name()
                .ok_or_else(|| anyhow!("Audio path has no file name: {:?}", path))?
                .to_string_lossy();
            // Single quotes inside names would break the quoting
            if name.contains('\'') {
                return Err(anyhow!("Audio file name contains a quote: {:?}", path));
            }
            manifest.push_str(&format!("file '{}'\n", name));
        }
        Ok(manifest)
    }

    /// Filter ffmpeg stderr to only show meaningful error lines, stripping the
    /// version banner, build configuration, and stream metadata noise.
    fn filter_ffmpeg_stderr(stderr: &str) -> String {
        let dominated_prefixes = [
            "ffmpeg version",
            "  built with",
            "  configuration:",
            "  lib",
            "Input #",
            "  Metadata:",
            "  Duration:",
            "  Stream #",
            "Output #",
            "Stream mapping:",
            "Press [q]",
            "size=",
        ];

        let meaningful: Vec<&str> = stderr
            .lines()
            .filter(|line| {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    return false;
                }
                !dominated_prefixes.iter().any(|p| trimmed.starts_with(p))
            })
            .collect();

        if meaningful.is_empty() {
            "unknown ffmpeg error (stderr was empty after filtering)".to_string()
        } else {
            meaningful.join("\n")
        }
    }
}
