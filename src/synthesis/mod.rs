/*!
 * Chunked synthesis pipeline.
 *
 * This module contains the machinery that turns an ordered list of text
 * chunks into per-chunk audio (and optional subtitle) artifacts:
 * - `chunk`: drives one chunk through the engine's event stream
 * - `batch`: fans chunks out under a concurrency cap and aggregates results
 * - `progress`: observer interface for progress and log reporting
 */

pub mod batch;
pub mod chunk;
pub mod progress;

pub use batch::{BatchOutcome, BatchRunner};
pub use chunk::ChunkResult;
pub use progress::{LogReporter, NullReporter, ProgressReporter};
