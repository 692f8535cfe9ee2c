use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ConversionError;

// @module: Text segmentation into synthesis-sized chunks

// @const: Break-point patterns, in priority order
static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]\s+").unwrap());
static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());
static COMMA_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s+").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// A bounded slice of the source text, the unit of independent synthesis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// 1-based position of this chunk in the document
    pub index: usize,

    /// Trimmed, non-empty chunk text
    pub text: String,
}

impl TextChunk {
    /// Number of characters in the chunk text
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Split `text` into ordered chunks of `min_chars..=max_chars` characters,
/// preferring natural break points.
///
/// The scan moves forward through the text. For each chunk the window
/// `[pos + min_chars, pos + max_chars)` is searched for a cut point, trying
/// in order: the last sentence terminator followed by whitespace (cutting
/// after the whitespace run), the last paragraph break, the last comma
/// followed by whitespace, the last whitespace run. If none exists the chunk
/// is cut hard at `max_chars`. The final tail always becomes the last chunk.
///
/// Sizes are measured in characters; cuts always land on char boundaries.
/// Whitespace-only pieces are dropped, so no emitted chunk is empty.
pub fn segment(text: &str, min_chars: usize, max_chars: usize) -> Result<Vec<TextChunk>, ConversionError> {
    if min_chars == 0 || min_chars > max_chars {
        return Err(ConversionError::InvalidChunkBounds {
            min: min_chars,
            max: max_chars,
        });
    }

    // Byte offset of every char start, with a sentinel at the end so that
    // offsets[char_pos] is always a valid slice boundary.
    let offsets: Vec<usize> = text
        .char_indices()
        .map(|(byte_pos, _)| byte_pos)
        .chain(std::iter::once(text.len()))
        .collect();
    let total_chars = offsets.len() - 1;

    let mut chunks: Vec<TextChunk> = Vec::new();
    let mut current = 0usize;

    while current < total_chars {
        let target_end = (current + max_chars).min(total_chars);

        // The remaining tail fits in one chunk
        if target_end == total_chars {
            let tail = text[offsets[current]..].trim();
            if !tail.is_empty() {
                chunks.push(TextChunk {
                    index: chunks.len() + 1,
                    text: tail.to_string(),
                });
            }
            break;
        }

        let search_start = current + min_chars;
        let window = &text[offsets[search_start]..offsets[target_end]];

        let cut_byte = match find_break(window) {
            Some(relative_end) => offsets[search_start] + relative_end,
            None => offsets[target_end],
        };

        let piece = text[offsets[current]..cut_byte].trim();
        if !piece.is_empty() {
            chunks.push(TextChunk {
                index: chunks.len() + 1,
                text: piece.to_string(),
            });
        }

        // cut_byte is a char boundary, so this finds its exact char position
        let next = offsets.partition_point(|&b| b < cut_byte);
        if next <= current {
            // Unreachable: the hard cut lands at target_end > current
            return Err(ConversionError::SegmentationDegenerate { position: current });
        }
        current = next;
    }

    if chunks.is_empty() && total_chars > 0 {
        warn!("Segmentation produced no chunks from {} characters of whitespace", total_chars);
    }

    if log::max_level() >= log::LevelFilter::Debug && !chunks.is_empty() {
        let sizes: Vec<usize> = chunks.iter().map(|c| c.char_len()).collect();
        let min = sizes.iter().min().unwrap();
        let max = sizes.iter().max().unwrap();
        let avg = sizes.iter().sum::<usize>() / sizes.len();
        debug!(
            "Split text into {} chunks, sizes {}-{} chars (avg: {})",
            chunks.len(),
            min,
            max,
            avg
        );
    }

    Ok(chunks)
}

/// Find the best break point in the search window, returning the byte offset
/// just past the break (relative to the window start)
fn find_break(window: &str) -> Option<usize> {
    for pattern in [&SENTENCE_END, &PARAGRAPH_BREAK, &COMMA_BREAK, &WHITESPACE_RUN] {
        if let Some(m) = pattern.find_iter(window).last() {
            return Some(m.end());
        }
    }
    None
}
