//! Keyword excerpts with surrounding context.
//!
//! The scan is a two-state machine. While `Closed`, non-matching segments are
//! skipped. The first match opens a chunk seeded with the previous segment as
//! leading context. Further matches extend it, and the first non-match after
//! that is appended as trailing context and closes the chunk.

use crate::types::{ContextChunk, TimestampedSegment};

const ELLIPSIS_OPEN: &str = "... ";
const ELLIPSIS_CLOSE: &str = " ...";

enum ChunkState<'a> {
    Closed,
    Open(OpenChunk<'a>),
}

struct OpenChunk<'a> {
    start: u32,
    end: u32,
    parts: Vec<&'a str>,
}

impl<'a> OpenChunk<'a> {
    /// Start a chunk whose leading context is `segment`.
    fn seeded(segment: &'a TimestampedSegment) -> Self {
        Self {
            start: segment.start,
            end: segment.end,
            parts: vec![segment.text.as_str()],
        }
    }

    fn empty(start: u32) -> Self {
        Self {
            start,
            end: start,
            parts: Vec::new(),
        }
    }

    fn push(&mut self, segment: &'a TimestampedSegment) {
        self.parts.push(segment.text.as_str());
        self.end = segment.end;
    }

    fn finish(self) -> ContextChunk {
        ContextChunk {
            start: self.start,
            end: self.end,
            text: format!("{ELLIPSIS_OPEN}{}{ELLIPSIS_CLOSE}", self.parts.join(" ")),
        }
    }
}

/// Lowercased, non-empty keywords ready for substring matching.
fn needles(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn matches_any(text: &str, needles: &[String]) -> bool {
    let haystack = text.to_lowercase();
    needles.iter().any(|n| haystack.contains(n.as_str()))
}

/// Build context-padded excerpts around every run of keyword matches.
///
/// Consecutive matches merge into one chunk. A chunk gets the segment before
/// its first match as leading context (when one exists) and the first
/// non-matching segment after its last match as trailing context. A chunk
/// still open at the end of the transcript has no trailing context.
pub fn build_context_chunks(
    segments: &[TimestampedSegment],
    keywords: &[String],
) -> Vec<ContextChunk> {
    let needles = needles(keywords);
    if needles.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut state = ChunkState::Closed;

    for (i, segment) in segments.iter().enumerate() {
        let matched = matches_any(&segment.text, &needles);

        state = match (state, matched) {
            (ChunkState::Closed, false) => ChunkState::Closed,
            (ChunkState::Closed, true) => {
                let mut open = match i.checked_sub(1) {
                    Some(prev) => OpenChunk::seeded(&segments[prev]),
                    None => OpenChunk::empty(segment.start),
                };
                open.push(segment);
                ChunkState::Open(open)
            }
            (ChunkState::Open(mut open), true) => {
                open.push(segment);
                ChunkState::Open(open)
            }
            (ChunkState::Open(mut open), false) => {
                open.push(segment);
                chunks.push(open.finish());
                ChunkState::Closed
            }
        };
    }

    if let ChunkState::Open(open) = state {
        chunks.push(open.finish());
    }

    chunks
}
