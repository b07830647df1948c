//! Per-call transcript accumulation.
//!
//! Live entries are appended as the call progresses with adjacent-duplicate
//! suppression. Offline segments are merged after the call closes, and the
//! whole list is then stably sorted by offset so live and offline entries
//! interleave chronologically.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who produced a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Speaker {
    User,
    Assistant,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::User => write!(f, "User"),
            Speaker::Assistant => write!(f, "Assistant"),
        }
    }
}

/// One line of the transcript. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
    /// Milliseconds since the session started.
    pub offset_ms: u64,
}

impl fmt::Display for TranscriptEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.speaker, self.text)
    }
}

/// A timed segment returned by offline transcription.
#[derive(Debug, Clone, PartialEq)]
pub struct OfflineSegment {
    pub text: String,
    /// Segment start in seconds.
    pub start_secs: f64,
}

#[derive(Debug, Default, Clone)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a live entry. Returns false when the entry repeats the
    /// previous one (same speaker, same trimmed text) and was dropped.
    pub fn record(&mut self, speaker: Speaker, text: &str, offset_ms: u64) -> bool {
        let text = text.trim();

        if let Some(last) = self.entries.last()
            && last.speaker == speaker
            && last.text == text
        {
            return false;
        }

        self.entries.push(TranscriptEntry {
            speaker,
            text: text.to_string(),
            offset_ms,
        });
        true
    }

    /// Append offline segments as user entries, then sort the full list by
    /// offset. The sort is stable, so entries sharing an offset keep their
    /// append order.
    pub fn merge_offline(&mut self, segments: impl IntoIterator<Item = OfflineSegment>) {
        for segment in segments {
            let offset_ms = (segment.start_secs.max(0.0) * 1000.0).round() as u64;
            self.entries.push(TranscriptEntry {
                speaker: Speaker::User,
                text: segment.text.trim().to_string(),
                offset_ms,
            });
        }

        self.entries.sort_by_key(|entry| entry.offset_ms);
    }

    /// Canonical text form: one `Speaker: text` line per entry.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
