//! Post-call transcription of the caller's audio.

pub mod base;
pub mod whisper;

pub use base::{OfflineTranscriber, TranscriptionError, TranscriptionResult};
pub use whisper::{WhisperConfig, WhisperTranscriber};
