//! Whisper transcription over the OpenAI REST API.
//!
//! Caller audio is uploaded as a mu-law WAV and transcribed with
//! `verbose_json` so each segment carries its start time.

mod client;
pub mod messages;

pub use client::{DEFAULT_WHISPER_MODEL, WHISPER_TRANSCRIPTION_URL, WhisperConfig, WhisperTranscriber};
