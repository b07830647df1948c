//! Offline transcription abstraction.

use async_trait::async_trait;
use thiserror::Error;

use crate::core::transcript::OfflineSegment;

#[derive(Debug, Error)]
pub enum TranscriptionError {
    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Provider returned a non-success status
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// Response body could not be parsed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Audio could not be packaged for upload
    #[error("Audio processing error: {0}")]
    AudioProcessingError(String),
}

pub type TranscriptionResult<T> = Result<T, TranscriptionError>;

/// Transcribes a whole call's caller audio after it ends.
#[async_trait]
pub trait OfflineTranscriber: Send + Sync {
    /// `audio` is raw 8 kHz mono mu-law as received from the media stream.
    async fn transcribe(&self, audio: &[u8]) -> TranscriptionResult<Vec<OfflineSegment>>;
}
