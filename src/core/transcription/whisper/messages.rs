//! Whisper transcription API types and the mu-law WAV container.

use serde::{Deserialize, Serialize};

/// Verbose JSON response from the transcription API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerboseTranscriptionResponse {
    /// The transcribed text (full transcript).
    #[serde(default)]
    pub text: String,

    /// Duration of the audio in seconds.
    #[serde(default)]
    pub duration: Option<f64>,

    /// Transcription segments with timing information.
    #[serde(default)]
    pub segments: Vec<TranscriptionSegment>,
}

/// A segment of transcribed text with timing.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscriptionSegment {
    /// Start time of the segment in seconds.
    pub start: f64,

    /// End time of the segment in seconds.
    #[serde(default)]
    pub end: f64,

    /// Transcribed text for this segment.
    pub text: String,
}

/// Error response from the OpenAI API.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIErrorResponse {
    pub error: OpenAIErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAIErrorDetail {
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: String,
}

pub mod wav {
    /// WAVE_FORMAT_MULAW
    pub const FORMAT_MULAW: u16 = 7;

    /// Telephony sample rate
    pub const MULAW_SAMPLE_RATE: u32 = 8000;

    /// Create a 44-byte WAV header.
    ///
    /// # Arguments
    /// * `data_size` - Size of the audio data in bytes
    /// * `audio_format` - Format tag (1 = PCM, 7 = mu-law)
    /// * `sample_rate` - Sample rate in Hz
    /// * `channels` - Number of channels
    /// * `bits_per_sample` - Bits per sample (8 for mu-law)
    pub fn create_header(
        data_size: u32,
        audio_format: u16,
        sample_rate: u32,
        channels: u16,
        bits_per_sample: u16,
    ) -> [u8; 44] {
        let byte_rate = sample_rate * u32::from(channels) * u32::from(bits_per_sample) / 8;
        let block_align = channels * bits_per_sample / 8;
        let file_size = 36 + data_size;

        let mut header = [0u8; 44];

        // RIFF chunk descriptor
        header[0..4].copy_from_slice(b"RIFF");
        header[4..8].copy_from_slice(&file_size.to_le_bytes());
        header[8..12].copy_from_slice(b"WAVE");

        // fmt sub-chunk
        header[12..16].copy_from_slice(b"fmt ");
        header[16..20].copy_from_slice(&16u32.to_le_bytes());
        header[20..22].copy_from_slice(&audio_format.to_le_bytes());
        header[22..24].copy_from_slice(&channels.to_le_bytes());
        header[24..28].copy_from_slice(&sample_rate.to_le_bytes());
        header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
        header[32..34].copy_from_slice(&block_align.to_le_bytes());
        header[34..36].copy_from_slice(&bits_per_sample.to_le_bytes());

        // data sub-chunk
        header[36..40].copy_from_slice(b"data");
        header[40..44].copy_from_slice(&data_size.to_le_bytes());

        header
    }

    /// Wrap raw 8 kHz mono mu-law bytes in a WAV container.
    pub fn create_mulaw_wav(mulaw_data: &[u8]) -> Vec<u8> {
        let header = create_header(
            mulaw_data.len() as u32,
            FORMAT_MULAW,
            MULAW_SAMPLE_RATE,
            1,
            8,
        );
        let mut wav = Vec::with_capacity(44 + mulaw_data.len());
        wav.extend_from_slice(&header);
        wav.extend_from_slice(mulaw_data);
        wav
    }
}
