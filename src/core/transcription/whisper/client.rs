use async_trait::async_trait;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use tracing::{debug, info};

use super::messages::{OpenAIErrorResponse, VerboseTranscriptionResponse, wav};
use crate::core::transcript::OfflineSegment;
use crate::core::transcription::base::{
    OfflineTranscriber, TranscriptionError, TranscriptionResult,
};

/// OpenAI audio transcription endpoint.
pub const WHISPER_TRANSCRIPTION_URL: &str = "https://api.openai.com/v1/audio/transcriptions";

pub const DEFAULT_WHISPER_MODEL: &str = "whisper-1";

#[derive(Debug, Clone)]
pub struct WhisperConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
}

impl WhisperConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: WHISPER_TRANSCRIPTION_URL.to_string(),
            model: DEFAULT_WHISPER_MODEL.to_string(),
        }
    }
}

pub struct WhisperTranscriber {
    config: WhisperConfig,
    http_client: Client,
}

impl WhisperTranscriber {
    pub fn new(config: WhisperConfig) -> Self {
        Self {
            config,
            http_client: Client::new(),
        }
    }
}

#[async_trait]
impl OfflineTranscriber for WhisperTranscriber {
    async fn transcribe(&self, audio: &[u8]) -> TranscriptionResult<Vec<OfflineSegment>> {
        let wav_data = wav::create_mulaw_wav(audio);
        debug!(
            audio_bytes = audio.len(),
            wav_bytes = wav_data.len(),
            "Submitting call audio for transcription"
        );

        let file_part = Part::bytes(wav_data)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| TranscriptionError::AudioProcessingError(format!("Invalid MIME type: {e}")))?;

        let form = Form::new()
            .part("file", file_part)
            .text("model", self.config.model.clone())
            .text("response_format", "verbose_json");

        let response = self
            .http_client
            .post(&self.config.api_url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscriptionError::NetworkError(format!("Request failed: {e}")))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| TranscriptionError::NetworkError(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let error_msg = if let Ok(error_response) =
                serde_json::from_str::<OpenAIErrorResponse>(&response_text)
            {
                format!(
                    "OpenAI API error: {} ({})",
                    error_response.error.message, error_response.error.error_type
                )
            } else {
                format!("OpenAI API error ({}): {}", status, response_text)
            };

            return Err(if status.as_u16() == 401 {
                TranscriptionError::AuthenticationFailed(error_msg)
            } else {
                TranscriptionError::ProviderError(error_msg)
            });
        }

        let parsed: VerboseTranscriptionResponse = serde_json::from_str(&response_text)
            .map_err(|e| TranscriptionError::InvalidResponse(e.to_string()))?;

        info!(
            segments = parsed.segments.len(),
            characters = parsed.text.len(),
            "Transcription complete"
        );

        Ok(parsed
            .segments
            .into_iter()
            .map(|segment| OfflineSegment {
                text: segment.text,
                start_secs: segment.start,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transcriber_for(server: &MockServer) -> WhisperTranscriber {
        let mut config = WhisperConfig::new("sk-test");
        config.api_url = format!("{}/v1/audio/transcriptions", server.uri());
        WhisperTranscriber::new(config)
    }

    #[tokio::test]
    async fn test_transcribe_returns_segments() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/audio/transcriptions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_string_contains("verbose_json"))
            .and(body_string_contains("whisper-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "text": "Hi. My router is down.",
                "segments": [
                    {"id": 0, "start": 0.0, "end": 0.8, "text": " Hi."},
                    {"id": 1, "start": 2.5, "end": 4.0, "text": " My router is down."}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        // Multipart body must stay valid UTF-8 for the body matchers
        let segments = transcriber_for(&server)
            .transcribe(&[0x7F; 60])
            .await
            .unwrap();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].start_secs, 2.5);
        assert_eq!(segments[1].text, " My router is down.");
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "Incorrect API key", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let err = transcriber_for(&server).transcribe(&[0xFF; 8]).await.unwrap_err();
        assert!(matches!(err, TranscriptionError::AuthenticationFailed(ref m) if m.contains("Incorrect API key")));
    }
}
