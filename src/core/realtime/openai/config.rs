//! OpenAI Realtime API configuration types.

use serde::{Deserialize, Serialize};

use crate::core::realtime::messages::{G711_ULAW, SessionConfig, TurnDetection};

/// OpenAI Realtime API WebSocket endpoint.
pub const OPENAI_REALTIME_URL: &str = "wss://api.openai.com/v1/realtime";

/// Default realtime model.
pub const DEFAULT_REALTIME_MODEL: &str = "gpt-4o-realtime-preview-2024-10-01";

pub const DEFAULT_VOICE: &str = "alloy";

pub const DEFAULT_TEMPERATURE: f32 = 0.8;

pub const DEFAULT_INSTRUCTIONS: &str = "You are a friendly technical support voice assistant. \
Help the caller describe their issue clearly and concisely. When the caller asks for a human, \
tell them you will transfer them to one of our human representatives and ask them to please hold. \
When the caller is finished, thank them and say goodbye.";

/// Server VAD activation threshold.
pub const DEFAULT_VAD_THRESHOLD: f32 = 0.8;

/// Server VAD silence before a turn ends.
pub const DEFAULT_SILENCE_DURATION_MS: u32 = 400;

/// Connection parameters for one realtime socket.
#[derive(Debug, Clone)]
pub struct OpenAIRealtimeConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
}

impl OpenAIRealtimeConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: OPENAI_REALTIME_URL.to_string(),
            model: DEFAULT_REALTIME_MODEL.to_string(),
        }
    }
}

/// Per-call session parameters sent once in `session.update`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    pub voice: String,
    pub instructions: String,
    pub temperature: f32,
    pub vad_threshold: f32,
    pub silence_duration_ms: u32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            voice: DEFAULT_VOICE.to_string(),
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            vad_threshold: DEFAULT_VAD_THRESHOLD,
            silence_duration_ms: DEFAULT_SILENCE_DURATION_MS,
        }
    }
}

impl SessionSettings {
    /// Phone audio is mu-law in both directions.
    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig {
            modalities: Some(vec!["text".to_string(), "audio".to_string()]),
            instructions: Some(self.instructions.clone()),
            voice: Some(self.voice.clone()),
            input_audio_format: Some(G711_ULAW.to_string()),
            output_audio_format: Some(G711_ULAW.to_string()),
            turn_detection: Some(TurnDetection::ServerVad {
                threshold: Some(self.vad_threshold),
                prefix_padding_ms: None,
                silence_duration_ms: Some(self.silence_duration_ms),
            }),
            temperature: Some(self.temperature),
        }
    }
}
