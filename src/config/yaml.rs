use serde::Deserialize;
use std::path::PathBuf;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Values present in
/// the file override environment variables.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 5050
///   tls:
///     enabled: true
///     cert_path: "/etc/callbridge/cert.pem"
///     key_path: "/etc/callbridge/key.pem"
///
/// openai:
///   api_key: "sk-..."
///   realtime_model: "gpt-4o-realtime-preview-2024-10-01"
///   voice: "alloy"
///   temperature: 0.8
///   instructions: "You are a friendly support assistant."
///   transcription_model: "whisper-1"
///   subject_model: "gpt-4"
///
/// twilio:
///   account_sid: "AC..."
///   auth_token: "..."
///
/// call:
///   max_duration_secs: 600
///   transfer_delay_ms: 6000
///   interruption_lock_ms: 1500
///   agent_number: "+15550001111"
///   fallback_email: "support@example.com"
///   end_call_phrases: ["goodbye", "hang up"]
///
/// zoho:
///   org_id: "123"
///   department_id: "456"
///   client_id: "1000.ABC"
///   client_secret: "..."
///   refresh_token: "1000.xyz"
///
/// transcript_log:
///   path: "transcript.log"
///   mode: "shared"
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub openai: Option<OpenAIYaml>,
    pub twilio: Option<TwilioYaml>,
    pub call: Option<CallYaml>,
    pub zoho: Option<ZohoYaml>,
    pub transcript_log: Option<TranscriptLogYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub tls: Option<TlsYaml>,
    pub cors_allowed_origins: Option<String>,
}

/// TLS configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TlsYaml {
    pub enabled: Option<bool>,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

/// OpenAI endpoints and model parameters
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct OpenAIYaml {
    pub api_key: Option<String>,
    pub realtime_url: Option<String>,
    pub realtime_model: Option<String>,
    pub voice: Option<String>,
    pub instructions: Option<String>,
    pub temperature: Option<f32>,
    pub vad_threshold: Option<f32>,
    pub silence_duration_ms: Option<u32>,
    pub transcription_url: Option<String>,
    pub transcription_model: Option<String>,
    pub subject_url: Option<String>,
    pub subject_model: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TwilioYaml {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub api_url: Option<String>,
}

/// Call behaviour from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CallYaml {
    pub max_duration_secs: Option<u64>,
    pub transfer_delay_ms: Option<u64>,
    pub interruption_lock_ms: Option<u64>,
    pub agent_number: Option<String>,
    pub fallback_email: Option<String>,
    pub hold_music_url: Option<String>,
    pub hold_message: Option<String>,
    pub agent_greeting: Option<String>,
    pub welcome_message: Option<String>,
    pub connected_message: Option<String>,
    pub say_voice: Option<String>,
    pub end_call_phrases: Option<Vec<String>>,
    pub transfer_phrases: Option<Vec<String>>,
}

/// Zoho Desk credentials from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ZohoYaml {
    pub desk_url: Option<String>,
    pub accounts_url: Option<String>,
    pub org_id: Option<String>,
    pub department_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
    /// Seed token used until it expires
    pub access_token: Option<String>,
    /// Seed token expiry, epoch milliseconds
    pub access_token_expiry_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TranscriptLogYaml {
    pub path: Option<String>,
    /// `shared` or `per_call`
    pub mode: Option<String>,
}

impl YamlConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or the YAML is malformed.
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;

        let config: YamlConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse YAML config: {e}"))?;

        Ok(config)
    }
}
