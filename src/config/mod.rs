//! Configuration module for the call bridge gateway
//!
//! This module handles server configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable helpers
//! - `merge`: Merging YAML and environment configurations, plus validation
//!
//! # Example
//! ```rust,no_run
//! use callbridge_gateway::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::time::Duration;

mod env;
mod merge;
mod validation;
mod yaml;

use crate::core::helpdesk::{AccessToken, SubjectConfig, ZohoConfig};
use crate::core::realtime::{OpenAIRealtimeConfig, SessionSettings};
use crate::core::session::CallSettings;
use crate::core::telephony::{Greeting, TransferSettings, TwilioConfig};
use crate::core::transcript_log::{TranscriptLog, TranscriptLogMode};
use crate::core::transcription::WhisperConfig;
use crate::core::triggers::TriggerPhrases;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5050;

/// TLS configuration for HTTPS and WSS
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// Path to the TLS certificate file (PEM format)
    pub cert_path: PathBuf,
    /// Path to the TLS private key file (PEM format)
    pub key_path: PathBuf,
}

/// Server configuration
///
/// Contains all configuration needed to run the gateway:
/// - Server settings (host, port, TLS, CORS)
/// - OpenAI realtime, transcription and subject-extraction settings
/// - Twilio credentials
/// - Call behaviour (duration cap, transfer, barge-in lock, greetings)
/// - Zoho Desk credentials
/// - Transcript log location
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,
    pub tls: Option<TlsConfig>,
    /// CORS allowed origins (comma-separated list or "*" for all)
    pub cors_allowed_origins: Option<String>,

    // OpenAI
    pub openai_api_key: String,
    pub realtime_url: String,
    pub realtime_model: String,
    pub voice: String,
    pub instructions: String,
    pub temperature: f32,
    pub vad_threshold: f32,
    pub silence_duration_ms: u32,
    pub transcription_url: String,
    pub transcription_model: String,
    pub subject_url: String,
    pub subject_model: String,

    // Twilio
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub twilio_api_url: String,

    // Call behaviour
    pub max_call_duration_secs: u64,
    pub transfer_delay_ms: u64,
    pub interruption_lock_ms: u64,
    pub agent_number: String,
    pub fallback_email: String,
    pub hold_music_url: String,
    pub hold_message: String,
    pub agent_greeting: String,
    pub welcome_message: String,
    pub connected_message: String,
    pub say_voice: String,
    pub end_call_phrases: Vec<String>,
    pub transfer_phrases: Vec<String>,

    // Zoho Desk
    pub zoho_desk_url: String,
    pub zoho_accounts_url: String,
    pub zoho_org_id: String,
    pub zoho_department_id: String,
    pub zoho_client_id: String,
    pub zoho_client_secret: String,
    pub zoho_refresh_token: String,
    pub zoho_access_token: Option<String>,
    /// Epoch milliseconds
    pub zoho_access_token_expiry_ms: Option<u64>,

    // Transcript log
    pub transcript_log_path: PathBuf,
    pub transcript_log_mode: TranscriptLogMode,
}

/// Zeroize all secret fields when ServerConfig is dropped.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        self.openai_api_key.zeroize();
        self.twilio_auth_token.zeroize();
        self.zoho_client_secret.zeroize();
        self.zoho_refresh_token.zeroize();
        if let Some(ref mut token) = self.zoho_access_token {
            token.zeroize();
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// `.env` is loaded in `main` before this is called, so actual
    /// environment variables override `.env` values.
    ///
    /// # Errors
    /// Returns an error if a variable has an invalid format or a required
    /// credential (`OPENAI_API_KEY`, `TWILIO_ACCOUNT_SID`,
    /// `TWILIO_AUTH_TOKEN`) is missing.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        merge::merge_config(None)
    }

    /// Load configuration from a YAML file with environment variable base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - A required credential is missing after merging
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let yaml_config = yaml::YamlConfig::from_file(path)?;
        merge::merge_config(Some(yaml_config))
    }

    /// Get the server address as a string
    ///
    /// Returns the address in the format "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if TLS is enabled
    pub fn is_tls_enabled(&self) -> bool {
        self.tls.is_some()
    }

    pub fn max_call_duration(&self) -> Duration {
        Duration::from_secs(self.max_call_duration_secs)
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            voice: self.voice.clone(),
            instructions: self.instructions.clone(),
            temperature: self.temperature,
            vad_threshold: self.vad_threshold,
            silence_duration_ms: self.silence_duration_ms,
        }
    }

    pub fn transfer_settings(&self) -> TransferSettings {
        TransferSettings {
            agent_number: self.agent_number.clone(),
            hold_music_url: self.hold_music_url.clone(),
            hold_message: self.hold_message.clone(),
            agent_greeting: self.agent_greeting.clone(),
            voice: self.say_voice.clone(),
        }
    }

    pub fn call_settings(&self) -> CallSettings {
        CallSettings {
            session: self.session_settings(),
            triggers: TriggerPhrases::new(
                self.end_call_phrases.iter().cloned(),
                self.transfer_phrases.iter().cloned(),
            ),
            transfer: self.transfer_settings(),
            transfer_delay: Duration::from_millis(self.transfer_delay_ms),
            interruption_lock: Duration::from_millis(self.interruption_lock_ms),
            fallback_email: self.fallback_email.clone(),
        }
    }

    pub fn greeting(&self) -> Greeting {
        Greeting {
            voice: self.say_voice.clone(),
            welcome: self.welcome_message.clone(),
            connected: self.connected_message.clone(),
        }
    }

    pub fn realtime_config(&self) -> OpenAIRealtimeConfig {
        OpenAIRealtimeConfig {
            api_key: self.openai_api_key.clone(),
            api_url: self.realtime_url.clone(),
            model: self.realtime_model.clone(),
        }
    }

    pub fn whisper_config(&self) -> WhisperConfig {
        WhisperConfig {
            api_key: self.openai_api_key.clone(),
            api_url: self.transcription_url.clone(),
            model: self.transcription_model.clone(),
        }
    }

    pub fn subject_config(&self) -> SubjectConfig {
        SubjectConfig {
            api_key: self.openai_api_key.clone(),
            api_url: self.subject_url.clone(),
            model: self.subject_model.clone(),
        }
    }

    pub fn twilio_config(&self) -> TwilioConfig {
        TwilioConfig {
            account_sid: self.twilio_account_sid.clone(),
            auth_token: self.twilio_auth_token.clone(),
            api_url: self.twilio_api_url.clone(),
        }
    }

    pub fn zoho_config(&self) -> ZohoConfig {
        ZohoConfig {
            api_url: self.zoho_desk_url.clone(),
            accounts_url: self.zoho_accounts_url.clone(),
            org_id: self.zoho_org_id.clone(),
            department_id: self.zoho_department_id.clone(),
            client_id: self.zoho_client_id.clone(),
            client_secret: self.zoho_client_secret.clone(),
            refresh_token: self.zoho_refresh_token.clone(),
        }
    }

    /// Configured Zoho token to use before the first refresh. A token
    /// without an expiry counts as expired.
    pub fn seed_access_token(&self) -> Option<AccessToken> {
        self.zoho_access_token.as_ref().map(|token| {
            AccessToken::from_epoch_millis(
                token.clone(),
                self.zoho_access_token_expiry_ms.unwrap_or(0),
            )
        })
    }

    pub fn transcript_log(&self) -> TranscriptLog {
        TranscriptLog::new(self.transcript_log_path.clone(), self.transcript_log_mode)
    }
}
