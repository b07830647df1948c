//! Merge YAML values over environment variables and defaults.

use std::error::Error;
use std::path::PathBuf;

use super::env;
use super::validation;
use super::yaml::{
    CallYaml, OpenAIYaml, ServerYaml, TlsYaml, TranscriptLogYaml, TwilioYaml, YamlConfig, ZohoYaml,
};
use super::{DEFAULT_HOST, DEFAULT_PORT, ServerConfig, TlsConfig};
use crate::core::helpdesk::subject::{CHAT_COMPLETIONS_URL, DEFAULT_SUBJECT_MODEL};
use crate::core::helpdesk::zoho::{DEFAULT_ZOHO_ACCOUNTS_URL, DEFAULT_ZOHO_DESK_URL};
use crate::core::realtime::openai::{
    DEFAULT_INSTRUCTIONS, DEFAULT_REALTIME_MODEL, DEFAULT_SILENCE_DURATION_MS, DEFAULT_TEMPERATURE,
    DEFAULT_VAD_THRESHOLD, DEFAULT_VOICE, OPENAI_REALTIME_URL,
};
use crate::core::session::{DEFAULT_FALLBACK_EMAIL, DEFAULT_INTERRUPTION_LOCK, DEFAULT_TRANSFER_DELAY};
use crate::core::telephony::greeting::{DEFAULT_CONNECTED_MESSAGE, DEFAULT_WELCOME_MESSAGE};
use crate::core::telephony::transfer::{
    DEFAULT_AGENT_GREETING, DEFAULT_AGENT_NUMBER, DEFAULT_HOLD_MESSAGE, DEFAULT_HOLD_MUSIC_URL,
};
use crate::core::telephony::twilio::DEFAULT_TWILIO_API_URL;
use crate::core::telephony::twiml::DEFAULT_SAY_VOICE;
use crate::core::timer::DEFAULT_MAX_CALL_DURATION;
use crate::core::transcript_log::{DEFAULT_TRANSCRIPT_LOG_PATH, TranscriptLogMode};
use crate::core::transcription::whisper::{DEFAULT_WHISPER_MODEL, WHISPER_TRANSCRIPTION_URL};
use crate::core::triggers::{DEFAULT_END_CALL_PHRASES, DEFAULT_TRANSFER_PHRASES};

/// YAML value, else environment value, else default.
fn pick<T>(yaml: Option<T>, env: Option<T>, default: impl FnOnce() -> T) -> T {
    yaml.or(env).unwrap_or_else(default)
}

fn pick_string(yaml: Option<String>, env_name: &str, default: &str) -> String {
    pick(yaml, env::var(env_name), || default.to_string())
}

fn phrases(defaults: &[&str]) -> Vec<String> {
    defaults.iter().map(|p| p.to_string()).collect()
}

/// Build the final configuration.
///
/// Environment variables form the base layer; values from `yaml` (when
/// given) override them. The merged result is validated before it is
/// returned.
pub fn merge_config(yaml: Option<YamlConfig>) -> Result<ServerConfig, Box<dyn Error>> {
    let yaml = yaml.unwrap_or_default();
    let server = yaml.server.unwrap_or_default();
    let openai = yaml.openai.unwrap_or_default();
    let twilio = yaml.twilio.unwrap_or_default();
    let call = yaml.call.unwrap_or_default();
    let zoho = yaml.zoho.unwrap_or_default();
    let transcript_log = yaml.transcript_log.unwrap_or_default();

    let ServerYaml {
        host,
        port,
        tls,
        cors_allowed_origins,
    } = server;
    let tls = merge_tls(tls.unwrap_or_default())?;

    let OpenAIYaml {
        api_key: openai_api_key,
        realtime_url,
        realtime_model,
        voice,
        instructions,
        temperature,
        vad_threshold,
        silence_duration_ms,
        transcription_url,
        transcription_model,
        subject_url,
        subject_model,
    } = openai;

    let TwilioYaml {
        account_sid,
        auth_token,
        api_url: twilio_api_url,
    } = twilio;

    let CallYaml {
        max_duration_secs,
        transfer_delay_ms,
        interruption_lock_ms,
        agent_number,
        fallback_email,
        hold_music_url,
        hold_message,
        agent_greeting,
        welcome_message,
        connected_message,
        say_voice,
        end_call_phrases,
        transfer_phrases,
    } = call;

    let ZohoYaml {
        desk_url,
        accounts_url,
        org_id,
        department_id,
        client_id,
        client_secret,
        refresh_token,
        access_token,
        access_token_expiry_ms,
    } = zoho;

    let TranscriptLogYaml {
        path: log_path,
        mode: log_mode,
    } = transcript_log;

    let openai_api_key = openai_api_key.or_else(|| env::var("OPENAI_API_KEY"));
    let twilio_account_sid = account_sid.or_else(|| env::var("TWILIO_ACCOUNT_SID"));
    let twilio_auth_token = auth_token.or_else(|| env::var("TWILIO_AUTH_TOKEN"));
    validation::validate_required(&[
        ("OPENAI_API_KEY", openai_api_key.as_deref()),
        ("TWILIO_ACCOUNT_SID", twilio_account_sid.as_deref()),
        ("TWILIO_AUTH_TOKEN", twilio_auth_token.as_deref()),
    ])?;

    let transcript_log_mode = match log_mode.or_else(|| env::var("TRANSCRIPT_LOG_MODE")) {
        Some(raw) => raw.parse::<TranscriptLogMode>()?,
        None => TranscriptLogMode::default(),
    };

    let config = ServerConfig {
        host: pick_string(host, "HOST", DEFAULT_HOST),
        port: pick(port, env::parse("PORT")?, || DEFAULT_PORT),
        tls,
        cors_allowed_origins: cors_allowed_origins.or_else(|| env::var("CORS_ALLOWED_ORIGINS")),

        openai_api_key: openai_api_key.unwrap_or_default(),
        realtime_url: pick_string(realtime_url, "OPENAI_REALTIME_URL", OPENAI_REALTIME_URL),
        realtime_model: pick_string(
            realtime_model,
            "OPENAI_REALTIME_MODEL",
            DEFAULT_REALTIME_MODEL,
        ),
        voice: pick_string(voice, "OPENAI_VOICE", DEFAULT_VOICE),
        instructions: pick_string(instructions, "OPENAI_INSTRUCTIONS", DEFAULT_INSTRUCTIONS),
        temperature: pick(temperature, env::parse("OPENAI_TEMPERATURE")?, || {
            DEFAULT_TEMPERATURE
        }),
        vad_threshold: pick(vad_threshold, env::parse("VAD_THRESHOLD")?, || {
            DEFAULT_VAD_THRESHOLD
        }),
        silence_duration_ms: pick(
            silence_duration_ms,
            env::parse("VAD_SILENCE_DURATION_MS")?,
            || DEFAULT_SILENCE_DURATION_MS,
        ),
        transcription_url: pick_string(
            transcription_url,
            "WHISPER_API_URL",
            WHISPER_TRANSCRIPTION_URL,
        ),
        transcription_model: pick_string(
            transcription_model,
            "WHISPER_MODEL",
            DEFAULT_WHISPER_MODEL,
        ),
        subject_url: pick_string(subject_url, "SUBJECT_API_URL", CHAT_COMPLETIONS_URL),
        subject_model: pick_string(subject_model, "SUBJECT_MODEL", DEFAULT_SUBJECT_MODEL),

        twilio_account_sid: twilio_account_sid.unwrap_or_default(),
        twilio_auth_token: twilio_auth_token.unwrap_or_default(),
        twilio_api_url: pick_string(twilio_api_url, "TWILIO_API_URL", DEFAULT_TWILIO_API_URL),

        max_call_duration_secs: pick(
            max_duration_secs,
            env::parse("MAX_CALL_DURATION_SECS")?,
            || DEFAULT_MAX_CALL_DURATION.as_secs(),
        ),
        transfer_delay_ms: pick(transfer_delay_ms, env::parse("TRANSFER_DELAY_MS")?, || {
            DEFAULT_TRANSFER_DELAY.as_millis() as u64
        }),
        interruption_lock_ms: pick(
            interruption_lock_ms,
            env::parse("INTERRUPTION_LOCK_MS")?,
            || DEFAULT_INTERRUPTION_LOCK.as_millis() as u64,
        ),
        agent_number: pick_string(agent_number, "AGENT_NUMBER", DEFAULT_AGENT_NUMBER),
        fallback_email: pick_string(fallback_email, "FALLBACK_EMAIL", DEFAULT_FALLBACK_EMAIL),
        hold_music_url: pick_string(hold_music_url, "HOLD_MUSIC_URL", DEFAULT_HOLD_MUSIC_URL),
        hold_message: pick_string(hold_message, "HOLD_MESSAGE", DEFAULT_HOLD_MESSAGE),
        agent_greeting: pick_string(agent_greeting, "AGENT_GREETING", DEFAULT_AGENT_GREETING),
        welcome_message: pick_string(welcome_message, "WELCOME_MESSAGE", DEFAULT_WELCOME_MESSAGE),
        connected_message: pick_string(
            connected_message,
            "CONNECTED_MESSAGE",
            DEFAULT_CONNECTED_MESSAGE,
        ),
        say_voice: pick_string(say_voice, "SAY_VOICE", DEFAULT_SAY_VOICE),
        end_call_phrases: pick(end_call_phrases, env::list("END_CALL_PHRASES"), || {
            phrases(DEFAULT_END_CALL_PHRASES)
        }),
        transfer_phrases: pick(transfer_phrases, env::list("TRANSFER_PHRASES"), || {
            phrases(DEFAULT_TRANSFER_PHRASES)
        }),

        zoho_desk_url: pick_string(desk_url, "ZOHO_DESK_URL", DEFAULT_ZOHO_DESK_URL),
        zoho_accounts_url: pick_string(accounts_url, "ZOHO_ACCOUNTS_URL", DEFAULT_ZOHO_ACCOUNTS_URL),
        zoho_org_id: pick_string(org_id, "ZOHO_ORG_ID", ""),
        zoho_department_id: pick_string(department_id, "ZOHO_DEPARTMENT_ID", ""),
        zoho_client_id: pick_string(client_id, "ZOHO_CLIENT_ID", ""),
        zoho_client_secret: pick_string(client_secret, "ZOHO_CLIENT_SECRET", ""),
        zoho_refresh_token: pick_string(refresh_token, "ZOHO_REFRESH_TOKEN", ""),
        zoho_access_token: access_token.or_else(|| env::var("ZOHO_ACCESS_TOKEN")),
        zoho_access_token_expiry_ms: match access_token_expiry_ms {
            Some(expiry) => Some(expiry),
            None => env::parse("ZOHO_ACCESS_TOKEN_EXPIRY")?,
        },

        transcript_log_path: PathBuf::from(pick_string(
            log_path,
            "TRANSCRIPT_LOG_PATH",
            DEFAULT_TRANSCRIPT_LOG_PATH,
        )),
        transcript_log_mode,
    };

    Ok(config)
}

/// TLS is on when both paths are present, unless explicitly disabled.
fn merge_tls(yaml: TlsYaml) -> Result<Option<TlsConfig>, Box<dyn Error>> {
    let enabled = match yaml.enabled {
        Some(enabled) => Some(enabled),
        None => env::flag("TLS_ENABLED")?,
    };
    let cert_path = yaml.cert_path.or_else(|| env::var("TLS_CERT_PATH"));
    let key_path = yaml.key_path.or_else(|| env::var("TLS_KEY_PATH"));

    validation::validate_tls(enabled, cert_path.as_deref(), key_path.as_deref())?;

    match (enabled, cert_path, key_path) {
        (Some(false), _, _) => Ok(None),
        (_, Some(cert), Some(key)) => Ok(Some(TlsConfig {
            cert_path: PathBuf::from(cert),
            key_path: PathBuf::from(key),
        })),
        _ => Ok(None),
    }
}
