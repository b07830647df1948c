//! OpenAI Realtime API connector.
//!
//! Phone calls use G.711 u-law at 8kHz in both directions, so the session
//! is configured with `g711_ulaw` input and output formats and the caller's
//! base64 payloads are forwarded untouched.

mod client;
mod config;

pub use client::OpenAIRealtimeConnector;
pub use config::{
    DEFAULT_INSTRUCTIONS, DEFAULT_REALTIME_MODEL, DEFAULT_SILENCE_DURATION_MS, DEFAULT_TEMPERATURE,
    DEFAULT_VAD_THRESHOLD, DEFAULT_VOICE, OPENAI_REALTIME_URL, OpenAIRealtimeConfig,
    SessionSettings,
};
