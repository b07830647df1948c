//! Media stream message types.
//!
//! The telephony provider sends JSON text frames discriminated by an `event`
//! field. Only `start` and `media` carry data the session acts on; the rest
//! are accepted and ignored.

use base64::prelude::*;
use serde::{Deserialize, Serialize};

// =============================================================================
// Inbound (provider -> gateway)
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum StreamInbound {
    /// First frame on a new connection
    Connected,

    /// Stream metadata; identifies the call
    Start { start: StreamStart },

    /// One chunk of caller audio
    Media { media: InboundMedia },

    /// Playback marker acknowledgement
    Mark,

    /// Provider is about to close the stream
    Stop,

    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamStart {
    pub stream_sid: String,
    pub call_sid: String,
    #[serde(default)]
    pub account_sid: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundMedia {
    /// Base64-encoded 8 kHz mu-law audio
    pub payload: String,
    #[serde(default)]
    pub track: Option<String>,
}

impl InboundMedia {
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64_STANDARD.decode(&self.payload)
    }
}

// =============================================================================
// Outbound (gateway -> provider)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum StreamOutbound {
    /// Play audio to the caller
    Media {
        #[serde(rename = "streamSid")]
        stream_sid: String,
        media: OutboundMedia,
    },

    /// Drop any audio queued for playback
    Clear {
        #[serde(rename = "streamSid")]
        stream_sid: String,
    },

    /// End the media stream
    Stop {
        #[serde(rename = "streamSid")]
        stream_sid: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMedia {
    pub payload: String,
}

impl StreamOutbound {
    pub fn media(stream_sid: &str, payload: impl Into<String>) -> Self {
        StreamOutbound::Media {
            stream_sid: stream_sid.to_string(),
            media: OutboundMedia {
                payload: payload.into(),
            },
        }
    }

    pub fn clear(stream_sid: &str) -> Self {
        StreamOutbound::Clear {
            stream_sid: stream_sid.to_string(),
        }
    }

    pub fn stop(stream_sid: &str) -> Self {
        StreamOutbound::Stop {
            stream_sid: stream_sid.to_string(),
        }
    }
}
