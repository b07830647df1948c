//! Realtime speech model connection.

pub mod base;
pub mod messages;
pub mod openai;

pub use base::{
    LINK_CHANNEL_CAPACITY, RealtimeConnector, RealtimeError, RealtimeLink, RealtimeResult,
};
pub use messages::{ClientEvent, ServerEvent, SessionConfig, TurnDetection};
pub use openai::{OpenAIRealtimeConfig, OpenAIRealtimeConnector, SessionSettings};
