//! Base types for the realtime speech model connection.
//!
//! A connector opens one socket per call and hands back a [`RealtimeLink`]:
//! a command sender and an event receiver backed by a background pump task.
//! Dropping the command sender closes the socket. When the socket closes
//! from the remote side the event receiver yields `None`.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use super::messages::{ClientEvent, ServerEvent};

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during realtime operations.
#[derive(Debug, Error)]
pub enum RealtimeError {
    /// Connection to the provider failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Result type for realtime operations.
pub type RealtimeResult<T> = Result<T, RealtimeError>;

/// Channel capacity for commands and events on one connection.
pub const LINK_CHANNEL_CAPACITY: usize = 1024;

/// Both halves of an open realtime connection.
pub struct RealtimeLink {
    pub commands: mpsc::Sender<ClientEvent>,
    pub events: mpsc::Receiver<ServerEvent>,
}

impl RealtimeLink {
    /// Create a link plus the far ends of its channels. Connector
    /// implementations and tests drive the far ends.
    pub fn pair() -> (Self, mpsc::Receiver<ClientEvent>, mpsc::Sender<ServerEvent>) {
        let (command_tx, command_rx) = mpsc::channel(LINK_CHANNEL_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel(LINK_CHANNEL_CAPACITY);
        (
            Self {
                commands: command_tx,
                events: event_rx,
            },
            command_rx,
            event_tx,
        )
    }
}

/// Opens realtime model connections.
#[async_trait]
pub trait RealtimeConnector: Send + Sync {
    async fn connect(&self) -> RealtimeResult<RealtimeLink>;
}
