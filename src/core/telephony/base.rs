//! Call-control abstraction.
//!
//! The session only needs three operations from the telephony provider:
//! look up a live call, update it (complete it or replace its instructions),
//! and originate a new outbound leg.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CallControlError {
    /// Request could not be sent or the response could not be read
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Provider rejected the credentials
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Call does not exist or is no longer reachable
    #[error("Call not found: {0}")]
    NotFound(String),

    /// Any other non-success response
    #[error("Provider error ({status}): {message}")]
    ProviderError { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

pub type CallControlResult<T> = Result<T, CallControlError>;

/// Change requested for a live call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallUpdate {
    /// Hang the call up.
    Completed,
    /// Replace the call's current instructions with a TwiML document.
    Twiml(String),
}

/// The subset of call metadata the gateway reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallDetails {
    pub sid: String,
    pub from: String,
    pub to: Option<String>,
    pub status: Option<String>,
}

/// A new outbound leg.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundCall {
    pub to: String,
    pub from: String,
    pub twiml: String,
}

#[async_trait]
pub trait CallControl: Send + Sync {
    async fn fetch_call(&self, call_sid: &str) -> CallControlResult<CallDetails>;

    async fn update_call(&self, call_sid: &str, update: CallUpdate) -> CallControlResult<()>;

    /// Originate a call and return the new call identifier.
    async fn create_call(&self, call: OutboundCall) -> CallControlResult<String>;
}
