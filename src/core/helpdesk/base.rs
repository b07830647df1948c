//! Helpdesk collaborator traits and shared types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};
use thiserror::Error;
use zeroize::Zeroize;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Debug, Error)]
pub enum HelpdeskError {
    /// The access token was rejected; a refresh may fix it
    #[error("Invalid access token: {0}")]
    InvalidToken(String),

    /// Request could not be sent or the response could not be read
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Any other non-success response
    #[error("Provider error ({status}): {message}")]
    ProviderError { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Required settings are missing
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type HelpdeskResult<T> = Result<T, HelpdeskError>;

#[derive(Debug, Error)]
pub enum SubjectError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Empty subject returned")]
    EmptySubject,
}

/// Unrecoverable ticket creation failure.
#[derive(Debug, Error)]
pub enum TicketCreationError {
    #[error("Subject extraction failed: {0}")]
    Subject(#[from] SubjectError),

    #[error("Token refresh failed: {0}")]
    TokenRefresh(#[source] HelpdeskError),

    #[error("Access token rejected after refresh: {0}")]
    TokenRejected(#[source] HelpdeskError),

    #[error("Ticket submission failed: {0}")]
    Submission(#[source] HelpdeskError),
}

// =============================================================================
// Tokens
// =============================================================================

/// OAuth access token with its absolute expiry.
#[derive(Clone)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: SystemTime,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, expires_in: Duration) -> Self {
        Self {
            value: value.into(),
            expires_at: SystemTime::now() + expires_in,
        }
    }

    /// Build from an expiry expressed in milliseconds since the Unix epoch.
    pub fn from_epoch_millis(value: impl Into<String>, expires_at_ms: u64) -> Self {
        Self {
            value: value.into(),
            expires_at: SystemTime::UNIX_EPOCH + Duration::from_millis(expires_at_ms),
        }
    }

    pub fn is_expired(&self) -> bool {
        SystemTime::now() > self.expires_at
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Drop for AccessToken {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}

// =============================================================================
// Tickets
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketRequest {
    pub subject: String,
    pub description: String,
    pub contact_email: String,
}

/// Ticket as returned by the helpdesk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub ticket_number: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

// =============================================================================
// Traits
// =============================================================================

/// Creates tickets with a caller-supplied access token.
#[async_trait]
pub trait HelpdeskApi: Send + Sync {
    /// Returns [`HelpdeskError::InvalidToken`] when the token is rejected.
    async fn create_ticket(
        &self,
        access_token: &str,
        ticket: &TicketRequest,
    ) -> HelpdeskResult<TicketRecord>;
}

/// Exchanges the long-lived refresh token for a new access token.
#[async_trait]
pub trait OAuthRefresher: Send + Sync {
    async fn refresh(&self) -> HelpdeskResult<AccessToken>;
}

/// Summarizes a conversation into a short ticket subject.
#[async_trait]
pub trait SubjectExtractor: Send + Sync {
    async fn extract_subject(&self, conversation: &str) -> Result<String, SubjectError>;
}
