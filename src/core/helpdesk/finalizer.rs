//! Ticket submission with a cached OAuth token.
//!
//! The cached token is reused until it expires. A token the helpdesk rejects
//! is refreshed and the submission retried, at most [`MAX_TOKEN_RETRIES`]
//! times, after which the rejection is returned to the caller.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, warn};

use super::base::{
    AccessToken, HelpdeskApi, HelpdeskError, OAuthRefresher, SubjectExtractor,
    TicketCreationError, TicketRecord, TicketRequest,
};

pub const MAX_TOKEN_RETRIES: usize = 1;

/// Shared access token slot.
#[derive(Debug, Default)]
pub struct AccessTokenCache {
    token: RwLock<Option<AccessToken>>,
}

impl AccessTokenCache {
    pub fn new(seed: Option<AccessToken>) -> Self {
        Self {
            token: RwLock::new(seed),
        }
    }

    /// The cached token value, unless absent or expired.
    pub fn valid(&self) -> Option<String> {
        self.token
            .read()
            .as_ref()
            .filter(|token| !token.is_expired())
            .map(|token| token.value.clone())
    }

    pub fn store(&self, token: AccessToken) -> String {
        let value = token.value.clone();
        *self.token.write() = Some(token);
        value
    }

    pub fn invalidate(&self) {
        *self.token.write() = None;
    }
}

pub struct TicketFinalizer {
    api: Arc<dyn HelpdeskApi>,
    refresher: Arc<dyn OAuthRefresher>,
    subjects: Arc<dyn SubjectExtractor>,
    tokens: AccessTokenCache,
}

impl TicketFinalizer {
    pub fn new(
        api: Arc<dyn HelpdeskApi>,
        refresher: Arc<dyn OAuthRefresher>,
        subjects: Arc<dyn SubjectExtractor>,
        seed_token: Option<AccessToken>,
    ) -> Self {
        Self {
            api,
            refresher,
            subjects,
            tokens: AccessTokenCache::new(seed_token),
        }
    }

    pub fn subjects(&self) -> &Arc<dyn SubjectExtractor> {
        &self.subjects
    }

    /// Derive a subject from the description, then submit.
    pub async fn create_ticket(
        &self,
        description: &str,
        contact_email: &str,
    ) -> Result<TicketRecord, TicketCreationError> {
        let subject = self.subjects.extract_subject(description).await?;
        self.submit_ticket(&subject, description, contact_email)
            .await
    }

    /// Submit a ticket whose subject is already known.
    pub async fn submit_ticket(
        &self,
        subject: &str,
        description: &str,
        contact_email: &str,
    ) -> Result<TicketRecord, TicketCreationError> {
        let request = TicketRequest {
            subject: subject.to_string(),
            description: description.to_string(),
            contact_email: contact_email.to_string(),
        };

        let mut token = match self.tokens.valid() {
            Some(token) => token,
            None => {
                info!("No valid helpdesk token cached, refreshing");
                self.refresh().await?
            }
        };

        let mut retries = 0;
        loop {
            match self.api.create_ticket(&token, &request).await {
                Ok(record) => {
                    info!(
                        ticket_number = ?record.ticket_number,
                        subject = %request.subject,
                        "Helpdesk ticket created"
                    );
                    return Ok(record);
                }
                Err(HelpdeskError::InvalidToken(reason)) if retries < MAX_TOKEN_RETRIES => {
                    warn!(%reason, "Helpdesk rejected access token, refreshing and retrying");
                    self.tokens.invalidate();
                    token = self.refresh().await?;
                    retries += 1;
                }
                Err(e @ HelpdeskError::InvalidToken(_)) => {
                    return Err(TicketCreationError::TokenRejected(e));
                }
                Err(e) => return Err(TicketCreationError::Submission(e)),
            }
        }
    }

    async fn refresh(&self) -> Result<String, TicketCreationError> {
        let token = self
            .refresher
            .refresh()
            .await
            .map_err(TicketCreationError::TokenRefresh)?;
        Ok(self.tokens.store(token))
    }
}
