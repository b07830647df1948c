//! Post-call helpdesk ticketing.

pub mod base;
pub mod finalizer;
pub mod subject;
pub mod zoho;

pub use base::{
    AccessToken, HelpdeskApi, HelpdeskError, HelpdeskResult, OAuthRefresher, SubjectError,
    SubjectExtractor, TicketCreationError, TicketRecord, TicketRequest,
};
pub use finalizer::{AccessTokenCache, MAX_TOKEN_RETRIES, TicketFinalizer};
pub use subject::{OpenAISubjectExtractor, SubjectConfig};
pub use zoho::{ZohoConfig, ZohoDeskClient, ZohoOAuthRefresher};
