use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::ZohoConfig;
use super::messages::{
    CreateTicketBody, DEFAULT_PRIORITY, DEFAULT_STATUS, INVALID_OAUTH, TicketContact,
    ZohoErrorBody, html_description,
};
use crate::core::helpdesk::base::{
    HelpdeskApi, HelpdeskError, HelpdeskResult, TicketRecord, TicketRequest,
};

/// Zoho Desk ticket API client.
pub struct ZohoDeskClient {
    config: ZohoConfig,
    http_client: Client,
}

impl ZohoDeskClient {
    pub fn new(config: ZohoConfig) -> Self {
        Self {
            config,
            http_client: Client::new(),
        }
    }

    fn tickets_url(&self) -> String {
        format!("{}/api/v1/tickets", self.config.api_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl HelpdeskApi for ZohoDeskClient {
    async fn create_ticket(
        &self,
        access_token: &str,
        ticket: &TicketRequest,
    ) -> HelpdeskResult<TicketRecord> {
        if self.config.department_id.is_empty() {
            return Err(HelpdeskError::InvalidConfiguration(
                "Department ID is missing".to_string(),
            ));
        }

        let body = CreateTicketBody {
            subject: ticket.subject.clone(),
            department_id: self.config.department_id.clone(),
            contact: TicketContact {
                email: ticket.contact_email.clone(),
            },
            description: html_description(&ticket.description),
            priority: DEFAULT_PRIORITY.to_string(),
            status: DEFAULT_STATUS.to_string(),
        };

        debug!(subject = %body.subject, department_id = %body.department_id, "Creating helpdesk ticket");

        let response = self
            .http_client
            .post(self.tickets_url())
            .header("Authorization", format!("Zoho-oauthtoken {access_token}"))
            .header("orgId", &self.config.org_id)
            .json(&body)
            .send()
            .await
            .map_err(|e| HelpdeskError::NetworkError(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| HelpdeskError::NetworkError(e.to_string()))?;

        if status.is_success() {
            return serde_json::from_str::<TicketRecord>(&text)
                .map_err(|e| HelpdeskError::InvalidResponse(e.to_string()));
        }

        let error = serde_json::from_str::<ZohoErrorBody>(&text).ok();
        let code = error.as_ref().and_then(|e| e.error_code.clone());
        let message = error
            .and_then(|e| e.message)
            .unwrap_or_else(|| text.clone());

        if code.as_deref() == Some(INVALID_OAUTH) || status == StatusCode::UNAUTHORIZED {
            return Err(HelpdeskError::InvalidToken(message));
        }

        Err(HelpdeskError::ProviderError {
            status: status.as_u16(),
            message: match code {
                Some(code) => format!("{code}: {message}"),
                None => message,
            },
        })
    }
}
