use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::info;

use super::ZohoConfig;
use super::messages::TokenResponse;
use crate::core::helpdesk::base::{AccessToken, HelpdeskError, HelpdeskResult, OAuthRefresher};

/// Refresh-token grant against the Zoho accounts server.
pub struct ZohoOAuthRefresher {
    config: ZohoConfig,
    http_client: Client,
}

impl ZohoOAuthRefresher {
    pub fn new(config: ZohoConfig) -> Self {
        Self {
            config,
            http_client: Client::new(),
        }
    }

    fn token_url(&self) -> String {
        format!(
            "{}/oauth/v2/token",
            self.config.accounts_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl OAuthRefresher for ZohoOAuthRefresher {
    async fn refresh(&self) -> HelpdeskResult<AccessToken> {
        let response = self
            .http_client
            .post(self.token_url())
            .query(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("refresh_token", self.config.refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| HelpdeskError::NetworkError(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| HelpdeskError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            return Err(HelpdeskError::ProviderError {
                status: status.as_u16(),
                message: text,
            });
        }

        let body: TokenResponse = serde_json::from_str(&text)
            .map_err(|e| HelpdeskError::InvalidResponse(e.to_string()))?;

        let Some(access_token) = body.access_token.filter(|t| !t.is_empty()) else {
            return Err(HelpdeskError::InvalidResponse(format!(
                "No access token received: {}",
                body.error.unwrap_or_else(|| "missing access_token".to_string())
            )));
        };

        let expires_in = Duration::from_secs(body.expires_in.unwrap_or(0));
        info!(expires_in_secs = expires_in.as_secs(), "Refreshed helpdesk access token");

        Ok(AccessToken::new(access_token, expires_in))
    }
}
