//! Twilio REST call-control client.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::base::{
    CallControl, CallControlError, CallControlResult, CallDetails, CallUpdate, OutboundCall,
};

/// Default Twilio REST API base URL
pub const DEFAULT_TWILIO_API_URL: &str = "https://api.twilio.com";

#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Overridable so tests can point the client at a mock server
    pub api_url: String,
}

impl TwilioConfig {
    pub fn new(account_sid: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            api_url: DEFAULT_TWILIO_API_URL.to_string(),
        }
    }

    fn calls_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Calls.json",
            self.api_url.trim_end_matches('/'),
            self.account_sid
        )
    }

    fn call_url(&self, call_sid: &str) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Calls/{}.json",
            self.api_url.trim_end_matches('/'),
            self.account_sid,
            call_sid
        )
    }
}

/// Call resource fields returned by the API.
#[derive(Debug, Deserialize)]
struct CallResource {
    sid: String,
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    to: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TwilioErrorBody {
    #[serde(default)]
    code: Option<u32>,
    message: String,
}

pub struct TwilioCallControl {
    config: TwilioConfig,
    http_client: Client,
}

impl TwilioCallControl {
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            config,
            http_client: Client::new(),
        }
    }

    pub fn with_client(config: TwilioConfig, http_client: Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    async fn check(response: Response) -> CallControlResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<TwilioErrorBody>(&body) {
            Ok(err) => match err.code {
                Some(code) => format!("{} (code {})", err.message, code),
                None => err.message,
            },
            Err(_) => body,
        };

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                CallControlError::AuthenticationFailed(message)
            }
            StatusCode::NOT_FOUND => CallControlError::NotFound(message),
            _ => CallControlError::ProviderError {
                status: status.as_u16(),
                message,
            },
        })
    }

    async fn parse_call(response: Response) -> CallControlResult<CallResource> {
        response
            .json::<CallResource>()
            .await
            .map_err(|e| CallControlError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl CallControl for TwilioCallControl {
    async fn fetch_call(&self, call_sid: &str) -> CallControlResult<CallDetails> {
        let response = self
            .http_client
            .get(self.config.call_url(call_sid))
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .send()
            .await
            .map_err(|e| CallControlError::NetworkError(e.to_string()))?;

        let call = Self::parse_call(Self::check(response).await?).await?;
        let from = call.from.ok_or_else(|| {
            CallControlError::InvalidResponse(format!("Call {} has no originating number", call.sid))
        })?;

        Ok(CallDetails {
            sid: call.sid,
            from,
            to: call.to,
            status: call.status,
        })
    }

    async fn update_call(&self, call_sid: &str, update: CallUpdate) -> CallControlResult<()> {
        let form: Vec<(&str, String)> = match update {
            CallUpdate::Completed => vec![("Status", "completed".to_string())],
            CallUpdate::Twiml(twiml) => vec![("Twiml", twiml)],
        };

        let response = self
            .http_client
            .post(self.config.call_url(call_sid))
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&form)
            .send()
            .await
            .map_err(|e| CallControlError::NetworkError(e.to_string()))?;

        Self::check(response).await?;
        debug!(call_sid = %call_sid, "Call updated");
        Ok(())
    }

    async fn create_call(&self, call: OutboundCall) -> CallControlResult<String> {
        let response = self
            .http_client
            .post(self.config.calls_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[
                ("To", call.to.as_str()),
                ("From", call.from.as_str()),
                ("Twiml", call.twiml.as_str()),
            ])
            .send()
            .await
            .map_err(|e| CallControlError::NetworkError(e.to_string()))?;

        let created = Self::parse_call(Self::check(response).await?).await?;
        debug!(call_sid = %created.sid, to = %call.to, "Outbound call created");
        Ok(created.sid)
    }
}
