use serde::{Deserialize, Serialize};

/// Error code Zoho returns for a missing, expired or revoked token.
pub const INVALID_OAUTH: &str = "INVALID_OAUTH";

pub const DEFAULT_PRIORITY: &str = "Medium";
pub const DEFAULT_STATUS: &str = "Open";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketBody {
    pub subject: String,
    pub department_id: String,
    pub contact: TicketContact,
    pub description: String,
    pub priority: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TicketContact {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZohoErrorBody {
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// OAuth token endpoint response. Zoho reports failures with a 200 and an
/// `error` field, so every field is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    /// Lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Zoho renders ticket descriptions as HTML.
pub fn html_description(description: &str) -> String {
    description.replace('\n', "<br>")
}
