//! Zoho Desk ticket API and its OAuth refresh-token grant.

mod desk;
pub mod messages;
mod oauth;

pub use desk::ZohoDeskClient;
pub use oauth::ZohoOAuthRefresher;

pub const DEFAULT_ZOHO_DESK_URL: &str = "https://desk.zoho.com";
pub const DEFAULT_ZOHO_ACCOUNTS_URL: &str = "https://accounts.zoho.com";

#[derive(Debug, Clone)]
pub struct ZohoConfig {
    pub api_url: String,
    pub accounts_url: String,
    pub org_id: String,
    pub department_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl Default for ZohoConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_ZOHO_DESK_URL.to_string(),
            accounts_url: DEFAULT_ZOHO_ACCOUNTS_URL.to_string(),
            org_id: String::new(),
            department_id: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            refresh_token: String::new(),
        }
    }
}
