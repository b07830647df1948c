//! Route configuration
//!
//! - `api` - Public health check
//! - `telephony` - Incoming-call webhook and media stream WebSocket

pub mod api;
pub mod telephony;

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// All routes with state applied
pub fn create_router(state: Arc<AppState>) -> Router {
    api::create_api_router()
        .merge(telephony::create_telephony_router())
        .with_state(state)
}
