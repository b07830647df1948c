//! Telephony route configuration
//!
//! # Endpoints
//!
//! `GET|POST /incoming-call` - Webhook answering a new call with TwiML
//!
//! `GET /media-stream` - WebSocket upgrade for the call's media stream
//!
//! # Protocol
//!
//! The provider sends JSON text frames tagged by `event`:
//! `connected`, `start`, `media`, `mark`, `stop`. The server answers with
//! `media` (assistant audio), `clear` (barge-in) and `stop` (end of call).

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::core::telephony::MEDIA_STREAM_PATH;
use crate::handlers::{incoming_call, media_stream_handler};
use crate::state::AppState;
use std::sync::Arc;

/// Create the telephony router
pub fn create_telephony_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/incoming-call", get(incoming_call).post(incoming_call))
        .route(MEDIA_STREAM_PATH, get(media_stream_handler))
        .layer(TraceLayer::new_for_http())
}
