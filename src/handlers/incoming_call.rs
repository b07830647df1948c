//! Incoming-call webhook
//!
//! The telephony provider calls this when a call arrives. The caller's number
//! is parked in the registry until the media stream for the same call starts,
//! and the response tells the provider to greet the caller and open the media
//! stream back to this server.

use axum::{
    extract::{Form, Query, State, rejection::FormRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::session::UNKNOWN_CALLER;
use crate::state::AppState;

/// Webhook parameters, sent as a form body or query string
#[derive(Debug, Default, Deserialize)]
pub struct IncomingCallParams {
    #[serde(rename = "CallSid")]
    pub call_sid: Option<String>,
    #[serde(rename = "From")]
    pub from: Option<String>,
}

/// Answer an incoming call with TwiML that connects the media stream.
pub async fn incoming_call(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<IncomingCallParams>,
    form: Result<Form<IncomingCallParams>, FormRejection>,
) -> Response {
    let body = form.map(|Form(params)| params).unwrap_or_default();

    let call_sid = body.call_sid.or(query.call_sid);
    let from = body
        .from
        .or(query.from)
        .unwrap_or_else(|| UNKNOWN_CALLER.to_string());

    match call_sid.as_deref() {
        Some(call_sid) => {
            info!(call_sid, from = %from, "Incoming call");
            state.store.callers.add_pending(call_sid, &from);
        }
        None => warn!(from = %from, "Incoming call without CallSid"),
    }

    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| state.config.address());

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/xml")],
        state.greeting.twiml(&host),
    )
        .into_response()
}
