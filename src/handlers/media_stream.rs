//! Media stream WebSocket handler
//!
//! The telephony provider opens this socket after the incoming-call webhook
//! answers. Each connection drives one [`CallSession`] until the provider
//! closes the stream.

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt, future};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::core::session::CallSession;
use crate::core::telephony::{StreamInbound, StreamOutbound};
use crate::state::AppState;

/// Optimized channel buffer size for audio workloads
const CHANNEL_BUFFER_SIZE: usize = 1024;

/// Maximum WebSocket frame size (1 MB)
const MAX_WS_FRAME_SIZE: usize = 1024 * 1024;

/// Maximum WebSocket message size (1 MB)
const MAX_WS_MESSAGE_SIZE: usize = 1024 * 1024;

#[derive(Debug, Default, Deserialize)]
pub struct MediaStreamParams {
    /// Caller number to use when the webhook did not record one
    pub from: Option<String>,
}

/// Media stream WebSocket handler
///
/// Upgrades the HTTP connection to a WebSocket carrying the provider's JSON
/// media events.
pub async fn media_stream_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(params): Query<MediaStreamParams>,
) -> Response {
    let connection_id = Uuid::new_v4();
    info!(%connection_id, "Media stream connection upgrade requested");

    ws.max_frame_size(MAX_WS_FRAME_SIZE)
        .max_message_size(MAX_WS_MESSAGE_SIZE)
        .on_upgrade(move |socket| handle_media_stream(socket, state, params.from, connection_id))
}

async fn handle_media_stream(
    socket: WebSocket,
    state: Arc<AppState>,
    caller_hint: Option<String>,
    connection_id: Uuid,
) {
    info!(%connection_id, "Media stream connected");

    let (mut sender, receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<StreamOutbound>(CHANNEL_BUFFER_SIZE);

    // Sender task for outgoing messages
    let sender_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(e) => {
                    error!(%connection_id, "Failed to serialize outgoing message: {}", e);
                    continue;
                }
            };

            if let Err(e) = sender.send(Message::Text(json.into())).await {
                warn!(%connection_id, "Failed to send media stream message: {}", e);
                break;
            }
        }
    });

    let inbound = Box::pin(
        receiver
            .take_while(move |frame| {
                future::ready(match frame {
                    Ok(Message::Close(_)) => {
                        info!(%connection_id, "Media stream closed by provider");
                        false
                    }
                    Ok(_) => true,
                    Err(e) => {
                        warn!(%connection_id, "Media stream error: {}", e);
                        false
                    }
                })
            })
            .filter_map(move |frame| future::ready(parse_frame(frame, connection_id))),
    );

    let session = CallSession::new(
        outbound_tx,
        state.store.clone(),
        state.services.clone(),
        state.call_settings.clone(),
        caller_hint,
    );
    let transcript = session.run(inbound).await;

    // The session dropped its sender, so the writer drains and exits.
    if let Err(e) = sender_task.await {
        error!(%connection_id, "Media stream writer task failed: {}", e);
    }

    info!(
        %connection_id,
        entries = transcript.len(),
        "Media stream finished"
    );
}

/// Decode one text frame. Malformed frames are logged and dropped.
fn parse_frame(
    frame: Result<Message, axum::Error>,
    connection_id: Uuid,
) -> Option<StreamInbound> {
    match frame {
        Ok(Message::Text(text)) => match serde_json::from_str::<StreamInbound>(text.as_str()) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(%connection_id, "Dropping malformed media stream message: {}", e);
                None
            }
        },
        Ok(Message::Binary(_)) => {
            debug!(%connection_id, "Ignoring binary media stream frame");
            None
        }
        _ => None,
    }
}
