//! OpenAI Realtime API WebSocket connector.
//!
//! Each call opens its own socket. A spawned pump task owns the socket and
//! shuttles frames between it and the [`RealtimeLink`] channels:
//!
//! - commands from the link are serialized and sent as text frames
//! - text frames from the server are parsed into [`ServerEvent`]s
//! - pings are answered, close frames and errors end the task
//!
//! When the link's command sender is dropped the task sends a close frame
//! and exits. When the task exits the link's event receiver yields `None`.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tracing::{debug, error, info, warn};
use url::Url;

use super::config::OpenAIRealtimeConfig;
use crate::core::realtime::base::{
    RealtimeConnector, RealtimeError, RealtimeLink, RealtimeResult,
};
use crate::core::realtime::messages::ServerEvent;

pub struct OpenAIRealtimeConnector {
    config: OpenAIRealtimeConfig,
}

impl OpenAIRealtimeConnector {
    pub fn new(config: OpenAIRealtimeConfig) -> RealtimeResult<Self> {
        if config.api_key.is_empty() {
            return Err(RealtimeError::InvalidConfiguration(
                "API key is required".to_string(),
            ));
        }
        Ok(Self { config })
    }

    /// Endpoint URL with the model as a query parameter.
    pub fn build_ws_url(&self) -> RealtimeResult<Url> {
        let mut url = Url::parse(&self.config.api_url)
            .map_err(|e| RealtimeError::InvalidConfiguration(format!("Invalid API URL: {e}")))?;
        url.query_pairs_mut().append_pair("model", &self.config.model);
        Ok(url)
    }

    fn build_request(&self) -> RealtimeResult<http::Request<()>> {
        let url = self.build_ws_url()?;
        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|e| RealtimeError::ConnectionFailed(e.to_string()))?;

        let auth = HeaderValue::from_str(&format!("Bearer {}", self.config.api_key))
            .map_err(|e| RealtimeError::AuthenticationFailed(e.to_string()))?;
        let headers = request.headers_mut();
        headers.insert(http::header::AUTHORIZATION, auth);
        headers.insert("OpenAI-Beta", HeaderValue::from_static("realtime=v1"));

        Ok(request)
    }
}

#[async_trait]
impl RealtimeConnector for OpenAIRealtimeConnector {
    async fn connect(&self) -> RealtimeResult<RealtimeLink> {
        let request = self.build_request()?;

        let (ws_stream, _response) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(|e| RealtimeError::ConnectionFailed(e.to_string()))?;

        info!(model = %self.config.model, "Connected to OpenAI Realtime API");

        let (mut ws_sink, mut ws_stream) = ws_stream.split();
        let (link, mut command_rx, event_tx) = RealtimeLink::pair();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    command = command_rx.recv() => {
                        let Some(event) = command else {
                            debug!("Realtime link dropped, closing socket");
                            let _ = ws_sink.send(Message::Close(None)).await;
                            break;
                        };

                        let json = match serde_json::to_string(&event) {
                            Ok(j) => j,
                            Err(e) => {
                                error!("Failed to serialize event: {}", e);
                                continue;
                            }
                        };

                        if let Err(e) = ws_sink.send(Message::Text(json.into())).await {
                            error!("Failed to send WebSocket message: {}", e);
                            break;
                        }
                    }

                    msg = ws_stream.next() => {
                        let Some(msg) = msg else {
                            info!("Realtime WebSocket stream ended");
                            break;
                        };

                        match msg {
                            Ok(Message::Text(text)) => {
                                match serde_json::from_str::<ServerEvent>(&text) {
                                    Ok(event) => {
                                        if event_tx.send(event).await.is_err() {
                                            debug!("Realtime event receiver dropped");
                                            let _ = ws_sink.send(Message::Close(None)).await;
                                            break;
                                        }
                                    }
                                    Err(e) => {
                                        warn!("Failed to parse server event: {}", e);
                                    }
                                }
                            }
                            Ok(Message::Close(_)) => {
                                info!("Realtime WebSocket closed by server");
                                break;
                            }
                            Ok(Message::Ping(data)) => {
                                if let Err(e) = ws_sink.send(Message::Pong(data)).await {
                                    error!("Failed to send pong: {}", e);
                                }
                            }
                            Err(e) => {
                                error!("Realtime WebSocket error: {}", e);
                                break;
                            }
                            _ => {}
                        }
                    }
                }
            }

            debug!("Realtime connection task finished");
        });

        Ok(link)
    }
}
