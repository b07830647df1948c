//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tempfile::TempDir;
use tokio::sync::mpsc;

use callbridge_gateway::ServerConfig;
use callbridge_gateway::core::helpdesk::{
    OpenAISubjectExtractor, TicketFinalizer, ZohoDeskClient, ZohoOAuthRefresher,
};
use callbridge_gateway::core::realtime::{
    ClientEvent, RealtimeConnector, RealtimeError, RealtimeLink, RealtimeResult, ServerEvent,
};
use callbridge_gateway::core::session::{CallServices, SessionStore};
use callbridge_gateway::core::telephony::{CallControl, TwilioCallControl};
use callbridge_gateway::core::transcription::WhisperTranscriber;
use callbridge_gateway::state::AppState;

/// Far ends of one realtime connection opened by the session under test.
pub struct RealtimePeer {
    pub commands: mpsc::Receiver<ClientEvent>,
    pub events: mpsc::Sender<ServerEvent>,
}

/// Connector that hands every opened link to the test.
pub struct ChannelConnector {
    peers: mpsc::UnboundedSender<RealtimePeer>,
    fail: Mutex<bool>,
}

impl ChannelConnector {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<RealtimePeer>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                peers: tx,
                fail: Mutex::new(false),
            }),
            rx,
        )
    }

    pub fn fail_connections(&self) {
        *self.fail.lock() = true;
    }
}

#[async_trait]
impl RealtimeConnector for ChannelConnector {
    async fn connect(&self) -> RealtimeResult<RealtimeLink> {
        if *self.fail.lock() {
            return Err(RealtimeError::ConnectionFailed("refused".to_string()));
        }
        let (link, commands, events) = RealtimeLink::pair();
        let _ = self.peers.send(RealtimePeer { commands, events });
        Ok(link)
    }
}

/// Configuration with every HTTP collaborator pointed at `base_url` and the
/// transcript log written under `dir`.
pub fn config_for(base_url: &str, dir: &Path) -> ServerConfig {
    let log_path = dir.join("transcript.log");
    let yaml = format!(
        r#"
server:
  host: "127.0.0.1"
  port: 5050

openai:
  api_key: "sk-test"
  transcription_url: "{base_url}/v1/audio/transcriptions"
  subject_url: "{base_url}/v1/chat/completions"

twilio:
  account_sid: "AC123"
  auth_token: "twilio-token"
  api_url: "{base_url}"

call:
  fallback_email: "support@example.com"

zoho:
  desk_url: "{base_url}"
  accounts_url: "{base_url}"
  org_id: "org-1"
  department_id: "dep-1"
  client_id: "cid"
  client_secret: "csecret"
  refresh_token: "rtoken"

transcript_log:
  path: "{log}"
  mode: "shared"
"#,
        log = log_path.display()
    );

    let config_path = dir.join("config.yaml");
    fs::write(&config_path, yaml).unwrap();
    ServerConfig::from_file(&config_path).unwrap()
}

pub fn log_path(dir: &TempDir) -> PathBuf {
    dir.path().join("transcript.log")
}

/// Application state built from `config`, with the realtime model replaced
/// by `connector`.
pub fn state_with(config: ServerConfig, connector: Arc<dyn RealtimeConnector>) -> Arc<AppState> {
    let call_control: Arc<dyn CallControl> =
        Arc::new(TwilioCallControl::new(config.twilio_config()));
    let store = SessionStore::new(call_control.clone(), config.max_call_duration());

    let zoho = config.zoho_config();
    let tickets = TicketFinalizer::new(
        Arc::new(ZohoDeskClient::new(zoho.clone())),
        Arc::new(ZohoOAuthRefresher::new(zoho)),
        Arc::new(OpenAISubjectExtractor::new(config.subject_config())),
        config.seed_access_token(),
    );

    let services = CallServices {
        call_control,
        realtime: connector,
        transcriber: Arc::new(WhisperTranscriber::new(config.whisper_config())),
        tickets: Arc::new(tickets),
        transcript_log: config.transcript_log(),
    };

    AppState::with_services(config, store, services)
}
