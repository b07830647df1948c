//! Fakes for driving a [`CallSession`](super::CallSession) without network
//! access.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;

use super::orchestrator::CallSession;
use super::settings::CallSettings;
use super::store::{CallServices, SessionStore};
use crate::core::helpdesk::base::{
    AccessToken, HelpdeskApi, HelpdeskResult, OAuthRefresher, SubjectError, SubjectExtractor,
    TicketRecord, TicketRequest,
};
use crate::core::helpdesk::TicketFinalizer;
use crate::core::realtime::{
    ClientEvent, RealtimeConnector, RealtimeError, RealtimeLink, RealtimeResult, ServerEvent,
};
use crate::core::telephony::StreamOutbound;
use crate::core::telephony::testing::RecordingCallControl;
use crate::core::transcript::OfflineSegment;
use crate::core::transcript_log::{TranscriptLog, TranscriptLogMode};
use crate::core::transcription::{OfflineTranscriber, TranscriptionError, TranscriptionResult};

/// Let spawned tasks woken at the current instant run.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

/// The model's side of a fake realtime connection.
pub struct RealtimePeer {
    pub commands: mpsc::Receiver<ClientEvent>,
    pub events: mpsc::Sender<ServerEvent>,
}

pub struct FakeConnector {
    peers: mpsc::UnboundedSender<RealtimePeer>,
    fail: bool,
    delay: Duration,
}

#[async_trait]
impl RealtimeConnector for FakeConnector {
    async fn connect(&self) -> RealtimeResult<RealtimeLink> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(RealtimeError::ConnectionFailed("refused".to_string()));
        }
        let (link, commands, events) = RealtimeLink::pair();
        let _ = self.peers.send(RealtimePeer { commands, events });
        Ok(link)
    }
}

#[derive(Default)]
pub struct FakeTranscriber {
    segments: Mutex<Vec<OfflineSegment>>,
    fail: Mutex<bool>,
    received: Mutex<Vec<Vec<u8>>>,
}

impl FakeTranscriber {
    pub fn respond_with(&self, segments: Vec<OfflineSegment>) {
        *self.segments.lock() = segments;
    }

    pub fn fail(&self) {
        *self.fail.lock() = true;
    }

    pub fn received(&self) -> Vec<Vec<u8>> {
        self.received.lock().clone()
    }
}

#[async_trait]
impl OfflineTranscriber for FakeTranscriber {
    async fn transcribe(&self, audio: &[u8]) -> TranscriptionResult<Vec<OfflineSegment>> {
        self.received.lock().push(audio.to_vec());
        if *self.fail.lock() {
            return Err(TranscriptionError::ProviderError("unavailable".to_string()));
        }
        Ok(self.segments.lock().clone())
    }
}

#[derive(Default)]
pub struct RecordingHelpdesk {
    tickets: Mutex<Vec<TicketRequest>>,
}

impl RecordingHelpdesk {
    pub fn tickets(&self) -> Vec<TicketRequest> {
        self.tickets.lock().clone()
    }
}

#[async_trait]
impl HelpdeskApi for RecordingHelpdesk {
    async fn create_ticket(
        &self,
        _access_token: &str,
        ticket: &TicketRequest,
    ) -> HelpdeskResult<TicketRecord> {
        let mut tickets = self.tickets.lock();
        tickets.push(ticket.clone());
        Ok(TicketRecord {
            id: Some(tickets.len().to_string()),
            ticket_number: Some(format!("{}", 100 + tickets.len())),
            subject: Some(ticket.subject.clone()),
            status: Some("Open".to_string()),
        })
    }
}

pub struct StaticRefresher;

#[async_trait]
impl OAuthRefresher for StaticRefresher {
    async fn refresh(&self) -> HelpdeskResult<AccessToken> {
        Ok(AccessToken::new("refreshed", Duration::from_secs(3600)))
    }
}

pub struct FixedSubject {
    subject: Mutex<Option<String>>,
}

#[async_trait]
impl SubjectExtractor for FixedSubject {
    async fn extract_subject(&self, _conversation: &str) -> Result<String, SubjectError> {
        self.subject.lock().clone().ok_or(SubjectError::EmptySubject)
    }
}

/// A fully faked environment plus the channels a test observes.
pub struct Fixture {
    pub store: SessionStore,
    pub control: Arc<RecordingCallControl>,
    pub transcriber: Arc<FakeTranscriber>,
    pub helpdesk: Arc<RecordingHelpdesk>,
    pub outbound: mpsc::Receiver<StreamOutbound>,
    subjects: Arc<FixedSubject>,
    services: CallServices,
    settings: Arc<CallSettings>,
    outbound_tx: mpsc::Sender<StreamOutbound>,
    peers: mpsc::UnboundedReceiver<RealtimePeer>,
    log_dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self::build(RecordingCallControl::default(), false, Duration::ZERO)
    }

    pub fn with_control(control: RecordingCallControl) -> Self {
        Self::build(control, false, Duration::ZERO)
    }

    pub fn with_failing_connector() -> Self {
        Self::build(RecordingCallControl::default(), true, Duration::ZERO)
    }

    /// Realtime connects take `delay` before the socket opens.
    pub fn with_connect_delay(delay: Duration) -> Self {
        Self::build(RecordingCallControl::default(), false, delay)
    }

    fn build(control: RecordingCallControl, fail_connect: bool, connect_delay: Duration) -> Self {
        let control = Arc::new(control);
        let (peers_tx, peers) = mpsc::unbounded_channel();
        let (outbound_tx, outbound) = mpsc::channel(64);
        let transcriber = Arc::new(FakeTranscriber::default());
        let helpdesk = Arc::new(RecordingHelpdesk::default());
        let subjects = Arc::new(FixedSubject {
            subject: Mutex::new(Some("Router Not Working".to_string())),
        });
        let log_dir = TempDir::new().expect("temp dir");

        let tickets = TicketFinalizer::new(
            helpdesk.clone(),
            Arc::new(StaticRefresher),
            subjects.clone(),
            Some(AccessToken::new("seed", Duration::from_secs(3600))),
        );

        let services = CallServices {
            call_control: control.clone(),
            realtime: Arc::new(FakeConnector {
                peers: peers_tx,
                fail: fail_connect,
                delay: connect_delay,
            }),
            transcriber: transcriber.clone(),
            tickets: Arc::new(tickets),
            transcript_log: TranscriptLog::new(
                log_dir.path().join("transcript.log"),
                TranscriptLogMode::Shared,
            ),
        };

        Self {
            store: SessionStore::new(control.clone(), Duration::from_secs(600)),
            control,
            transcriber,
            helpdesk,
            outbound,
            subjects,
            services,
            settings: Arc::new(CallSettings::default()),
            outbound_tx,
            peers,
            log_dir,
        }
    }

    pub fn session(&self, caller_hint: Option<String>) -> CallSession {
        CallSession::new(
            self.outbound_tx.clone(),
            self.store.clone(),
            self.services.clone(),
            self.settings.clone(),
            caller_hint,
        )
    }

    /// The realtime peer opened by the most recent connect.
    pub async fn next_peer(&mut self) -> RealtimePeer {
        self.peers.recv().await.expect("realtime connection opened")
    }

    pub fn try_next_peer(&mut self) -> Option<RealtimePeer> {
        self.peers.try_recv().ok()
    }

    pub fn subjects_fail(&self) {
        *self.subjects.subject.lock() = None;
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_dir.path().join("transcript.log")
    }
}
