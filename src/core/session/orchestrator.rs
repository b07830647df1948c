//! Per-call session state machine.
//!
//! One [`CallSession`] owns one media-stream connection. Its task selects
//! over the telephony inbound stream and the realtime model's event channel,
//! so no two handlers of the same session ever run concurrently.
//!
//! The realtime connect runs in its own task while the stream keeps being
//! read. Caller audio is always buffered for offline transcription but is
//! only forwarded once the connection is configured; chunks that arrive
//! earlier are not replayed.
//!
//! Timing rules:
//! - every assistant audio delta locks out barge-in for
//!   [`CallSettings::interruption_lock`];
//! - a transfer phrase schedules the agent transfer after
//!   [`CallSettings::transfer_delay`], replacing any transfer still pending.
//!
//! When the telephony stream closes the session is finalized exactly once:
//! offline transcription, transcript log, then the helpdesk ticket.

use bytes::BytesMut;
use futures::{Stream, StreamExt};
use std::sync::Arc;
use tokio::select;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::settings::{CallSettings, UNKNOWN_CALLER_NUMBER};
use super::store::{CallServices, SessionStore};
use crate::core::realtime::{ClientEvent, RealtimeLink, RealtimeResult, ServerEvent};
use crate::core::telephony::{
    CallUpdate, InboundMedia, StreamInbound, StreamOutbound, StreamStart, transfer_call,
};
use crate::core::transcript::{Speaker, Transcript};
use crate::core::triggers::Trigger;

/// Caller number registered when neither the webhook nor the connection
/// supplied one.
pub const UNKNOWN_CALLER: &str = "Unknown";

pub struct CallSession {
    outbound: mpsc::Sender<StreamOutbound>,
    store: SessionStore,
    services: CallServices,
    settings: Arc<CallSettings>,
    caller_hint: Option<String>,

    stream_sid: Option<String>,
    call_sid: Option<String>,
    started_at: Instant,
    locked_until: Option<Instant>,
    audio: BytesMut,
    transcript: Transcript,
    realtime: Option<mpsc::Sender<ClientEvent>>,
    realtime_events: Option<mpsc::Receiver<ServerEvent>>,
    connecting: Option<JoinHandle<RealtimeResult<RealtimeLink>>>,
    pending_transfer: Option<JoinHandle<()>>,
    ended: bool,
    finalized: bool,
}

impl CallSession {
    pub fn new(
        outbound: mpsc::Sender<StreamOutbound>,
        store: SessionStore,
        services: CallServices,
        settings: Arc<CallSettings>,
        caller_hint: Option<String>,
    ) -> Self {
        Self {
            outbound,
            store,
            services,
            settings,
            caller_hint,
            stream_sid: None,
            call_sid: None,
            started_at: Instant::now(),
            locked_until: None,
            audio: BytesMut::new(),
            transcript: Transcript::new(),
            realtime: None,
            realtime_events: None,
            connecting: None,
            pending_transfer: None,
            ended: false,
            finalized: false,
        }
    }

    /// Drive the session until the telephony stream ends, then finalize.
    /// Returns the merged transcript.
    pub async fn run<S>(mut self, mut inbound: S) -> Transcript
    where
        S: Stream<Item = StreamInbound> + Unpin,
    {
        loop {
            select! {
                event = inbound.next() => match event {
                    Some(event) => self.handle_stream_event(event).await,
                    None => {
                        info!(call_sid = ?self.call_sid, "Media stream closed");
                        break;
                    }
                },
                event = next_realtime_event(&mut self.realtime_events) => match event {
                    Some(event) => self.handle_realtime_event(event).await,
                    None => {
                        warn!(call_sid = ?self.call_sid, "Realtime connection closed by peer");
                        self.close_realtime();
                    }
                },
                result = next_connection(&mut self.connecting) => {
                    self.connecting = None;
                    self.on_realtime_connected(result).await;
                }
            }
        }

        self.finalize().await;
        std::mem::take(&mut self.transcript)
    }

    pub fn call_sid(&self) -> Option<&str> {
        self.call_sid.as_deref()
    }

    pub fn stream_sid(&self) -> Option<&str> {
        self.stream_sid.as_deref()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn is_realtime_connected(&self) -> bool {
        self.realtime.is_some()
    }

    /// Whether caller speech is currently ignored because assistant audio
    /// was just played.
    pub fn is_locked(&self) -> bool {
        self.locked_until
            .is_some_and(|until| Instant::now() < until)
    }

    pub fn has_pending_transfer(&self) -> bool {
        self.pending_transfer
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    // =========================================================================
    // Telephony events
    // =========================================================================

    pub async fn handle_stream_event(&mut self, event: StreamInbound) {
        match event {
            StreamInbound::Start { start } => self.on_start(start).await,
            StreamInbound::Media { media } => self.on_media(media).await,
            StreamInbound::Connected | StreamInbound::Mark | StreamInbound::Stop => {
                debug!(call_sid = ?self.call_sid, "Ignoring media stream control event");
            }
            StreamInbound::Unknown => {
                debug!(call_sid = ?self.call_sid, "Ignoring unknown media stream event");
            }
        }
    }

    async fn on_start(&mut self, start: StreamStart) {
        if self.call_sid.is_some() {
            warn!(
                call_sid = ?self.call_sid,
                new_call_sid = %start.call_sid,
                "Duplicate start event ignored"
            );
            return;
        }

        info!(
            call_sid = %start.call_sid,
            stream_sid = %start.stream_sid,
            "Media stream started"
        );

        let caller = self
            .store
            .callers
            .take_pending(&start.call_sid)
            .or_else(|| self.caller_hint.clone())
            .unwrap_or_else(|| UNKNOWN_CALLER.to_string());

        self.store.callers.register(&start.call_sid, &caller);
        self.store.callers.log_snapshot();
        self.store.timers.start(&start.call_sid);

        self.started_at = Instant::now();
        self.stream_sid = Some(start.stream_sid);
        self.call_sid = Some(start.call_sid);

        self.connect_realtime();
    }

    fn connect_realtime(&mut self) {
        let connector = self.services.realtime.clone();
        self.connecting = Some(tokio::spawn(async move { connector.connect().await }));
        debug!(call_sid = ?self.call_sid, "Connecting to realtime model");
    }

    async fn on_realtime_connected(
        &mut self,
        result: Result<RealtimeResult<RealtimeLink>, JoinError>,
    ) {
        let link = match result {
            Ok(Ok(link)) => link,
            Ok(Err(e)) => {
                error!(call_sid = ?self.call_sid, "Failed to connect to realtime model: {}", e);
                return;
            }
            Err(e) => {
                error!(call_sid = ?self.call_sid, "Realtime connect task failed: {}", e);
                return;
            }
        };

        if self.ended || self.finalized {
            debug!(call_sid = ?self.call_sid, "Call already over, discarding realtime connection");
            return;
        }

        let update = ClientEvent::SessionUpdate {
            session: self.settings.session.to_session_config(),
        };
        if link.commands.send(update).await.is_err() {
            error!(call_sid = ?self.call_sid, "Realtime connection closed before session update");
            return;
        }

        info!(call_sid = ?self.call_sid, "Realtime session configured");
        self.realtime = Some(link.commands);
        self.realtime_events = Some(link.events);
    }

    async fn on_media(&mut self, media: InboundMedia) {
        match media.decode() {
            Ok(bytes) => self.audio.extend_from_slice(&bytes),
            Err(e) => {
                warn!(call_sid = ?self.call_sid, "Dropping undecodable media payload: {}", e);
                return;
            }
        }

        let Some(commands) = &self.realtime else {
            return;
        };

        let append = ClientEvent::InputAudioBufferAppend {
            audio: media.payload,
        };
        if commands.send(append).await.is_err() {
            debug!(call_sid = ?self.call_sid, "Realtime connection gone, dropping audio");
            self.close_realtime();
        }
    }

    // =========================================================================
    // Realtime events
    // =========================================================================

    pub async fn handle_realtime_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::AudioDelta { delta, .. } => {
                if delta.is_empty() {
                    debug!(call_sid = ?self.call_sid, "Skipping empty audio delta");
                    return;
                }
                if let Some(stream_sid) = &self.stream_sid {
                    let media = StreamOutbound::media(stream_sid, delta);
                    self.send_outbound(media).await;
                }
                self.locked_until = Some(Instant::now() + self.settings.interruption_lock);
            }
            ServerEvent::ResponseDone { response } => {
                let text = response.first_transcript();
                self.on_assistant_turn(&text).await;
            }
            ServerEvent::InputText { text } => {
                let offset_ms = self.offset_ms();
                self.transcript.record(Speaker::User, &text, offset_ms);
            }
            ServerEvent::SpeechStarted { .. } => self.on_speech_started().await,
            ServerEvent::Error { error } => {
                error!(
                    call_sid = ?self.call_sid,
                    error_type = %error.error_type,
                    code = ?error.code,
                    "Realtime model error: {}",
                    error.message
                );
            }
            ServerEvent::Unknown => {}
        }
    }

    async fn on_assistant_turn(&mut self, text: &str) {
        let offset_ms = self.offset_ms();
        self.transcript.record(Speaker::Assistant, text, offset_ms);

        match self.settings.triggers.detect(text) {
            Some(Trigger::EndCall) => {
                self.end_call(text).await;
            }
            Some(Trigger::Transfer) if !self.ended => self.schedule_transfer(),
            Some(Trigger::Transfer) | None => {}
        }
    }

    async fn on_speech_started(&mut self) {
        if self.is_locked() {
            debug!(call_sid = ?self.call_sid, "Caller speech during assistant audio ignored");
            return;
        }

        if let Some(stream_sid) = self.stream_sid.clone() {
            self.send_outbound(StreamOutbound::clear(&stream_sid)).await;
        }

        if let Some(commands) = &self.realtime
            && commands.send(ClientEvent::ResponseCancel).await.is_err()
        {
            self.close_realtime();
        }

        debug!(call_sid = ?self.call_sid, "Caller interrupted, playback cleared");
    }

    // =========================================================================
    // Procedures
    // =========================================================================

    /// End the call if `fragment` contains an end-call phrase. Returns
    /// whether it matched. Side effects happen once per session.
    pub async fn end_call(&mut self, fragment: &str) -> bool {
        if !self.settings.triggers.is_end_call(fragment) {
            return false;
        }

        if self.ended {
            debug!(call_sid = ?self.call_sid, "Call already ended");
            return true;
        }
        self.ended = true;

        info!(call_sid = ?self.call_sid, "End-call phrase detected, ending call");

        self.cancel_transfer();

        if let Some(stream_sid) = self.stream_sid.clone() {
            self.send_outbound(StreamOutbound::stop(&stream_sid)).await;
        }

        self.close_realtime();

        if let Some(call_sid) = &self.call_sid
            && let Err(e) = self
                .services
                .call_control
                .update_call(call_sid, CallUpdate::Completed)
                .await
        {
            error!(call_sid = %call_sid, "Failed to complete call: {}", e);
        }

        true
    }

    fn schedule_transfer(&mut self) {
        let Some(call_sid) = self.call_sid.clone() else {
            warn!("Transfer requested before the call started");
            return;
        };

        if let Some(previous) = self.pending_transfer.take() {
            previous.abort();
            debug!(call_sid = %call_sid, "Pending transfer superseded");
        }

        let control = self.services.call_control.clone();
        let settings = self.settings.clone();

        info!(
            call_sid = %call_sid,
            delay_ms = settings.transfer_delay.as_millis() as u64,
            agent_number = %settings.transfer.agent_number,
            "Transfer phrase detected, scheduling transfer"
        );

        self.pending_transfer = Some(tokio::spawn(async move {
            tokio::time::sleep(settings.transfer_delay).await;
            if let Err(e) = transfer_call(control.as_ref(), &call_sid, &settings.transfer).await {
                error!(call_sid = %call_sid, "Call transfer failed: {}", e);
            }
        }));
    }

    /// Post-call work. Runs once; every failure is logged and contained.
    pub async fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        self.finalized = true;

        self.cancel_transfer();
        self.close_realtime();

        let Some(call_sid) = self.call_sid.clone() else {
            info!("Media stream closed before the call started, nothing to finalize");
            return;
        };

        if let Some(duration) = self.store.timers.stop(&call_sid) {
            info!(
                call_sid = %call_sid,
                duration_secs = duration.as_secs(),
                "Call duration"
            );
        }

        let segments = if self.audio.is_empty() {
            debug!(call_sid = %call_sid, "No caller audio received, skipping transcription");
            Vec::new()
        } else {
            match self.services.transcriber.transcribe(&self.audio).await {
                Ok(segments) => {
                    info!(
                        call_sid = %call_sid,
                        segments = segments.len(),
                        audio_bytes = self.audio.len(),
                        "Offline transcription complete"
                    );
                    segments
                }
                Err(e) => {
                    error!(call_sid = %call_sid, "Offline transcription failed: {}", e);
                    Vec::new()
                }
            }
        };

        self.transcript.merge_offline(segments);
        let rendered = self.transcript.render();

        if let Err(e) = self
            .services
            .transcript_log
            .append(Some(&call_sid), self.transcript.entries())
            .await
        {
            error!(call_sid = %call_sid, "Failed to write transcript log: {}", e);
        }

        let number = self
            .store
            .callers
            .remove(&call_sid)
            .map(|record| record.phone_number)
            .unwrap_or_else(|| UNKNOWN_CALLER_NUMBER.to_string());
        let description = format!("Caller Number: {number}\n\n{rendered}");

        let subject = match self
            .services
            .tickets
            .subjects()
            .extract_subject(&rendered)
            .await
        {
            Ok(subject) => subject,
            Err(e) => {
                warn!(call_sid = %call_sid, "Subject extraction failed, using fallback: {}", e);
                format!("Support Call from {number}")
            }
        };

        match self
            .services
            .tickets
            .submit_ticket(&subject, &description, &self.settings.fallback_email)
            .await
        {
            Ok(record) => info!(
                call_sid = %call_sid,
                ticket_number = ?record.ticket_number,
                "Call finalized"
            ),
            Err(e) => error!(call_sid = %call_sid, "Failed to create ticket: {}", e),
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn cancel_transfer(&mut self) {
        if let Some(transfer) = self.pending_transfer.take()
            && !transfer.is_finished()
        {
            transfer.abort();
            info!(call_sid = ?self.call_sid, "Pending transfer cancelled");
        }
    }

    fn close_realtime(&mut self) {
        if let Some(connecting) = self.connecting.take() {
            connecting.abort();
        }
        // Dropping the command sender closes the socket
        if self.realtime.take().is_some() {
            info!(call_sid = ?self.call_sid, "Realtime connection closed");
        }
        self.realtime_events = None;
    }

    async fn send_outbound(&self, message: StreamOutbound) {
        if self.outbound.send(message).await.is_err() {
            debug!(call_sid = ?self.call_sid, "Media stream writer gone, dropping message");
        }
    }

    fn offset_ms(&self) -> u64 {
        self.started_at.elapsed().as_millis() as u64
    }
}

async fn next_realtime_event(
    events: &mut Option<mpsc::Receiver<ServerEvent>>,
) -> Option<ServerEvent> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn next_connection(
    connecting: &mut Option<JoinHandle<RealtimeResult<RealtimeLink>>>,
) -> Result<RealtimeResult<RealtimeLink>, JoinError> {
    match connecting {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}
