use std::sync::Arc;
use std::time::Duration;

use crate::core::helpdesk::TicketFinalizer;
use crate::core::realtime::RealtimeConnector;
use crate::core::registry::CallerRegistry;
use crate::core::telephony::CallControl;
use crate::core::timer::CallTimers;
use crate::core::transcript_log::TranscriptLog;
use crate::core::transcription::OfflineTranscriber;

/// Tables shared by every session on this instance.
#[derive(Clone)]
pub struct SessionStore {
    pub callers: Arc<CallerRegistry>,
    pub timers: Arc<CallTimers>,
}

impl SessionStore {
    pub fn new(control: Arc<dyn CallControl>, max_call_duration: Duration) -> Self {
        Self {
            callers: Arc::new(CallerRegistry::new()),
            timers: Arc::new(CallTimers::new(control, max_call_duration)),
        }
    }
}

/// External collaborators a session talks to.
#[derive(Clone)]
pub struct CallServices {
    pub call_control: Arc<dyn CallControl>,
    pub realtime: Arc<dyn RealtimeConnector>,
    pub transcriber: Arc<dyn OfflineTranscriber>,
    pub tickets: Arc<TicketFinalizer>,
    pub transcript_log: TranscriptLog,
}
