pub mod helpdesk;
pub mod realtime;
pub mod registry;
pub mod session;
pub mod telephony;
pub mod timer;
pub mod transcript;
pub mod transcript_log;
pub mod transcription;
pub mod triggers;

// Re-export commonly used types for convenience
pub use helpdesk::{
    HelpdeskApi, HelpdeskError, OAuthRefresher, SubjectExtractor, TicketCreationError,
    TicketFinalizer,
};
pub use realtime::{RealtimeConnector, RealtimeError, RealtimeLink, RealtimeResult};
pub use registry::{CallerRecord, CallerRegistry};
pub use session::{CallServices, CallSession, CallSettings, SessionStore};
pub use telephony::{CallControl, CallControlError, CallUpdate, StreamInbound, StreamOutbound};
pub use timer::CallTimers;
pub use transcript::{Speaker, Transcript, TranscriptEntry};
pub use transcript_log::{TranscriptLog, TranscriptLogMode};
pub use transcription::{OfflineTranscriber, TranscriptionError};
pub use triggers::{Trigger, TriggerPhrases};
