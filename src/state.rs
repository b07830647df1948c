use std::sync::Arc;

use crate::config::ServerConfig;
use crate::core::helpdesk::{
    OpenAISubjectExtractor, TicketFinalizer, ZohoDeskClient, ZohoOAuthRefresher,
};
use crate::core::realtime::{OpenAIRealtimeConnector, RealtimeResult};
use crate::core::session::{CallServices, CallSettings, SessionStore};
use crate::core::telephony::{CallControl, Greeting, TwilioCallControl};
use crate::core::transcription::WhisperTranscriber;

/// Application state shared by all handlers
pub struct AppState {
    pub config: ServerConfig,
    /// Caller registry and call timers
    pub store: SessionStore,
    pub services: CallServices,
    pub call_settings: Arc<CallSettings>,
    pub greeting: Greeting,
}

impl AppState {
    /// Build the production collaborators from configuration.
    ///
    /// # Errors
    /// Fails when the realtime connector rejects its configuration.
    pub fn new(config: ServerConfig) -> RealtimeResult<Arc<Self>> {
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
            realtime: Arc::new(OpenAIRealtimeConnector::new(config.realtime_config())?),
            transcriber: Arc::new(WhisperTranscriber::new(config.whisper_config())),
            tickets: Arc::new(tickets),
            transcript_log: config.transcript_log(),
        };

        Ok(Self::with_services(config, store, services))
    }

    /// Assemble state around already-built collaborators.
    pub fn with_services(
        config: ServerConfig,
        store: SessionStore,
        services: CallServices,
    ) -> Arc<Self> {
        Arc::new(Self {
            call_settings: Arc::new(config.call_settings()),
            greeting: config.greeting(),
            config,
            store,
            services,
        })
    }
}
