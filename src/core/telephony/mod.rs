//! Telephony side of the bridge: media stream messages, call control and
//! the agent transfer procedure.

pub mod base;
pub mod greeting;
pub mod messages;
pub mod transfer;
pub mod twilio;
pub mod twiml;

pub use base::{
    CallControl, CallControlError, CallControlResult, CallDetails, CallUpdate, OutboundCall,
};
pub use greeting::{Greeting, MEDIA_STREAM_PATH, media_stream_url};
pub use messages::{InboundMedia, OutboundMedia, StreamInbound, StreamOutbound, StreamStart};
pub use transfer::{TransferSettings, transfer_call};
pub use twilio::{TwilioCallControl, TwilioConfig};
pub use twiml::VoiceResponse;

#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::base::{
        CallControl, CallControlError, CallControlResult, CallDetails, CallUpdate, OutboundCall,
    };

    /// Call-control fake that records every request.
    #[derive(Default)]
    pub struct RecordingCallControl {
        caller: Option<String>,
        fail_fetch: bool,
        fail_update: bool,
        fetches: Mutex<Vec<String>>,
        updates: Mutex<Vec<(String, CallUpdate)>>,
        created: Mutex<Vec<OutboundCall>>,
    }

    impl RecordingCallControl {
        pub fn with_caller(caller: &str) -> Self {
            Self {
                caller: Some(caller.to_string()),
                ..Default::default()
            }
        }

        pub fn failing_fetch() -> Self {
            Self {
                fail_fetch: true,
                ..Default::default()
            }
        }

        pub fn failing_update() -> Self {
            Self {
                fail_update: true,
                ..Default::default()
            }
        }

        pub fn fetches(&self) -> Vec<String> {
            self.fetches.lock().clone()
        }

        pub fn updates(&self) -> Vec<(String, CallUpdate)> {
            self.updates.lock().clone()
        }

        pub fn created(&self) -> Vec<OutboundCall> {
            self.created.lock().clone()
        }
    }

    #[async_trait]
    impl CallControl for RecordingCallControl {
        async fn fetch_call(&self, call_sid: &str) -> CallControlResult<CallDetails> {
            self.fetches.lock().push(call_sid.to_string());
            if self.fail_fetch {
                return Err(CallControlError::NotFound(call_sid.to_string()));
            }
            Ok(CallDetails {
                sid: call_sid.to_string(),
                from: self.caller.clone().unwrap_or_else(|| "+10000000000".to_string()),
                to: None,
                status: Some("in-progress".to_string()),
            })
        }

        async fn update_call(&self, call_sid: &str, update: CallUpdate) -> CallControlResult<()> {
            self.updates.lock().push((call_sid.to_string(), update));
            if self.fail_update {
                return Err(CallControlError::ProviderError {
                    status: 500,
                    message: "update failed".to_string(),
                });
            }
            Ok(())
        }

        async fn create_call(&self, call: OutboundCall) -> CallControlResult<String> {
            let mut created = self.created.lock();
            created.push(call);
            Ok(format!("CA_AGENT_{}", created.len()))
        }
    }
}
