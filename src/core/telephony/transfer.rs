//! Hand a live call over to a human agent.
//!
//! The customer leg is redirected into a conference named after the call,
//! then a second leg dials the agent into the same conference. Neither leg
//! ends the conference when it leaves. Nothing is rolled back if the second
//! leg fails.

use tracing::info;

use super::base::{CallControl, CallControlResult, CallUpdate, OutboundCall};
use super::twiml::{Conference, DEFAULT_SAY_VOICE, VoiceResponse};

pub const DEFAULT_AGENT_NUMBER: &str = "+639265803317";
pub const DEFAULT_HOLD_MUSIC_URL: &str =
    "http://twimlets.com/holdmusic?Bucket=com.twilio.music.classical";
pub const DEFAULT_HOLD_MESSAGE: &str = "Please hold while we connect you to an agent.";
pub const DEFAULT_AGENT_GREETING: &str = "Connecting you to a caller from the voice assistant.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSettings {
    pub agent_number: String,
    pub hold_music_url: String,
    pub hold_message: String,
    pub agent_greeting: String,
    pub voice: String,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            agent_number: DEFAULT_AGENT_NUMBER.to_string(),
            hold_music_url: DEFAULT_HOLD_MUSIC_URL.to_string(),
            hold_message: DEFAULT_HOLD_MESSAGE.to_string(),
            agent_greeting: DEFAULT_AGENT_GREETING.to_string(),
            voice: DEFAULT_SAY_VOICE.to_string(),
        }
    }
}

pub fn conference_name(call_sid: &str) -> String {
    format!("transfer_{call_sid}")
}

/// TwiML that parks the caller in the conference until the agent joins.
pub fn customer_leg_twiml(call_sid: &str, settings: &TransferSettings) -> String {
    VoiceResponse::new()
        .say(Some(&settings.voice), settings.hold_message.as_str())
        .dial_conference(Conference {
            name: conference_name(call_sid),
            start_on_enter: false,
            end_on_exit: false,
            wait_url: Some(settings.hold_music_url.clone()),
            beep: None,
        })
        .to_xml()
}

/// TwiML that starts the conference when the agent answers.
pub fn agent_leg_twiml(call_sid: &str, settings: &TransferSettings) -> String {
    VoiceResponse::new()
        .say(Some(&settings.voice), settings.agent_greeting.as_str())
        .dial_conference(Conference {
            name: conference_name(call_sid),
            start_on_enter: true,
            end_on_exit: false,
            wait_url: None,
            beep: Some(false),
        })
        .to_xml()
}

/// Run the transfer. Each invocation originates a new agent leg.
pub async fn transfer_call(
    control: &dyn CallControl,
    call_sid: &str,
    settings: &TransferSettings,
) -> CallControlResult<String> {
    let call = control.fetch_call(call_sid).await?;

    control
        .update_call(
            call_sid,
            CallUpdate::Twiml(customer_leg_twiml(call_sid, settings)),
        )
        .await?;

    let agent_call_sid = control
        .create_call(OutboundCall {
            to: settings.agent_number.clone(),
            from: call.from,
            twiml: agent_leg_twiml(call_sid, settings),
        })
        .await?;

    info!(
        call_sid = %call_sid,
        agent_call_sid = %agent_call_sid,
        conference = %conference_name(call_sid),
        "Call transferred to agent"
    );
    Ok(agent_call_sid)
}
