use std::time::Duration;

use crate::core::realtime::SessionSettings;
use crate::core::telephony::TransferSettings;
use crate::core::triggers::TriggerPhrases;

pub const DEFAULT_TRANSFER_DELAY: Duration = Duration::from_millis(6000);
pub const DEFAULT_INTERRUPTION_LOCK: Duration = Duration::from_millis(1500);
pub const DEFAULT_FALLBACK_EMAIL: &str = "test@lumiring.com";

/// Caller number used in ticket descriptions when none was registered.
pub const UNKNOWN_CALLER_NUMBER: &str = "Unknown Number";

/// Per-call behaviour shared by every session.
#[derive(Debug, Clone)]
pub struct CallSettings {
    /// Sent once in `session.update`
    pub session: SessionSettings,
    pub triggers: TriggerPhrases,
    pub transfer: TransferSettings,
    /// Wait between a transfer phrase and the transfer itself
    pub transfer_delay: Duration,
    /// How long after the latest assistant audio the caller cannot barge in
    pub interruption_lock: Duration,
    /// Contact address on every ticket
    pub fallback_email: String,
}

impl Default for CallSettings {
    fn default() -> Self {
        Self {
            session: SessionSettings::default(),
            triggers: TriggerPhrases::default(),
            transfer: TransferSettings::default(),
            transfer_delay: DEFAULT_TRANSFER_DELAY,
            interruption_lock: DEFAULT_INTERRUPTION_LOCK,
            fallback_email: DEFAULT_FALLBACK_EMAIL.to_string(),
        }
    }
}
