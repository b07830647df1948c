//! Trigger phrase detection for completed assistant turns.
//!
//! A turn is matched case-insensitively against two phrase lists. End-call
//! phrases win over transfer phrases when a turn contains both, since ending
//! the call short-circuits everything else for that turn.

use serde::{Deserialize, Serialize};

/// Phrases that end the call when the assistant says them.
pub const DEFAULT_END_CALL_PHRASES: &[&str] = &[
    "end the call",
    "hang up",
    "goodbye",
    "i'm done",
    "that's all",
    "that\u{2019}s all",
    "you can end",
    "bye",
];

/// Phrases that hand the caller over to a human agent.
pub const DEFAULT_TRANSFER_PHRASES: &[&str] = &[
    "speak to an agent",
    "talk to a person",
    "human",
    "representative",
    "transfer me",
    "transfer you to one of our human representatives",
    "i'll transfer you",
    "please hold",
    "connect you to a human",
];

/// Outcome of scanning one utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    EndCall,
    Transfer,
}

/// Phrase lists used by [`TriggerPhrases::detect`].
///
/// Phrases are stored lowercased so matching only has to fold the utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerPhrases {
    pub end_call: Vec<String>,
    pub transfer: Vec<String>,
}

impl Default for TriggerPhrases {
    fn default() -> Self {
        Self::new(
            DEFAULT_END_CALL_PHRASES.iter().map(|p| p.to_string()),
            DEFAULT_TRANSFER_PHRASES.iter().map(|p| p.to_string()),
        )
    }
}

impl TriggerPhrases {
    pub fn new(
        end_call: impl IntoIterator<Item = String>,
        transfer: impl IntoIterator<Item = String>,
    ) -> Self {
        let normalize = |phrases: Vec<String>| {
            phrases
                .into_iter()
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect::<Vec<_>>()
        };

        Self {
            end_call: normalize(end_call.into_iter().collect()),
            transfer: normalize(transfer.into_iter().collect()),
        }
    }

    /// True when the utterance contains any end-call phrase.
    pub fn is_end_call(&self, utterance: &str) -> bool {
        contains_any(&utterance.to_lowercase(), &self.end_call)
    }

    /// Classify an utterance. End-call takes priority over transfer.
    pub fn detect(&self, utterance: &str) -> Option<Trigger> {
        if utterance.is_empty() {
            return None;
        }

        let lowered = utterance.to_lowercase();
        if contains_any(&lowered, &self.end_call) {
            Some(Trigger::EndCall)
        } else if contains_any(&lowered, &self.transfer) {
            Some(Trigger::Transfer)
        } else {
            None
        }
    }
}

fn contains_any(haystack: &str, phrases: &[String]) -> bool {
    phrases.iter().any(|p| haystack.contains(p.as_str()))
}
