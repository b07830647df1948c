use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// How long a webhook-announced caller waits for its media stream. Older
/// entries are swept on the next [`CallerRegistry::add_pending`].
pub const PENDING_CALLER_TTL: Duration = Duration::from_secs(300);

/// Caller phone number recorded for a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerRecord {
    pub call_sid: String,
    pub phone_number: String,
}

/// Call identifier to caller number, plus the pending map filled by the
/// incoming-call webhook before the media stream starts.
#[derive(Debug, Default)]
pub struct CallerRegistry {
    callers: DashMap<String, CallerRecord>,
    pending: DashMap<String, PendingCaller>,
}

#[derive(Debug)]
struct PendingCaller {
    phone_number: String,
    added_at: Instant,
}

impl CallerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the caller announced by the call-setup webhook.
    pub fn add_pending(&self, call_sid: &str, phone_number: &str) {
        let before = self.pending.len();
        self.pending
            .retain(|_, entry| entry.added_at.elapsed() < PENDING_CALLER_TTL);
        let expired = before - self.pending.len();
        if expired > 0 {
            debug!(expired, "Dropped pending callers whose stream never started");
        }

        self.pending.insert(
            call_sid.to_string(),
            PendingCaller {
                phone_number: phone_number.to_string(),
                added_at: Instant::now(),
            },
        );
    }

    /// Drain the pending entry for a call, if the webhook saw it.
    pub fn take_pending(&self, call_sid: &str) -> Option<String> {
        self.pending
            .remove(call_sid)
            .map(|(_, entry)| entry.phone_number)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Register the caller once the stream starts. A record that already
    /// exists is left untouched.
    pub fn register(&self, call_sid: &str, phone_number: &str) {
        self.callers
            .entry(call_sid.to_string())
            .or_insert_with(|| CallerRecord {
                call_sid: call_sid.to_string(),
                phone_number: phone_number.to_string(),
            });
    }

    pub fn get(&self, call_sid: &str) -> Option<CallerRecord> {
        self.callers.get(call_sid).map(|r| r.value().clone())
    }

    /// Remove and return the record for a finished call.
    pub fn remove(&self, call_sid: &str) -> Option<CallerRecord> {
        self.callers.remove(call_sid).map(|(_, record)| record)
    }

    pub fn len(&self) -> usize {
        self.callers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callers.is_empty()
    }

    /// Log every registered caller at debug level.
    pub fn log_snapshot(&self) {
        debug!(count = self.callers.len(), "Caller registry contents");
        for entry in self.callers.iter() {
            debug!(
                call_sid = %entry.key(),
                phone_number = %entry.value().phone_number,
                "Registered caller"
            );
        }
    }
}
