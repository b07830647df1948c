//! Maximum call duration enforcement.
//!
//! Each started call gets a deadline task. When it fires, the call-control
//! API is asked to complete the call. Stopping the timer aborts the deadline
//! and reports how long the call lasted.

use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::core::telephony::{CallControl, CallUpdate};

/// Ten minutes.
pub const DEFAULT_MAX_CALL_DURATION: Duration = Duration::from_secs(10 * 60);

struct TimerEntry {
    started_at: Instant,
    deadline: JoinHandle<()>,
    generation: u64,
}

pub struct CallTimers {
    entries: Arc<DashMap<String, TimerEntry>>,
    control: Arc<dyn CallControl>,
    max_duration: Duration,
    generation: AtomicU64,
}

impl CallTimers {
    pub fn new(control: Arc<dyn CallControl>, max_duration: Duration) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            control,
            max_duration,
            generation: AtomicU64::new(0),
        }
    }

    pub fn max_duration(&self) -> Duration {
        self.max_duration
    }

    /// Arm the deadline for a call. Re-arming aborts the previous deadline
    /// so there is never more than one per call.
    pub fn start(&self, call_sid: &str) {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let entries = self.entries.clone();
        let control = self.control.clone();
        let max_duration = self.max_duration;
        let sid = call_sid.to_string();

        let deadline = tokio::spawn(async move {
            tokio::time::sleep(max_duration).await;

            // Only the entry this task was spawned for may be cleared
            let removed = entries
                .remove_if(&sid, |_, entry| entry.generation == generation)
                .is_some();
            if !removed {
                return;
            }

            warn!(
                call_sid = %sid,
                max_secs = max_duration.as_secs(),
                "Maximum call duration reached, completing call"
            );
            if let Err(e) = control.update_call(&sid, CallUpdate::Completed).await {
                error!(call_sid = %sid, "Failed to complete call at deadline: {}", e);
            }
        });

        let entry = TimerEntry {
            started_at: Instant::now(),
            deadline,
            generation,
        };

        if let Some(previous) = self.entries.insert(call_sid.to_string(), entry) {
            previous.deadline.abort();
        }

        info!(call_sid = %call_sid, "Call timer started");
    }

    /// Cancel the deadline and return the elapsed call time, or `None` when
    /// no timer is active (never started, already stopped, or already fired).
    pub fn stop(&self, call_sid: &str) -> Option<Duration> {
        let (_, entry) = self.entries.remove(call_sid)?;
        entry.deadline.abort();

        let duration = entry.started_at.elapsed();
        info!(
            call_sid = %call_sid,
            duration_ms = duration.as_millis() as u64,
            "Call timer stopped"
        );
        Some(duration)
    }

    pub fn elapsed(&self, call_sid: &str) -> Option<Duration> {
        self.entries
            .get(call_sid)
            .map(|entry| entry.started_at.elapsed())
    }

    pub fn is_active(&self, call_sid: &str) -> bool {
        self.entries.contains_key(call_sid)
    }

    pub fn active_count(&self) -> usize {
        self.entries.len()
    }
}

impl Drop for CallTimers {
    fn drop(&mut self) {
        for entry in self.entries.iter() {
            entry.deadline.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::telephony::testing::RecordingCallControl;

    fn timers(control: Arc<RecordingCallControl>) -> CallTimers {
        CallTimers::new(control, Duration::from_secs(600))
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_completes_call() {
        let control = Arc::new(RecordingCallControl::default());
        let timers = timers(control.clone());

        timers.start("CA1");
        assert!(timers.is_active("CA1"));

        tokio::time::sleep(Duration::from_secs(601)).await;
        tokio::task::yield_now().await;

        assert!(!timers.is_active("CA1"));
        assert_eq!(
            control.updates(),
            vec![("CA1".to_string(), CallUpdate::Completed)]
        );
        assert!(timers.stop("CA1").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_deadline_and_reports_duration() {
        let control = Arc::new(RecordingCallControl::default());
        let timers = timers(control.clone());

        timers.start("CA1");
        tokio::time::sleep(Duration::from_secs(42)).await;

        let duration = timers.stop("CA1").unwrap();
        assert_eq!(duration.as_secs(), 42);

        tokio::time::sleep(Duration::from_secs(1200)).await;
        tokio::task::yield_now().await;
        assert!(control.updates().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_keeps_single_deadline() {
        let control = Arc::new(RecordingCallControl::default());
        let timers = timers(control.clone());

        timers.start("CA1");
        tokio::time::sleep(Duration::from_secs(300)).await;
        timers.start("CA1");
        assert_eq!(timers.active_count(), 1);

        // First deadline would have fired here
        tokio::time::sleep(Duration::from_secs(301)).await;
        tokio::task::yield_now().await;
        assert!(control.updates().is_empty());
        assert!(timers.is_active("CA1"));

        tokio::time::sleep(Duration::from_secs(300)).await;
        tokio::task::yield_now().await;
        assert_eq!(control.updates().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed() {
        let control = Arc::new(RecordingCallControl::default());
        let timers = timers(control);

        assert!(timers.elapsed("CA1").is_none());
        timers.start("CA1");
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(timers.elapsed("CA1").unwrap().as_millis(), 1500);
    }
}
