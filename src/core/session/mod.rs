//! Call session orchestration.

mod orchestrator;
mod settings;
mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use orchestrator::{CallSession, UNKNOWN_CALLER};
pub use settings::{
    CallSettings, DEFAULT_FALLBACK_EMAIL, DEFAULT_INTERRUPTION_LOCK, DEFAULT_TRANSFER_DELAY,
    UNKNOWN_CALLER_NUMBER,
};
pub use store::{CallServices, SessionStore};
