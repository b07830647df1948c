//! HTTP and WebSocket request handlers
//!
//! - `api` - Health check endpoint
//! - `incoming_call` - Telephony webhook answering new calls
//! - `media_stream` - Media stream WebSocket driving one call session

pub mod api;
pub mod incoming_call;
pub mod media_stream;

pub use incoming_call::incoming_call;
pub use media_stream::media_stream_handler;
