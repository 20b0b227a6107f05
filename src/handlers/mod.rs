//! HTTP and WebSocket request handlers
//!
//! - `api` - Health check endpoint
//! - `voice` - Incoming-call webhook returning the connect document
//! - `media_stream` - Telephony media-stream WebSocket

pub mod api;
pub mod media_stream;
pub mod voice;

pub use media_stream::{media_stream, media_stream_for_number};
pub use voice::incoming_call;
