//! Wire vocabularies of the two sockets a session bridges.
//!
//! - [`telephony`]: the media-streaming provider (Twilio Media Streams)
//! - [`realtime`]: the OpenAI Realtime API
//!
//! Each vocabulary decodes into a sum type with an unknown fallback, so an
//! unexpected event kind is data rather than an error.

pub mod realtime;
pub mod telephony;

use thiserror::Error;

/// Errors produced while decoding a wire message.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Frame is not valid JSON
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Frame is valid JSON but not an object
    #[error("Message is not a JSON object")]
    NotAnObject,

    /// A field the event kind requires is absent or has the wrong type
    #[error("Missing field '{field}' in '{event}' event")]
    MissingField {
        event: &'static str,
        field: &'static str,
    },
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

pub use realtime::{
    ClientEvent, FunctionCallItem, RealtimeVoice, ServerEvent, ServerMessage, SessionConfig,
    ToolDef,
};
pub use telephony::{TelephonyEvent, TelephonyOutbound};
