use thiserror::Error;

/// Errors that end a session before it becomes active.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Realtime socket could not be opened
    #[error("Failed to connect to realtime API: {0}")]
    Dial(String),

    /// A handshake event could not be written
    #[error("Failed to send {event}: {reason}")]
    Handshake { event: &'static str, reason: String },
}

/// Result type for session bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
