pub mod bridge;
pub mod codec;
pub mod functions;
pub mod webhook;

// Re-export commonly used types for convenience
pub use bridge::{BridgeError, BridgeResult, SessionBridge, SessionState, StreamSid};

pub use codec::{
    ClientEvent, CodecError, CodecResult, FunctionCallItem, RealtimeVoice, ServerEvent,
    ServerMessage, TelephonyEvent, TelephonyOutbound,
};

pub use functions::{Function, FunctionDispatcher, FunctionError, FunctionResult};

pub use webhook::{ScheduleRequest, ScheduleWebhook, WebhookClient, WebhookError, WebhookResult};
