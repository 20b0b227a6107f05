//! OpenAI Realtime API WebSocket message types.
//!
//! Client events (sent by the bridge):
//! - session.update - Configure the session once after dialing
//! - conversation.item.create - Greeting message and function call output
//! - response.create - Ask the model to speak
//! - input_audio_buffer.append - Caller audio (g711 µ-law, base64)
//!
//! Server events (received by the bridge) are an open vocabulary. Only the
//! kinds the bridge acts on get their own variant; everything else decodes to
//! [`ServerEvent::Unknown`] with its raw fields so nothing is lost for logging.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{CodecError, CodecResult};

/// Default OpenAI Realtime endpoint, pinned to the model the bridge is tuned for.
pub const OPENAI_REALTIME_URL: &str =
    "wss://api.openai.com/v1/realtime?model=gpt-4o-realtime-preview-2024-10-01";

/// Beta header value required by the realtime endpoint.
pub const OPENAI_BETA_HEADER: &str = "realtime=v1";

/// Telephony audio format used in both directions.
pub const G711_ULAW: &str = "g711_ulaw";

/// Item id of the greeting message seeded into every conversation.
pub const GREETING_ITEM_ID: &str = "greeting_01";

// =============================================================================
// Voices
// =============================================================================

/// Available voices for the OpenAI Realtime API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RealtimeVoice {
    /// Alloy voice (default)
    #[default]
    Alloy,
    Ash,
    Ballad,
    Coral,
    Echo,
    Sage,
    Shimmer,
    Verse,
}

impl RealtimeVoice {
    /// Convert to the API parameter value.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alloy => "alloy",
            Self::Ash => "ash",
            Self::Ballad => "ballad",
            Self::Coral => "coral",
            Self::Echo => "echo",
            Self::Sage => "sage",
            Self::Shimmer => "shimmer",
            Self::Verse => "verse",
        }
    }

    /// Parse a voice name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "alloy" => Some(Self::Alloy),
            "ash" => Some(Self::Ash),
            "ballad" => Some(Self::Ballad),
            "coral" => Some(Self::Coral),
            "echo" => Some(Self::Echo),
            "sage" => Some(Self::Sage),
            "shimmer" => Some(Self::Shimmer),
            "verse" => Some(Self::Verse),
            _ => None,
        }
    }
}

impl std::fmt::Display for RealtimeVoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Session Configuration
// =============================================================================

/// Session configuration sent with `session.update`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Turn detection configuration
    pub turn_detection: TurnDetection,

    /// Input audio format
    pub input_audio_format: String,

    /// Output audio format
    pub output_audio_format: String,

    /// Voice for audio output
    pub voice: String,

    /// System instructions for the assistant
    pub instructions: String,

    /// Response modalities (text, audio)
    pub modalities: Vec<String>,

    /// Temperature for response generation
    pub temperature: f32,

    /// Tool definitions
    pub tools: Vec<ToolDef>,
}

impl SessionConfig {
    /// Telephony session: server VAD, µ-law both ways, text and audio out.
    pub fn telephony(
        instructions: impl Into<String>,
        voice: RealtimeVoice,
        temperature: f32,
        tools: Vec<ToolDef>,
    ) -> Self {
        Self {
            turn_detection: TurnDetection::ServerVad,
            input_audio_format: G711_ULAW.to_string(),
            output_audio_format: G711_ULAW.to_string(),
            voice: voice.as_str().to_string(),
            instructions: instructions.into(),
            modalities: vec!["text".to_string(), "audio".to_string()],
            temperature,
            tools,
        }
    }
}

/// Turn detection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TurnDetection {
    /// Server-side VAD with provider defaults
    #[serde(rename = "server_vad")]
    ServerVad,
}

/// Tool definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDef {
    /// Tool type (always "function")
    #[serde(rename = "type")]
    pub tool_type: String,
    /// Function name
    pub name: String,
    /// Function description
    pub description: String,
    /// Function parameters JSON schema
    pub parameters: Value,
}

impl ToolDef {
    /// Function tool with a JSON schema for its parameters.
    pub fn function(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            tool_type: "function".to_string(),
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

// =============================================================================
// Conversation Items
// =============================================================================

/// Conversation item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationItem {
    /// Item ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Item type
    #[serde(rename = "type")]
    pub item_type: String,
    /// Item role (user, assistant, system)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Content parts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<ContentPart>>,
    /// Call ID for function call output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
    /// Function output for function call result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Content part within a conversation item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPart {
    /// Content type (text, input_text)
    #[serde(rename = "type")]
    pub content_type: String,
    /// Text content
    pub text: String,
}

// =============================================================================
// Client Events (sent to server)
// =============================================================================

/// Client events sent to the OpenAI Realtime API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Update session configuration
    #[serde(rename = "session.update")]
    SessionUpdate {
        /// Session configuration
        session: Box<SessionConfig>,
    },

    /// Append audio to input buffer
    #[serde(rename = "input_audio_buffer.append")]
    InputAudioBufferAppend {
        /// Base64-encoded audio data, forwarded untouched
        audio: String,
    },

    /// Create a conversation item
    #[serde(rename = "conversation.item.create")]
    ConversationItemCreate {
        /// Item to create
        item: ConversationItem,
    },

    /// Create a response
    #[serde(rename = "response.create")]
    ResponseCreate,
}

impl ClientEvent {
    /// `session.update` carrying the full session configuration.
    pub fn session_update(session: SessionConfig) -> Self {
        ClientEvent::SessionUpdate {
            session: Box::new(session),
        }
    }

    /// Assistant greeting seeded before the caller says anything.
    pub fn greeting(text: impl Into<String>) -> Self {
        ClientEvent::ConversationItemCreate {
            item: ConversationItem {
                id: Some(GREETING_ITEM_ID.to_string()),
                item_type: "message".to_string(),
                role: Some("assistant".to_string()),
                content: Some(vec![ContentPart {
                    content_type: "text".to_string(),
                    text: text.into(),
                }]),
                ..Default::default()
            },
        }
    }

    /// Caller audio, already base64 encoded by the telephony provider.
    pub fn audio_append(payload: impl Into<String>) -> Self {
        ClientEvent::InputAudioBufferAppend {
            audio: payload.into(),
        }
    }

    /// Result of a function call, correlated by `call_id`.
    pub fn function_call_output(call_id: impl Into<String>, output: impl Into<String>) -> Self {
        ClientEvent::ConversationItemCreate {
            item: ConversationItem {
                item_type: "function_call_output".to_string(),
                call_id: Some(call_id.into()),
                output: Some(output.into()),
                ..Default::default()
            },
        }
    }

    /// Event type as it appears on the wire.
    pub fn event_type(&self) -> &'static str {
        match self {
            ClientEvent::SessionUpdate { .. } => "session.update",
            ClientEvent::InputAudioBufferAppend { .. } => "input_audio_buffer.append",
            ClientEvent::ConversationItemCreate { .. } => "conversation.item.create",
            ClientEvent::ResponseCreate => "response.create",
        }
    }
}

// =============================================================================
// Server Events (received from server)
// =============================================================================

/// Server event kinds that are only logged.
pub const LOGGED_EVENT_TYPES: &[&str] = &[
    "response.content.done",
    "rate_limits.updated",
    "response.done",
    "input_audio_buffer.committed",
    "input_audio_buffer.speech_stopped",
    "input_audio_buffer.speech_started",
    "session.created",
];

/// Server events received from the OpenAI Realtime API.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// Error occurred. Carries every field of the event except `type`.
    Error { fields: Map<String, Value> },

    /// Audio data chunk; `delta` is `None` when the payload is missing or not a string
    AudioDelta { delta: Option<String> },

    /// Session created
    SessionCreated,

    /// Response complete
    ResponseDone,

    /// Content part complete
    ResponseContentDone,

    /// Rate limits updated
    RateLimitsUpdated,

    /// Audio buffer committed
    InputAudioBufferCommitted,

    /// VAD detected speech
    SpeechStarted,

    /// VAD detected silence
    SpeechStopped,

    /// Any other event kind
    Unknown {
        event_type: String,
        fields: Map<String, Value>,
    },
}

impl ServerEvent {
    /// Event type as it appears on the wire.
    pub fn event_type(&self) -> &str {
        match self {
            ServerEvent::Error { .. } => "error",
            ServerEvent::AudioDelta { .. } => "response.audio.delta",
            ServerEvent::SessionCreated => "session.created",
            ServerEvent::ResponseDone => "response.done",
            ServerEvent::ResponseContentDone => "response.content.done",
            ServerEvent::RateLimitsUpdated => "rate_limits.updated",
            ServerEvent::InputAudioBufferCommitted => "input_audio_buffer.committed",
            ServerEvent::SpeechStarted => "input_audio_buffer.speech_started",
            ServerEvent::SpeechStopped => "input_audio_buffer.speech_stopped",
            ServerEvent::Unknown { event_type, .. } => event_type,
        }
    }

    /// Whether this kind is in the diagnostic vocabulary.
    pub fn is_logged(&self) -> bool {
        LOGGED_EVENT_TYPES.contains(&self.event_type())
    }

    fn classify(event_type: String, mut fields: Map<String, Value>) -> Self {
        match event_type.as_str() {
            "error" => ServerEvent::Error { fields },
            "response.audio.delta" => ServerEvent::AudioDelta {
                delta: match fields.remove("delta") {
                    Some(Value::String(delta)) => Some(delta),
                    _ => None,
                },
            },
            "session.created" => ServerEvent::SessionCreated,
            "response.done" => ServerEvent::ResponseDone,
            "response.content.done" => ServerEvent::ResponseContentDone,
            "rate_limits.updated" => ServerEvent::RateLimitsUpdated,
            "input_audio_buffer.committed" => ServerEvent::InputAudioBufferCommitted,
            "input_audio_buffer.speech_started" => ServerEvent::SpeechStarted,
            "input_audio_buffer.speech_stopped" => ServerEvent::SpeechStopped,
            _ => ServerEvent::Unknown { event_type, fields },
        }
    }
}

/// Nested `response` object carried by `response.*` lifecycle events.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResponseBody {
    /// Output items, untyped so one malformed item cannot hide the others
    #[serde(default)]
    pub output: Vec<Value>,
}

impl ResponseBody {
    /// The first output item, if it is a well-formed function call.
    ///
    /// Any missing or non-string field yields `None`.
    pub fn function_call(&self) -> Option<FunctionCallItem> {
        let first = self.output.first()?.as_object()?;
        if first.get("type")?.as_str()? != "function_call" {
            return None;
        }

        Some(FunctionCallItem {
            name: first.get("name")?.as_str()?.to_string(),
            arguments: first.get("arguments")?.as_str()?.to_string(),
            call_id: first.get("call_id")?.as_str()?.to_string(),
        })
    }
}

/// A function call requested by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCallItem {
    /// Function name
    pub name: String,
    /// JSON-encoded arguments
    pub arguments: String,
    /// Call ID echoed back with the output
    pub call_id: String,
}

/// One decoded server message.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerMessage {
    /// The event, classified by its `type`
    pub event: ServerEvent,
    /// Nested response object, when present and shaped like one
    pub response: Option<ResponseBody>,
}

impl ServerMessage {
    /// Decode a text frame from the realtime socket.
    ///
    /// Fails only when the frame is not a JSON object. A missing or
    /// non-string `type` decodes as an unknown event with an empty kind.
    pub fn decode(text: &str) -> CodecResult<Self> {
        let mut fields = match serde_json::from_str::<Value>(text)? {
            Value::Object(fields) => fields,
            _ => return Err(CodecError::NotAnObject),
        };

        let event_type = match fields.remove("type") {
            Some(Value::String(event_type)) => event_type,
            _ => String::new(),
        };

        let response = fields
            .get("response")
            .filter(|value| value.is_object())
            .and_then(|value| ResponseBody::deserialize(value).ok());

        Ok(Self {
            event: ServerEvent::classify(event_type, fields),
            response,
        })
    }

    /// The function call carried by this message, if any.
    pub fn function_call(&self) -> Option<FunctionCallItem> {
        self.response.as_ref().and_then(ResponseBody::function_call)
    }
}

// =============================================================================
// Tests
// =============================================================================
