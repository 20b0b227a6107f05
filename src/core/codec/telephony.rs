//! Twilio Media Streams message types.
//!
//! Inbound frames are JSON objects discriminated by `event`:
//! `connected`, `start`, `media`, `mark`, `stop`. Outbound frames are only
//! ever `media`, carrying AI audio back to the caller.

use serde::Serialize;
use serde_json::{Map, Value};

use super::{CodecError, CodecResult};

/// Event received on the telephony socket.
#[derive(Debug, Clone, PartialEq)]
pub enum TelephonyEvent {
    /// Socket-level handshake from the provider
    Connected,

    /// Stream metadata; always the first event after `connected`
    Start {
        stream_sid: String,
        call_sid: Option<String>,
    },

    /// Base64 µ-law audio from the caller
    Media { payload: String },

    /// Playback marker acknowledgement
    Mark { name: Option<String> },

    /// Stream ended
    Stop,

    /// Any other event kind
    Unknown {
        event: String,
        fields: Map<String, Value>,
    },
}

impl TelephonyEvent {
    /// Decode one text frame.
    ///
    /// A `start` without a stream identifier or a `media` without a payload
    /// is a decode error; the reader skips those frames.
    pub fn decode(text: &str) -> CodecResult<Self> {
        let mut fields = match serde_json::from_str::<Value>(text)? {
            Value::Object(fields) => fields,
            _ => return Err(CodecError::NotAnObject),
        };

        let event = match fields.remove("event") {
            Some(Value::String(event)) => event,
            _ => String::new(),
        };

        match event.as_str() {
            "connected" => Ok(TelephonyEvent::Connected),
            "start" => {
                let start = fields.get("start");
                let stream_sid = start
                    .and_then(|s| str_field(s, "streamSid"))
                    .or_else(|| fields.get("streamSid").and_then(Value::as_str))
                    .ok_or(CodecError::MissingField {
                        event: "start",
                        field: "streamSid",
                    })?
                    .to_string();
                let call_sid = start
                    .and_then(|s| str_field(s, "callSid"))
                    .map(str::to_string);

                Ok(TelephonyEvent::Start {
                    stream_sid,
                    call_sid,
                })
            }
            "media" => {
                let payload = fields
                    .get("media")
                    .and_then(|m| str_field(m, "payload"))
                    .ok_or(CodecError::MissingField {
                        event: "media",
                        field: "payload",
                    })?
                    .to_string();

                Ok(TelephonyEvent::Media { payload })
            }
            "mark" => Ok(TelephonyEvent::Mark {
                name: fields
                    .get("mark")
                    .and_then(|m| str_field(m, "name"))
                    .map(str::to_string),
            }),
            "stop" => Ok(TelephonyEvent::Stop),
            _ => Ok(TelephonyEvent::Unknown { event, fields }),
        }
    }

    /// Event kind as it appears on the wire.
    pub fn kind(&self) -> &str {
        match self {
            TelephonyEvent::Connected => "connected",
            TelephonyEvent::Start { .. } => "start",
            TelephonyEvent::Media { .. } => "media",
            TelephonyEvent::Mark { .. } => "mark",
            TelephonyEvent::Stop => "stop",
            TelephonyEvent::Unknown { event, .. } => event,
        }
    }
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

/// Event sent on the telephony socket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum TelephonyOutbound {
    /// Audio for the caller
    Media {
        #[serde(rename = "streamSid")]
        stream_sid: String,
        media: MediaPayload,
    },
}

/// Payload of an outbound media frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaPayload {
    /// Base64 µ-law audio, forwarded untouched
    pub payload: String,
}

impl TelephonyOutbound {
    /// Media frame for the given stream.
    pub fn media(stream_sid: impl Into<String>, payload: impl Into<String>) -> Self {
        TelephonyOutbound::Media {
            stream_sid: stream_sid.into(),
            media: MediaPayload {
                payload: payload.into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_start() {
        let frame = json!({
            "event": "start",
            "sequenceNumber": "1",
            "start": {
                "accountSid": "AC0",
                "streamSid": "MZ123",
                "callSid": "CA123",
                "tracks": ["inbound"],
                "mediaFormat": {"encoding": "audio/x-mulaw", "sampleRate": 8000, "channels": 1}
            },
            "streamSid": "MZ123"
        });

        let event = TelephonyEvent::decode(&frame.to_string()).unwrap();
        assert_eq!(
            event,
            TelephonyEvent::Start {
                stream_sid: "MZ123".to_string(),
                call_sid: Some("CA123".to_string()),
            }
        );
    }

    #[test]
    fn test_decode_start_falls_back_to_top_level_sid() {
        let event =
            TelephonyEvent::decode(r#"{"event":"start","start":{},"streamSid":"MZ9"}"#).unwrap();
        assert_eq!(
            event,
            TelephonyEvent::Start {
                stream_sid: "MZ9".to_string(),
                call_sid: None,
            }
        );
    }

    #[test]
    fn test_decode_start_without_sid_fails() {
        let err = TelephonyEvent::decode(r#"{"event":"start","start":{}}"#).unwrap_err();
        assert!(matches!(
            err,
            CodecError::MissingField {
                event: "start",
                field: "streamSid"
            }
        ));
    }

    #[test]
    fn test_decode_media() {
        let frame = json!({
            "event": "media",
            "sequenceNumber": "3",
            "media": {"track": "inbound", "chunk": "1", "timestamp": "5", "payload": "AAEC"},
            "streamSid": "MZ123"
        });

        let event = TelephonyEvent::decode(&frame.to_string()).unwrap();
        assert_eq!(
            event,
            TelephonyEvent::Media {
                payload: "AAEC".to_string()
            }
        );
    }

    #[test]
    fn test_decode_media_without_payload_fails() {
        assert!(TelephonyEvent::decode(r#"{"event":"media","media":{}}"#).is_err());
        assert!(TelephonyEvent::decode(r#"{"event":"media","media":{"payload":7}}"#).is_err());
    }

    #[test]
    fn test_decode_other_kinds() {
        assert_eq!(
            TelephonyEvent::decode(r#"{"event":"connected","protocol":"Call","version":"1.0.0"}"#)
                .unwrap(),
            TelephonyEvent::Connected
        );
        assert_eq!(
            TelephonyEvent::decode(r#"{"event":"stop","streamSid":"MZ1"}"#).unwrap(),
            TelephonyEvent::Stop
        );
        assert_eq!(
            TelephonyEvent::decode(r#"{"event":"mark","mark":{"name":"end"}}"#).unwrap(),
            TelephonyEvent::Mark {
                name: Some("end".to_string())
            }
        );

        let unknown = TelephonyEvent::decode(r#"{"event":"dtmf","dtmf":{"digit":"1"}}"#).unwrap();
        assert_eq!(unknown.kind(), "dtmf");
        match unknown {
            TelephonyEvent::Unknown { fields, .. } => assert_eq!(fields["dtmf"]["digit"], "1"),
            other => panic!("Expected unknown event, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_malformed() {
        assert!(matches!(
            TelephonyEvent::decode("not json"),
            Err(CodecError::Json(_))
        ));
        assert!(matches!(
            TelephonyEvent::decode("\"media\""),
            Err(CodecError::NotAnObject)
        ));
    }

    #[test]
    fn test_outbound_media_serialization() {
        let frame = TelephonyOutbound::media("MZ123", "UklGRg==");
        assert_eq!(
            serde_json::to_value(&frame).unwrap(),
            json!({"event": "media", "streamSid": "MZ123", "media": {"payload": "UklGRg=="}})
        );
    }
}
