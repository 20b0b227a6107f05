//! Minimal view of a WebSocket frame shared by the server-side (axum) and
//! client-side (tungstenite) socket types.

use axum::extract::ws::Message as AxumMessage;
use tokio_tungstenite::tungstenite::Message as TungsteniteMessage;

/// What a reader does with an inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Text(String),
    Close,
    /// Binary, ping, pong and raw frames
    Other,
}

/// A WebSocket message type the bridge can read and write.
pub trait WsFrame: Sized + Send + 'static {
    /// Text frame carrying one JSON message.
    fn text(json: String) -> Self;

    /// Close frame without a status.
    fn close() -> Self;

    fn into_inbound(self) -> Inbound;
}

impl WsFrame for AxumMessage {
    fn text(json: String) -> Self {
        AxumMessage::Text(json.into())
    }

    fn close() -> Self {
        AxumMessage::Close(None)
    }

    fn into_inbound(self) -> Inbound {
        match self {
            AxumMessage::Text(text) => Inbound::Text(text.as_str().to_owned()),
            AxumMessage::Close(_) => Inbound::Close,
            _ => Inbound::Other,
        }
    }
}

impl WsFrame for TungsteniteMessage {
    fn text(json: String) -> Self {
        TungsteniteMessage::Text(json.into())
    }

    fn close() -> Self {
        TungsteniteMessage::Close(None)
    }

    fn into_inbound(self) -> Inbound {
        match self {
            TungsteniteMessage::Text(text) => Inbound::Text(text.as_str().to_owned()),
            TungsteniteMessage::Close(_) => Inbound::Close,
            _ => Inbound::Other,
        }
    }
}
