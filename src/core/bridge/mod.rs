//! Session bridge: one phone call wired to one realtime AI session.
//!
//! Each session runs four tasks:
//! - a reader and a writer on the telephony socket
//! - a reader and a writer on the realtime socket
//!
//! Readers translate inbound events and queue outbound ones on bounded
//! channels; each writer is the only owner of its socket's sink. When either
//! reader stops, the shared cancellation token stops the other, the channels
//! drain and both writers close their sockets.

mod ai_reader;
mod error;
mod frame;
mod stream_sid;
mod telephony_reader;
mod writer;

pub use ai_reader::AiReader;
pub use error::{BridgeError, BridgeResult};
pub use frame::{Inbound, WsFrame};
pub use stream_sid::StreamSid;
pub use telephony_reader::run_telephony_reader;
pub use writer::{WS_CHANNEL_CAPACITY, forward_outbound};

use std::fmt;
use std::sync::Arc;

use axum::extract::ws::{Message as AxumMessage, WebSocket};
use futures::{Sink, SinkExt, StreamExt};
use http::HeaderValue;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as TungsteniteMessage;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::core::codec::realtime::OPENAI_BETA_HEADER;
use crate::core::codec::{ClientEvent, SessionConfig, TelephonyOutbound};
use crate::core::functions::{FunctionDispatcher, tool_definitions};

/// Client side of the realtime connection.
pub type RealtimeSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Lifecycle of one session. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Handshaking,
    Active,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Connecting => "connecting",
            SessionState::Handshaking => "handshaking",
            SessionState::Active => "active",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

fn transition(state: SessionState) {
    info!(state = %state, "Session state changed");
}

/// Bridges telephony media streams to the realtime API.
#[derive(Clone)]
pub struct SessionBridge {
    config: Arc<ServerConfig>,
    dispatcher: Arc<FunctionDispatcher>,
}

impl SessionBridge {
    pub fn new(config: Arc<ServerConfig>, dispatcher: Arc<FunctionDispatcher>) -> Self {
        Self { config, dispatcher }
    }

    /// Run one call from an upgraded telephony socket until it ends.
    ///
    /// Both sockets are closed on every return path.
    pub async fn run(&self, telephony: WebSocket, phone_number: String) -> BridgeResult<()> {
        let session_id = Uuid::new_v4();
        let span = info_span!("session", %session_id, phone_number = %phone_number);

        async move {
            transition(SessionState::Connecting);

            let ai = match self.dial().await {
                Ok(ai) => ai,
                Err(e) => {
                    error!(error = %e, "Realtime dial failed");
                    close_telephony(telephony).await;
                    transition(SessionState::Closed);
                    return Err(e);
                }
            };

            let result = self.bridge(telephony, ai, phone_number).await;
            transition(SessionState::Closed);
            result
        }
        .instrument(span)
        .await
    }

    /// Open the realtime socket with the session credentials.
    pub async fn dial(&self) -> BridgeResult<RealtimeSocket> {
        let mut request = self
            .config
            .realtime_url
            .as_str()
            .into_client_request()
            .map_err(|e| BridgeError::Dial(e.to_string()))?;

        let authorization = HeaderValue::from_str(&format!("Bearer {}", self.config.openai_api_key))
            .map_err(|e| BridgeError::Dial(e.to_string()))?;
        let headers = request.headers_mut();
        headers.insert("Authorization", authorization);
        headers.insert("OpenAI-Beta", HeaderValue::from_static(OPENAI_BETA_HEADER));

        let (socket, _response) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(|e| BridgeError::Dial(e.to_string()))?;

        info!("Connected to OpenAI Realtime API");
        Ok(socket)
    }

    /// Handshake, then run the four session tasks to completion.
    pub async fn bridge(
        &self,
        telephony: WebSocket,
        mut ai: RealtimeSocket,
        phone_number: String,
    ) -> BridgeResult<()> {
        transition(SessionState::Handshaking);

        if let Err(e) = send_handshake(&mut ai, self.handshake()).await {
            error!(error = %e, "Realtime handshake failed");
            if let Err(e) = ai.close(None).await {
                debug!(error = %e, "Realtime socket already closed");
            }
            close_telephony(telephony).await;
            return Err(e);
        }

        transition(SessionState::Active);

        let (telephony_sink, telephony_stream) = telephony.split();
        let (ai_sink, ai_stream) = ai.split();

        let (telephony_tx, telephony_rx) = mpsc::channel::<TelephonyOutbound>(WS_CHANNEL_CAPACITY);
        let (ai_tx, ai_rx) = mpsc::channel::<ClientEvent>(WS_CHANNEL_CAPACITY);

        let stream_sid = StreamSid::new();
        let cancel = CancellationToken::new();

        let telephony_writer = tokio::spawn(
            forward_outbound::<_, AxumMessage, _>(telephony_rx, telephony_sink, "telephony")
                .in_current_span(),
        );
        let ai_writer = tokio::spawn(
            forward_outbound::<_, TungsteniteMessage, _>(ai_rx, ai_sink, "realtime")
                .in_current_span(),
        );

        let telephony_reader = tokio::spawn(
            run_telephony_reader(telephony_stream, ai_tx.clone(), stream_sid.clone(), cancel.clone())
                .in_current_span(),
        );

        let ai_reader = AiReader {
            telephony_tx,
            ai_tx,
            stream_sid,
            dispatcher: self.dispatcher.clone(),
            phone_number,
        };
        let ai_reader = tokio::spawn(ai_reader.run(ai_stream, cancel).in_current_span());

        let (telephony_reader, ai_reader, telephony_writer, ai_writer) =
            tokio::join!(telephony_reader, ai_reader, telephony_writer, ai_writer);

        for (task, result) in [
            ("telephony reader", telephony_reader),
            ("realtime reader", ai_reader),
            ("telephony writer", telephony_writer),
            ("realtime writer", ai_writer),
        ] {
            if let Err(e) = result {
                warn!(task, error = %e, "Session task panicked or was aborted");
            }
        }

        Ok(())
    }

    /// Events sent once, in order, before any audio flows.
    pub fn handshake(&self) -> [ClientEvent; 3] {
        let session = SessionConfig::telephony(
            self.config.system_message.clone(),
            self.config.voice,
            self.config.temperature,
            tool_definitions(),
        );

        [
            ClientEvent::session_update(session),
            ClientEvent::greeting(self.config.greeting.clone()),
            ClientEvent::ResponseCreate,
        ]
    }
}

/// Write the handshake events to `sink` in order, stopping at the first failure.
pub async fn send_handshake<S>(sink: &mut S, events: [ClientEvent; 3]) -> BridgeResult<()>
where
    S: Sink<TungsteniteMessage> + Unpin,
    S::Error: fmt::Display,
{
    for event in &events {
        let handshake_error = |reason: String| BridgeError::Handshake {
            event: event.event_type(),
            reason,
        };

        let json = serde_json::to_string(event).map_err(|e| handshake_error(e.to_string()))?;
        sink.send(TungsteniteMessage::text(json))
            .await
            .map_err(|e| handshake_error(e.to_string()))?;

        debug!(event_type = event.event_type(), "Sent handshake event");
    }

    Ok(())
}

async fn close_telephony(mut telephony: WebSocket) {
    if let Err(e) = telephony.send(AxumMessage::Close(None)).await {
        debug!(error = %e, "Telephony socket already closed");
    }
}
