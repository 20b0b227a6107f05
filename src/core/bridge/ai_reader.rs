//! Read loop on the realtime socket.

use std::fmt::Display;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::frame::{Inbound, WsFrame};
use super::stream_sid::StreamSid;
use crate::core::codec::{ClientEvent, ServerEvent, ServerMessage, TelephonyOutbound};
use crate::core::functions::{Function, FunctionDispatcher};

/// Consumes realtime server events for one session.
pub struct AiReader {
    pub telephony_tx: mpsc::Sender<TelephonyOutbound>,
    pub ai_tx: mpsc::Sender<ClientEvent>,
    pub stream_sid: StreamSid,
    pub dispatcher: Arc<FunctionDispatcher>,
    pub phone_number: String,
}

impl AiReader {
    /// Read until the realtime socket closes, fails, or `cancel` fires.
    /// Cancels `cancel` on exit.
    pub async fn run<St, F, E>(self, mut stream: St, cancel: CancellationToken)
    where
        St: Stream<Item = Result<F, E>> + Unpin,
        F: WsFrame,
        E: Display,
    {
        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Realtime reader cancelled");
                    break;
                }
                next = stream.next() => next,
            };

            let text = match next {
                Some(Ok(frame)) => match frame.into_inbound() {
                    Inbound::Text(text) => text,
                    Inbound::Close => {
                        info!("Realtime socket closed by server");
                        break;
                    }
                    Inbound::Other => continue,
                },
                Some(Err(e)) => {
                    error!(error = %e, "Realtime socket read failed");
                    break;
                }
                None => {
                    info!("Realtime stream ended");
                    break;
                }
            };

            match ServerMessage::decode(&text) {
                Ok(message) => self.handle(message).await,
                Err(e) => warn!(error = %e, "Skipping undecodable realtime message"),
            }
        }

        cancel.cancel();
    }

    async fn handle(&self, message: ServerMessage) {
        match &message.event {
            ServerEvent::Error { fields } => {
                let event = Value::Object(fields.clone());
                error!(event = %event, "Realtime API error");
            }
            ServerEvent::AudioDelta { delta: Some(delta) } => {
                let frame = TelephonyOutbound::media(self.stream_sid.current().as_str(), delta.as_str());
                if self.telephony_tx.send(frame).await.is_err() {
                    warn!("Telephony writer gone, dropping assistant audio");
                }
            }
            event if event.is_logged() => {
                info!(event_type = event.event_type(), "Received realtime event");
            }
            _ => {}
        }

        let Some(call) = message.function_call() else {
            return;
        };

        if Function::from_name(&call.name).is_none() {
            debug!(function = %call.name, "Ignoring call to unknown function");
            return;
        }

        info!(call_id = %call.call_id, function = %call.name, "Dispatching function call");

        match self.dispatcher.dispatch(&call, &self.phone_number).await {
            Ok(events) => {
                for event in events {
                    if self.ai_tx.send(event).await.is_err() {
                        warn!(call_id = %call.call_id, "Realtime writer gone, dropping function output");
                        break;
                    }
                }
            }
            Err(e) => {
                error!(call_id = %call.call_id, error = %e, "Function call failed");
            }
        }
    }
}
