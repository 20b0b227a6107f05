//! Writer task: sole owner of one socket's sink.

use std::fmt::Display;

use futures::{Sink, SinkExt};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use super::frame::WsFrame;

/// Capacity of each per-socket outbound channel.
pub const WS_CHANNEL_CAPACITY: usize = 256;

/// Serialize queued events onto `sink` in channel order until every sender
/// is gone, then close the socket.
///
/// Write failures are logged and do not stop the task; the reader on the
/// same socket observes the broken connection and ends the session.
pub async fn forward_outbound<T, F, S>(mut rx: mpsc::Receiver<T>, mut sink: S, channel: &'static str)
where
    T: Serialize,
    F: WsFrame,
    S: Sink<F> + Unpin,
    S::Error: Display,
{
    while let Some(event) = rx.recv().await {
        let json = match serde_json::to_string(&event) {
            Ok(json) => json,
            Err(e) => {
                error!(channel, error = %e, "Failed to serialize outbound event");
                continue;
            }
        };

        if let Err(e) = sink.send(F::text(json)).await {
            warn!(channel, error = %e, "Failed to write to socket");
        }
    }

    if let Err(e) = sink.send(F::close()).await {
        debug!(channel, error = %e, "Close frame not delivered");
    }
    if let Err(e) = sink.close().await {
        debug!(channel, error = %e, "Socket already closed");
    }

    debug!(channel, "Writer finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bridge::frame::Inbound;
    use crate::core::codec::ClientEvent;
    use futures::channel::mpsc as fmpsc;
    use futures::StreamExt;
    use tokio_tungstenite::tungstenite::Message;

    #[tokio::test]
    async fn test_writes_in_order_then_closes() {
        let (tx, rx) = mpsc::channel(WS_CHANNEL_CAPACITY);
        let (sink, frames) = fmpsc::unbounded::<Message>();

        tx.send(ClientEvent::audio_append("AAA")).await.unwrap();
        tx.send(ClientEvent::ResponseCreate).await.unwrap();
        drop(tx);

        forward_outbound(rx, sink, "test").await;

        let frames: Vec<Inbound> = frames.map(<Message as WsFrame>::into_inbound).collect().await;
        assert_eq!(
            frames,
            vec![
                Inbound::Text(r#"{"type":"input_audio_buffer.append","audio":"AAA"}"#.to_string()),
                Inbound::Text(r#"{"type":"response.create"}"#.to_string()),
                Inbound::Close,
            ]
        );
    }

    #[tokio::test]
    async fn test_write_failure_is_not_fatal() {
        let (tx, rx) = mpsc::channel(WS_CHANNEL_CAPACITY);
        let (sink, frames) = fmpsc::unbounded::<Message>();
        drop(frames);

        tx.send(ClientEvent::ResponseCreate).await.unwrap();
        tx.send(ClientEvent::ResponseCreate).await.unwrap();
        drop(tx);

        // Returns once the channel drains even though every write fails.
        forward_outbound(rx, sink, "test").await;
    }
}
