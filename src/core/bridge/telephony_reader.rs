//! Read loop on the telephony socket.

use std::fmt::Display;

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::frame::{Inbound, WsFrame};
use super::stream_sid::StreamSid;
use crate::core::codec::{ClientEvent, TelephonyEvent};

/// Forward caller audio to the realtime socket until the telephony socket
/// closes, fails, or `cancel` fires. Cancels `cancel` on exit.
pub async fn run_telephony_reader<St, F, E>(
    mut stream: St,
    ai_tx: mpsc::Sender<ClientEvent>,
    stream_sid: StreamSid,
    cancel: CancellationToken,
) where
    St: Stream<Item = Result<F, E>> + Unpin,
    F: WsFrame,
    E: Display,
{
    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Telephony reader cancelled");
                break;
            }
            next = stream.next() => next,
        };

        let text = match next {
            Some(Ok(frame)) => match frame.into_inbound() {
                Inbound::Text(text) => text,
                Inbound::Close => {
                    info!("Telephony socket closed by peer");
                    break;
                }
                Inbound::Other => continue,
            },
            Some(Err(e)) => {
                warn!(error = %e, "Telephony socket read failed");
                break;
            }
            None => {
                info!("Telephony stream ended");
                break;
            }
        };

        let event = match TelephonyEvent::decode(&text) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "Skipping undecodable telephony message");
                continue;
            }
        };

        match event {
            TelephonyEvent::Media { payload } => {
                if ai_tx.send(ClientEvent::audio_append(payload)).await.is_err() {
                    warn!("Realtime writer gone, dropping caller audio");
                }
            }
            TelephonyEvent::Start {
                stream_sid: sid,
                call_sid,
            } => {
                info!(stream_sid = %sid, call_sid = ?call_sid, "Incoming stream has started");
                stream_sid.set(sid);
            }
            TelephonyEvent::Connected => debug!("Telephony stream connected"),
            TelephonyEvent::Mark { name } => debug!(mark = ?name, "Telephony mark"),
            TelephonyEvent::Stop => info!("Telephony stream stopped"),
            unknown @ TelephonyEvent::Unknown { .. } => {
                debug!(event = %unknown.kind(), "Received non-media event")
            }
        }
    }

    cancel.cancel();
}
