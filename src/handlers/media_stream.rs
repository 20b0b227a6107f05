//! Telephony media-stream WebSocket handler.

use std::sync::Arc;

use axum::{
    extract::{
        Path, State,
        ws::{WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use tracing::{error, info};

use crate::state::AppState;

/// Media stream for a caller whose number is in the path.
pub async fn media_stream_for_number(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(number): Path<String>,
) -> Response {
    upgrade(ws, state, number)
}

/// Media stream for an unknown caller.
pub async fn media_stream(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    upgrade(ws, state, String::new())
}

fn upgrade(ws: WebSocketUpgrade, state: Arc<AppState>, number: String) -> Response {
    info!(phone_number = %number, "Media stream connection upgrade requested");
    ws.on_upgrade(move |socket| handle_media_stream(socket, state, number))
}

async fn handle_media_stream(socket: WebSocket, state: Arc<AppState>, number: String) {
    if let Err(e) = state.bridge.run(socket, number).await {
        error!(error = %e, "Session ended with error");
    }
}
