//! Media-stream WebSocket route configuration

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::handlers::{media_stream, media_stream_for_number};
use crate::state::AppState;
use std::sync::Arc;

/// Create the media-stream WebSocket router
///
/// # Endpoints
///
/// - `GET /media-stream/{number}` - WebSocket upgrade for a known caller
/// - `GET /media-stream` - WebSocket upgrade without caller number
///
/// # Protocol
///
/// The telephony provider sends `connected`, `start`, `media`, `mark` and
/// `stop` events as JSON text frames. The server replies with `media` events
/// carrying the assistant's audio for the stream.
pub fn create_media_stream_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/media-stream", get(media_stream))
        .route("/media-stream/{number}", get(media_stream_for_number))
        .layer(TraceLayer::new_for_http())
}
