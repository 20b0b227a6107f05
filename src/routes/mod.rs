pub mod api;
pub mod media_stream;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

/// Full application router with state applied.
pub fn create_app(state: Arc<AppState>) -> Router {
    api::create_api_router()
        .merge(media_stream::create_media_stream_router())
        .with_state(state)
}
