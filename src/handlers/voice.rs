//! Incoming-call webhook.
//!
//! The telephony provider calls this when a call arrives and expects a TwiML
//! document telling it where to stream the call's audio.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::info;
use url::Url;

use crate::state::AppState;

/// Call parameters the provider sends with the webhook.
#[derive(Debug, Default, Deserialize)]
pub struct CallParams {
    /// Caller phone number
    #[serde(rename = "From")]
    pub from: Option<String>,
}

/// Answer an incoming call with a `<Connect><Stream>` document.
///
/// The caller number is read from the form body first, then the query
/// string; without one the stream URL has no caller segment. The stream
/// host is the configured public host, else the request's `Host` header.
pub async fn incoming_call(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<CallParams>,
    body: Bytes,
) -> Response {
    let from = url::form_urlencoded::parse(&body)
        .find(|(key, _)| key == "From")
        .map(|(_, value)| value.into_owned())
        .or(query.from)
        .unwrap_or_default();

    let host = state
        .config
        .public_host
        .clone()
        .or_else(|| {
            headers
                .get(header::HOST)
                .and_then(|h| h.to_str().ok())
                .map(str::to_string)
        })
        .unwrap_or_else(|| state.config.address());

    info!(from = %from, host = %host, "Incoming call");

    (
        [(header::CONTENT_TYPE, "text/xml")],
        connect_document(&host, &from),
    )
        .into_response()
}

/// TwiML pointing the provider at this server's media-stream socket.
pub fn connect_document(host: &str, from: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Response>
    <Connect>
        <Stream url="{}" />
    </Connect>
</Response>"#,
        xml_escape(&stream_url(host, from))
    )
}

fn stream_url(host: &str, from: &str) -> String {
    match Url::parse(&format!("wss://{host}/media-stream")) {
        Ok(mut url) => {
            if !from.is_empty() {
                if let Ok(mut segments) = url.path_segments_mut() {
                    segments.push(from);
                }
            }
            url.to_string()
        }
        Err(_) if from.is_empty() => format!("wss://{host}/media-stream"),
        Err(_) => format!("wss://{host}/media-stream/{from}"),
    }
}

fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}
