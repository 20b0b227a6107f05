//! Server Startup Tests
//!
//! Tests for the HTTP surface: health check, incoming-call connect document,
//! and media-stream upgrade rejection for plain HTTP requests.

use std::net::TcpListener;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use tower::util::ServiceExt;

use waav_voice_bridge::{RealtimeVoice, ServerConfig, routes, state::AppState};

/// Helper function to create a minimal test configuration
fn create_minimal_config(port: u16) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port,
        public_host: None,
        openai_api_key: "sk-test".to_string(),
        realtime_url: "ws://127.0.0.1:9/v1/realtime".to_string(),
        system_message: "You schedule meetings".to_string(),
        greeting: "Hello".to_string(),
        voice: RealtimeVoice::Alloy,
        temperature: 0.8,
        webhook_url: "http://127.0.0.1:9/hook".to_string(),
    }
}

/// Find an available port for testing
fn find_available_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind to random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = routes::create_app(AppState::new(create_minimal_config(find_available_port())));

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(
        body,
        serde_json::json!({"message": "Twilio Media Stream Server is running!"})
    );
}

#[tokio::test]
async fn test_incoming_call_get_uses_host_header() {
    let app = routes::create_app(AppState::new(create_minimal_config(1313)));

    let request = Request::builder()
        .uri("/incoming-call?From=%2B15551234567&CallSid=CA1")
        .header(header::HOST, "abc.ngrok.app")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/xml");

    let body = body_string(response).await;
    assert!(body.contains("<Connect>"), "{body}");
    assert!(
        body.contains(r#"<Stream url="wss://abc.ngrok.app/media-stream/+15551234567" />"#),
        "{body}"
    );
}

#[tokio::test]
async fn test_incoming_call_post_form_with_public_host() {
    let mut config = create_minimal_config(1313);
    config.public_host = Some("calls.example.com".to_string());
    let app = routes::create_app(AppState::new(config));

    let request = Request::builder()
        .method("POST")
        .uri("/incoming-call")
        .header(header::HOST, "internal:1313")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("CallSid=CA1&From=%2B15557654321&To=%2B15550000000"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(
        body.contains(r#"url="wss://calls.example.com/media-stream/+15557654321""#),
        "{body}"
    );
}

#[tokio::test]
async fn test_incoming_call_without_caller() {
    let app = routes::create_app(AppState::new(create_minimal_config(1313)));

    let request = Request::builder()
        .method("POST")
        .uri("/incoming-call")
        .header(header::HOST, "abc.ngrok.app")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(
        body.contains(r#"url="wss://abc.ngrok.app/media-stream""#),
        "{body}"
    );
}

#[tokio::test]
async fn test_media_stream_requires_upgrade() {
    for uri in ["/media-stream", "/media-stream/%2B15551234567"] {
        let app = routes::create_app(AppState::new(create_minimal_config(1313)));

        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert!(
            response.status().is_client_error(),
            "{uri}: {}",
            response.status()
        );
    }
}

#[tokio::test]
async fn test_server_serves_over_tcp() {
    let _ = rustls::crypto::ring::default_provider().install_default();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = routes::create_app(AppState::new(create_minimal_config(addr.port())));

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let response = reqwest::get(format!("http://{addr}/")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert!(response.text().await.unwrap().contains("running"));
}
