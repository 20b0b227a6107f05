use std::sync::Arc;

use crate::config::ServerConfig;
use crate::core::bridge::SessionBridge;
use crate::core::functions::FunctionDispatcher;
use crate::core::webhook::{ScheduleWebhook, WebhookClient};

/// Shared application state, built once at startup.
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub bridge: SessionBridge,
}

impl AppState {
    /// Build state with the HTTP schedule webhook from `config`.
    pub fn new(config: ServerConfig) -> Arc<Self> {
        let webhook = Arc::new(WebhookClient::new(config.webhook_url.clone()));
        Self::with_webhook(config, webhook)
    }

    /// Build state around a custom schedule webhook.
    pub fn with_webhook(config: ServerConfig, webhook: Arc<dyn ScheduleWebhook>) -> Arc<Self> {
        let config = Arc::new(config);
        let dispatcher = Arc::new(FunctionDispatcher::new(webhook));

        Arc::new(Self {
            bridge: SessionBridge::new(config.clone(), dispatcher),
            config,
        })
    }
}
