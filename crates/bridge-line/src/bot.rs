//! LINE Bot implementation
//!
//! Owns the API client (shared with the Discord side as its push sink) and
//! runs the webhook server.

use std::sync::Arc;

use tracing::info;

use bridge_core::LineConfig;

use crate::api::LineApiClient;
use crate::error::{LineError, Result};
use crate::handler::MessageHandler;
use crate::webhook::{WebhookState, start_webhook_server};

/// LINE Bot configuration
#[derive(Clone, Debug, Default)]
pub struct LineBotConfig {
    /// Channel secret
    pub channel_secret: String,
    /// Channel access token
    pub channel_access_token: String,
    /// Webhook server port
    pub webhook_port: u16,
}

impl From<&LineConfig> for LineBotConfig {
    fn from(config: &LineConfig) -> Self {
        Self {
            channel_secret: config.channel_secret.clone(),
            channel_access_token: config.channel_access_token.clone(),
            webhook_port: config.webhook_port,
        }
    }
}

/// LINE Bot for the relay
pub struct LineBot {
    bot_config: LineBotConfig,
    api_client: Arc<LineApiClient>,
}

impl LineBot {
    /// Create a new LINE bot
    pub fn new(bot_config: LineBotConfig) -> Result<Self> {
        if bot_config.channel_secret.is_empty() {
            return Err(LineError::ChannelSecretNotConfigured);
        }
        if bot_config.channel_access_token.is_empty() {
            return Err(LineError::AccessTokenNotConfigured);
        }

        let api_client = Arc::new(LineApiClient::new(&bot_config.channel_access_token)?);

        Ok(Self {
            bot_config,
            api_client,
        })
    }

    /// API client, usable as the relay's push sink
    pub fn api_client(&self) -> Arc<LineApiClient> {
        self.api_client.clone()
    }

    /// Run the webhook server until the shutdown signal fires
    pub async fn run(&self, mut shutdown: tokio::sync::broadcast::Receiver<()>) -> Result<()> {
        info!("Starting LINE bot webhook server on port {}", self.bot_config.webhook_port);

        let state = WebhookState {
            channel_secret: self.bot_config.channel_secret.clone(),
            handler: Arc::new(MessageHandler::new(self.api_client.clone())),
        };

        start_webhook_server(state, self.bot_config.webhook_port, async move {
            let _ = shutdown.recv().await;
            info!("LINE bot shutting down");
        })
        .await
    }
}
