//! LINE Messaging API client
//!
//! Push and reply only; the relay never reads anything back from LINE.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error};

use bridge_core::{MessageSink, RelayMessage};

use crate::error::{LineError, Result};
use crate::handler::ReplySink;
use crate::types::*;

const DEFAULT_BASE_URL: &str = "https://api.line.me/v2";

/// LINE Messaging API client
#[derive(Clone)]
pub struct LineApiClient {
    client: Client,
    channel_access_token: String,
    base_url: String,
}

impl LineApiClient {
    /// Create a new LINE API client
    pub fn new(channel_access_token: &str) -> Result<Self> {
        Self::with_base_url(channel_access_token, DEFAULT_BASE_URL)
    }

    /// Create a client against a different API root
    pub fn with_base_url(channel_access_token: &str, base_url: &str) -> Result<Self> {
        if channel_access_token.is_empty() {
            return Err(LineError::AccessTokenNotConfigured);
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(LineError::HttpError)?;

        Ok(Self {
            client,
            channel_access_token: channel_access_token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// POST a JSON body and map non-2xx responses to `ApiError`
    async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<()> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.channel_access_token)
            .json(body)
            .send()
            .await
            .map_err(LineError::HttpError)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("POST {} failed: {} - {}", path, status, error_text);
            return Err(LineError::ApiError(format!("{}: {}", status, error_text)));
        }

        Ok(())
    }

    /// Reply to a message
    pub async fn reply_message(&self, reply_token: &str, text: &str) -> Result<()> {
        let body = ReplyMessage {
            reply_token: reply_token.to_string(),
            messages: vec![MessageContent::Text { text: text.to_string() }],
        };

        debug!("Replying to message");
        self.post("/bot/message/reply", &body).await
    }

    /// Push a message to a user/group/room
    pub async fn push_message(&self, to: &str, text: &str) -> Result<()> {
        let body = PushMessage {
            to: to.to_string(),
            messages: vec![MessageContent::Text { text: text.to_string() }],
        };

        debug!("Pushing message to: {}", to);
        self.post("/bot/message/push", &body).await
    }
}

#[async_trait]
impl MessageSink for LineApiClient {
    async fn push(&self, message: &RelayMessage) -> bridge_core::Result<()> {
        self.push_message(message.destination(), message.text())
            .await
            .map_err(|e| bridge_core::Error::Delivery {
                destination: message.destination().to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl ReplySink for LineApiClient {
    async fn reply(&self, reply_token: &str, text: &str) -> Result<()> {
        self.reply_message(reply_token, text).await
    }
}
