//! Starter message lookup over the Discord HTTP API

use std::sync::Arc;

use async_trait::async_trait;
use serenity::http::Http;
use serenity::model::id::{ChannelId, MessageId};

use bridge_core::{StarterMessage, StarterMessageSource};

use crate::handler::display_name;

/// The starter message of a thread shares the thread's id
pub struct ThreadStarter {
    http: Arc<Http>,
    thread_id: ChannelId,
}

impl ThreadStarter {
    pub fn new(http: Arc<Http>, thread_id: ChannelId) -> Self {
        Self { http, thread_id }
    }

    fn message_id(&self) -> MessageId {
        MessageId::new(self.thread_id.get())
    }
}

#[async_trait]
impl StarterMessageSource for ThreadStarter {
    async fn fetch_starter(&self) -> bridge_core::Result<StarterMessage> {
        let message = self
            .thread_id
            .message(&self.http, self.message_id())
            .await
            .map_err(|e| bridge_core::Error::StarterUnavailable(e.to_string()))?;

        Ok(StarterMessage {
            author_display_name: display_name(&message.author),
            body_text: message.content,
        })
    }
}
