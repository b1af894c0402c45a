//! Discord event handler
//!
//! Turns serenity callbacks into bridge-core event values and hands them to
//! the dispatch functions. No relay decisions are made here.

use std::sync::Arc;

use serenity::async_trait;
use serenity::model::channel::{GuildChannel, Message};
use serenity::model::gateway::Ready;
use serenity::model::Timestamp;
use serenity::model::id::{ChannelId, MessageId};
use serenity::model::user::User;
use serenity::prelude::*;
use tracing::{debug, info, warn};

use bridge_core::dispatch::{self, RelayRules};
use bridge_core::{ChatMessage, MessageSink, ThreadEvent};

use crate::starter::ThreadStarter;

/// Display name shown for a Discord user
pub fn display_name(user: &User) -> String {
    user.global_name.clone().unwrap_or_else(|| user.name.clone())
}

/// THREAD_CREATE for a thread older than this is a late join, not a new post
const NEW_THREAD_MAX_AGE_SECS: i64 = 300;

/// A thread's starter message shares the thread's id
pub fn is_thread_starter(message_id: MessageId, channel_id: ChannelId) -> bool {
    message_id.get() == channel_id.get()
}

/// Whether a thread created at `created_at` (unix seconds) is new at `now`
fn is_new_thread(created_at: i64, now: i64) -> bool {
    now - created_at <= NEW_THREAD_MAX_AGE_SECS
}

/// Serenity event handler for the relay
pub struct Handler {
    rules: Arc<RelayRules>,
    sink: Arc<dyn MessageSink>,
}

impl Handler {
    pub fn new(rules: Arc<RelayRules>, sink: Arc<dyn MessageSink>) -> Self {
        Self { rules, sink }
    }

    /// Name of a channel, via the cache when possible
    async fn channel_name(ctx: &Context, channel_id: ChannelId) -> Option<String> {
        match channel_id.to_channel(ctx).await {
            Ok(channel) => channel.guild().map(|c| c.name),
            Err(e) => {
                warn!("Failed to resolve channel {}: {:?}", channel_id, e);
                None
            }
        }
    }

    async fn parent_name(ctx: &Context, thread: &GuildChannel) -> String {
        match thread.parent_id {
            Some(parent_id) => Self::channel_name(ctx, parent_id).await.unwrap_or_default(),
            None => String::new(),
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!("Logged in as {}", ready.user.tag());
    }

    async fn message(&self, ctx: Context, msg: Message) {
        // Ignore messages from bots
        if msg.author.bot {
            return;
        }
        // Starter messages go out with the creation notice
        if is_thread_starter(msg.id, msg.channel_id) {
            debug!("Skipping thread starter message {}", msg.id);
            return;
        }

        let channel_name = if self.rules.message_channel_name.is_some() {
            Self::channel_name(&ctx, msg.channel_id).await
        } else {
            None
        };

        let event = ChatMessage {
            channel_name,
            author_display_name: display_name(&msg.author),
            author_is_bot: msg.author.bot,
            body_text: msg.content,
        };

        dispatch::on_message(&self.rules, &event, self.sink.as_ref()).await;
    }

    async fn thread_create(&self, ctx: Context, thread: GuildChannel) {
        let created_at = thread.id.created_at().unix_timestamp();
        if !is_new_thread(created_at, Timestamp::now().unix_timestamp()) {
            debug!("Ignoring existing thread: {}", thread.name);
            return;
        }

        let parent = Self::parent_name(&ctx, &thread).await;
        debug!("Thread created: {} (parent: {})", thread.name, parent);

        let source = ThreadStarter::new(ctx.http.clone(), thread.id);
        let event = ThreadEvent::created(thread.name, parent);

        dispatch::on_thread_create(&self.rules, event, &source, self.sink.as_ref()).await;
    }

    async fn thread_update(&self, ctx: Context, old: Option<GuildChannel>, new: GuildChannel) {
        let parent = Self::parent_name(&ctx, &new).await;
        let event = ThreadEvent::renamed(old.map(|t| t.name), new.name, parent);

        dispatch::on_thread_update(&self.rules, &event, self.sink.as_ref()).await;
    }
}
