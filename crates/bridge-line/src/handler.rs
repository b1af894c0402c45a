//! LINE inbound handler
//!
//! The only inbound feature is the id lookup: a text message that is exactly
//! `:get_id` gets a reply with the conversation's own user/group/room id, so
//! it can be put into the relay's destination list.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::error::Result;
use crate::types::LineEvent;

/// Message body that triggers the id reply
pub const GET_ID_COMMAND: &str = ":get_id";

/// Capability to answer an inbound event through its reply token
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn reply(&self, reply_token: &str, text: &str) -> Result<()>;
}

/// Kind of conversation an event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    User,
    Group,
    Room,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Group => write!(f, "group"),
            Self::Room => write!(f, "room"),
        }
    }
}

/// A text message from a known conversation kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub source_type: SourceType,
    pub source_id: String,
    pub reply_token: String,
    pub body_text: String,
}

impl InboundEvent {
    /// Extract the fields the responder needs.
    ///
    /// `None` for non-message events, non-text messages, unknown source
    /// kinds, and events missing their id or reply token.
    pub fn from_line_event(event: &LineEvent) -> Option<Self> {
        if event.event_type != "message" {
            return None;
        }

        let message = event.message.as_ref()?;
        if message.message_type != "text" {
            return None;
        }

        let source = &event.source;
        let (source_type, source_id) = match source.source_type.as_str() {
            "user" => (SourceType::User, source.user_id.clone()?),
            "group" => (SourceType::Group, source.group_id.clone()?),
            "room" => (SourceType::Room, source.room_id.clone()?),
            _ => return None,
        };

        Some(Self {
            source_type,
            source_id,
            reply_token: event.reply_token.clone()?,
            body_text: message.text.clone().unwrap_or_default(),
        })
    }
}

/// Reply produced for a `:get_id` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityReply {
    pub reply_token: String,
    pub text: String,
}

/// Answer `:get_id` with `"{source_type}_id = {source_id}"`; anything else is ignored
pub fn respond(event: &InboundEvent) -> Option<IdentityReply> {
    if event.body_text != GET_ID_COMMAND {
        return None;
    }

    Some(IdentityReply {
        reply_token: event.reply_token.clone(),
        text: format!("{}_id = {}", event.source_type, event.source_id),
    })
}

/// Per-event result returned in the webhook response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum EventOutcome {
    Ignored,
    Replied { text: String },
    Failed { error: String },
}

/// Message handler for LINE webhook events
pub struct MessageHandler {
    replier: Arc<dyn ReplySink>,
}

impl MessageHandler {
    /// Create a new message handler
    pub fn new(replier: Arc<dyn ReplySink>) -> Self {
        Self { replier }
    }

    /// Process an incoming event
    pub async fn process_event(&self, event: &LineEvent) -> EventOutcome {
        let Some(inbound) = InboundEvent::from_line_event(event) else {
            debug!("Ignoring {} event", event.event_type);
            return EventOutcome::Ignored;
        };

        let Some(reply) = respond(&inbound) else {
            return EventOutcome::Ignored;
        };

        info!("Answering id request from {} {}", inbound.source_type, inbound.source_id);

        match self.replier.reply(&reply.reply_token, &reply.text).await {
            Ok(()) => EventOutcome::Replied { text: reply.text },
            Err(e) => {
                error!("Failed to reply to id request: {}", e);
                EventOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}
