//! Event and message types passed between the platform adapters and the relay

use serde::{Deserialize, Serialize};

/// A Discord thread as seen by a create/update callback
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadEvent {
    /// Current thread title
    pub name: String,
    /// Title before the update, when the platform still knew it
    pub previous_name: Option<String>,
    /// Name of the parent forum channel / category
    pub parent_category_name: String,
    pub author_display_name: Option<String>,
    pub body_text: Option<String>,
}

impl ThreadEvent {
    /// Thread created under `parent`
    pub fn created(name: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent_category_name: parent.into(),
            ..Default::default()
        }
    }

    /// Thread renamed from `previous` to `name` under `parent`
    pub fn renamed(
        previous: Option<String>,
        name: impl Into<String>,
        parent: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            previous_name: previous,
            parent_category_name: parent.into(),
            ..Default::default()
        }
    }

    /// Attach the starter message's author and body
    pub fn with_starter(mut self, starter: StarterMessage) -> Self {
        self.author_display_name = Some(starter.author_display_name);
        self.body_text = Some(starter.body_text);
        self
    }
}

/// A plain message posted on Discord
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Name of the channel or thread it was posted in, if resolved
    pub channel_name: Option<String>,
    pub author_display_name: String,
    pub author_is_bot: bool,
    pub body_text: String,
}

/// First message of a thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarterMessage {
    pub author_display_name: String,
    pub body_text: String,
}

/// One text addressed to one destination on the target platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayMessage {
    destination: String,
    text: String,
}

impl RelayMessage {
    pub fn new(destination: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            text: text.into(),
        }
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}
