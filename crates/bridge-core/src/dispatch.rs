//! Per-event dispatch
//!
//! One function per Discord event kind. Each takes an already-built event
//! value plus injected capabilities, so none of them needs a live client.

use tracing::{debug, info};

use crate::config::Config;
use crate::event::{ChatMessage, ThreadEvent};
use crate::format;
use crate::relay::{MessageSink, relay};
use crate::starter::{RetryPolicy, StarterMessageSource, fetch_starter_message};
use crate::thread_state::{ThreadTransition, classify};

/// Read-only relay settings shared by all handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayRules {
    pub destinations: Vec<String>,
    /// Parent channel/category thread events must belong to (None = any)
    pub category_name: Option<String>,
    /// Channel/thread plain messages must be posted in (None = any)
    pub message_channel_name: Option<String>,
    pub relay_messages: bool,
    pub starter_retry: RetryPolicy,
}

impl RelayRules {
    pub fn from_config(config: &Config) -> Self {
        Self {
            destinations: config.line.destination_ids.clone(),
            category_name: config.discord.category_name.clone(),
            message_channel_name: config.discord.message_channel_name.clone(),
            relay_messages: config.discord.relay_messages,
            starter_retry: RetryPolicy::from(&config.relay),
        }
    }

    fn accepts_category(&self, parent: &str) -> bool {
        self.category_name.as_deref().is_none_or(|name| name == parent)
    }

    fn accepts_channel(&self, channel: Option<&str>) -> bool {
        match self.message_channel_name.as_deref() {
            None => true,
            Some(name) => channel == Some(name),
        }
    }
}

/// New thread: fetch its starter message and announce it.
///
/// Returns whether a notice was relayed.
pub async fn on_thread_create(
    rules: &RelayRules,
    event: ThreadEvent,
    source: &dyn StarterMessageSource,
    sink: &dyn MessageSink,
) -> bool {
    if !rules.accepts_category(&event.parent_category_name) {
        debug!(
            "Ignoring thread '{}' outside target category ('{}')",
            event.name, event.parent_category_name
        );
        return false;
    }

    let event = match fetch_starter_message(source, &rules.starter_retry).await {
        Some(starter) => event.with_starter(starter),
        None => event,
    };

    info!("New thread '{}' in '{}'", event.name, event.parent_category_name);

    let text = format::creation(
        &event.name,
        event.author_display_name.as_deref(),
        event.body_text.as_deref(),
    );
    relay(sink, &rules.destinations, &text).await;
    true
}

/// Thread renamed: announce open/close transitions.
pub async fn on_thread_update(
    rules: &RelayRules,
    event: &ThreadEvent,
    sink: &dyn MessageSink,
) -> ThreadTransition {
    let Some(previous) = event.previous_name.as_deref() else {
        debug!("No previous name for thread '{}', skipping", event.name);
        return ThreadTransition::NoChange;
    };

    if !rules.accepts_category(&event.parent_category_name) {
        return ThreadTransition::NoChange;
    }

    let transition = classify(previous, &event.name);
    let text = match transition {
        ThreadTransition::Reopened => format::reopened(&event.name),
        ThreadTransition::Closed => format::closed(&event.name),
        ThreadTransition::NoChange => return transition,
    };

    info!("Thread '{}' -> '{}': {:?}", previous, event.name, transition);
    relay(sink, &rules.destinations, &text).await;
    transition
}

/// Plain message: forward its text as-is.
///
/// Returns whether the message was relayed.
pub async fn on_message(rules: &RelayRules, event: &ChatMessage, sink: &dyn MessageSink) -> bool {
    if !rules.relay_messages || event.author_is_bot || event.body_text.trim().is_empty() {
        return false;
    }

    if !rules.accepts_channel(event.channel_name.as_deref()) {
        return false;
    }

    debug!("Relaying message from {}", event.author_display_name);
    relay(sink, &rules.destinations, &event.body_text).await;
    true
}
