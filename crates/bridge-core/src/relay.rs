//! Outbound fan-out relay
//!
//! Every destination gets its own push; pushes run concurrently and a failed
//! push is logged without touching the others.

use async_trait::async_trait;
use futures::future::join_all;
use tracing::{error, info};

use crate::event::RelayMessage;
use crate::Result;

/// Capability to deliver one text message to one destination
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn push(&self, message: &RelayMessage) -> Result<()>;
}

/// Push `text` to every destination. Best effort: failures are only logged.
pub async fn relay(sink: &dyn MessageSink, destinations: &[String], text: &str) {
    let pushes = destinations.iter().map(|destination| {
        let message = RelayMessage::new(destination.as_str(), text);
        async move {
            match sink.push(&message).await {
                Ok(()) => {
                    info!("Relayed message to {}", message.destination());
                    true
                }
                Err(e) => {
                    error!("Failed to relay message to {}: {}", message.destination(), e);
                    false
                }
            }
        }
    });

    let results = join_all(pushes).await;
    let delivered = results.iter().filter(|ok| **ok).count();
    if delivered < results.len() {
        info!("Relay finished: {}/{} delivered", delivered, results.len());
    }
}
