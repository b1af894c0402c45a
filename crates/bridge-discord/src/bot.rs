//! Discord Bot implementation using Serenity

use std::sync::Arc;

use serenity::model::gateway::GatewayIntents;
use serenity::prelude::*;
use tracing::info;

use bridge_core::{DiscordConfig, MessageSink, RelayRules};

use crate::error::{DiscordError, Result};
use crate::handler::Handler;

/// Discord Bot configuration
#[derive(Clone, Debug)]
pub struct DiscordBotConfig {
    pub token: String,
    pub rules: RelayRules,
}

impl DiscordBotConfig {
    pub fn new(discord: &DiscordConfig, rules: RelayRules) -> Self {
        Self {
            token: discord.token.clone(),
            rules,
        }
    }
}

/// Gateway intents the relay needs
///
/// - GUILDS: thread create/update events
/// - GUILD_MESSAGES: messages in guild channels and threads
/// - MESSAGE_CONTENT: message text (privileged intent)
pub fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT
}

/// Discord Bot relaying events to a message sink
pub struct DiscordBot {
    token: String,
    rules: Arc<RelayRules>,
    sink: Arc<dyn MessageSink>,
}

impl DiscordBot {
    /// Create a new Discord Bot instance
    pub fn new(config: DiscordBotConfig, sink: Arc<dyn MessageSink>) -> Result<Self> {
        if config.token.is_empty() {
            return Err(DiscordError::TokenNotSet);
        }

        Ok(Self {
            token: config.token,
            rules: Arc::new(config.rules),
            sink,
        })
    }

    /// Connect and process events until the shutdown signal fires
    pub async fn run(&self, mut shutdown: tokio::sync::broadcast::Receiver<()>) -> Result<()> {
        info!("Starting Discord bot...");

        let handler = Handler::new(self.rules.clone(), self.sink.clone());

        let mut client = Client::builder(&self.token, intents())
            .event_handler(handler)
            .await?;

        let shard_manager = client.shard_manager.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            info!("Discord bot shutting down");
            shard_manager.shutdown_all().await;
        });

        client.start().await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_core::{Config, RelayMessage};

    struct NullSink;

    #[async_trait]
    impl MessageSink for NullSink {
        async fn push(&self, _message: &RelayMessage) -> bridge_core::Result<()> {
            Ok(())
        }
    }

    fn bot_config(token: &str) -> DiscordBotConfig {
        let mut config = Config::default();
        config.discord.token = token.to_string();
        DiscordBotConfig::new(&config.discord, RelayRules::from_config(&config))
    }

    #[test]
    fn test_bot_creation_fails_without_token() {
        let result = DiscordBot::new(bot_config(""), Arc::new(NullSink));
        assert!(matches!(result, Err(DiscordError::TokenNotSet)));
    }

    #[test]
    fn test_bot_creation() {
        assert!(DiscordBot::new(bot_config("token"), Arc::new(NullSink)).is_ok());
    }

    #[test]
    fn test_intents_cover_threads_and_content() {
        let intents = intents();
        assert!(intents.contains(GatewayIntents::GUILDS));
        assert!(intents.contains(GatewayIntents::GUILD_MESSAGES));
        assert!(intents.contains(GatewayIntents::MESSAGE_CONTENT));
        assert!(!intents.contains(GatewayIntents::DIRECT_MESSAGES));
    }
}
