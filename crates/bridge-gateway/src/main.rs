//! line-bridge: Discord → LINE relay
//!
//! Usage:
//!   line-bridge           - Start the relay (Discord bot + LINE webhook)
//!   line-bridge --check   - Validate configuration and exit
//!   line-bridge --help    - Show help

use std::sync::Arc;

use bridge_core::{Config, MessageSink, RelayRules};
use bridge_discord::{DiscordBot, DiscordBotConfig};
use bridge_line::{LineBot, LineBotConfig};
use tracing_subscriber::EnvFilter;

/// Run mode
#[derive(Debug, PartialEq, Eq)]
enum RunMode {
    /// Relay mode (Discord bot + LINE webhook)
    Server,
    /// Validate configuration only
    Check,
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mode = parse_args(std::env::args().skip(1));

    match mode {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("line-bridge {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    tracing::info!(
        "Relaying to {} LINE destination(s)",
        config.line.destination_ids.len()
    );

    if mode == RunMode::Check {
        tracing::info!("Configuration OK");
        return Ok(());
    }

    run_server(config).await
}

/// Parse command line arguments
fn parse_args<I>(args: I) -> RunMode
where
    I: IntoIterator<Item = String>,
{
    for arg in args {
        match arg.as_str() {
            "--check" => return RunMode::Check,
            "--help" | "-h" => return RunMode::Help,
            "--version" | "-v" => return RunMode::Version,
            _ => {}
        }
    }

    RunMode::Server
}

/// Print help message
fn print_help() {
    println!("line-bridge - Discord to LINE relay");
    println!();
    println!("Usage:");
    println!("  line-bridge           Start the relay (Discord bot + LINE webhook)");
    println!("  line-bridge --check   Validate configuration and exit");
    println!("  line-bridge --help    Show this help message");
    println!("  line-bridge --version Show version");
    println!();
    println!("Configuration is read from ./line-bridge.toml (optional) and the environment:");
    println!("  DISCORD_BOT_TOKEN       Discord bot token (required)");
    println!("  LINE_BOT_TOKEN          LINE channel access token (required)");
    println!("  LINE_CHANNEL_SECRET     LINE channel secret (required)");
    println!("  TARGET_GROUP_ID         Single LINE destination id");
    println!("  TARGET_IDS              Comma-separated LINE destination ids");
    println!("  TARGET_CATEGORY_NAME    Only relay threads under this parent channel");
    println!("  TARGET_THREAD_NAME      Only relay messages from this channel/thread");
    println!("  RELAY_MESSAGES          Relay plain messages (default: true)");
    println!("  PORT / WEBHOOK_PORT     Webhook server port (default: 3000)");
    println!("  STARTER_MAX_RETRIES     Starter message fetch attempts (default: 3)");
    println!("  STARTER_RETRY_DELAY_MS  Delay before each attempt (default: 2000)");
}

/// Run the Discord bot and the LINE webhook server until Ctrl+C
async fn run_server(config: Config) -> anyhow::Result<()> {
    let (shutdown_tx, _) = tokio::sync::broadcast::channel::<()>(1);

    let line_bot = LineBot::new(LineBotConfig::from(&config.line))
        .map_err(|e| anyhow::anyhow!("Failed to create LINE bot: {}", e))?;
    let sink: Arc<dyn MessageSink> = line_bot.api_client();

    let discord_bot = DiscordBot::new(
        DiscordBotConfig::new(&config.discord, RelayRules::from_config(&config)),
        sink,
    )
    .map_err(|e| anyhow::anyhow!("Failed to create Discord bot: {}", e))?;

    let mut service_handles = Vec::new();

    let line_shutdown = shutdown_tx.subscribe();
    service_handles.push(tokio::spawn(async move {
        if let Err(e) = line_bot.run(line_shutdown).await {
            tracing::error!("LINE webhook error: {}", e);
        }
    }));

    let discord_shutdown = shutdown_tx.subscribe();
    service_handles.push(tokio::spawn(async move {
        if let Err(e) = discord_bot.run(discord_shutdown).await {
            tracing::error!("Discord bot error: {}", e);
        }
    }));

    tracing::info!("line-bridge started");
    tracing::info!("Press Ctrl+C to exit");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");

    let _ = shutdown_tx.send(());
    for handle in service_handles {
        if let Err(e) = handle.await {
            tracing::warn!("Service task ended abnormally: {}", e);
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        assert_eq!(parse_args(args(&[])), RunMode::Server);
        assert_eq!(parse_args(args(&["--check"])), RunMode::Check);
        assert_eq!(parse_args(args(&["-h"])), RunMode::Help);
        assert_eq!(parse_args(args(&["--version"])), RunMode::Version);
        assert_eq!(parse_args(args(&["--unknown"])), RunMode::Server);
    }
}
