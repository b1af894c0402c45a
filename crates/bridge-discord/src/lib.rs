//! bridge-discord: Discord side of the relay
//!
//! Serenity 0.12 でDiscord Gatewayに接続し、メッセージ・スレッド作成・
//! スレッド名変更イベントを bridge-core のディスパッチ関数へ渡します。

pub mod bot;
pub mod error;
pub mod handler;
pub mod starter;

pub use bot::{DiscordBot, DiscordBotConfig};
pub use error::{DiscordError, Result};
pub use handler::Handler;
