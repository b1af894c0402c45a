//! bridge-line: LINE side of the relay
//!
//! LINE Messaging API の push/reply クライアントと、
//! `:get_id` に応答する Webhook サーバーを提供します。

pub mod api;
pub mod bot;
pub mod error;
pub mod handler;
pub mod types;
pub mod webhook;

pub use api::LineApiClient;
pub use bot::{LineBot, LineBotConfig};
pub use error::{LineError, Result};
pub use handler::{EventOutcome, MessageHandler, ReplySink};
