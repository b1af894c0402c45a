//! エラー型定義 (bridge-discord)

use thiserror::Error;

/// bridge-discord のエラー型
#[derive(Error, Debug)]
pub enum DiscordError {
    #[error("Discord token not set")]
    TokenNotSet,

    #[error("Serenity error: {0}")]
    SerenityError(#[from] serenity::Error),
}

/// Result 型エイリアス
pub type Result<T> = std::result::Result<T, DiscordError>;
