//! エラー型定義 (bridge-line)

use thiserror::Error;

/// bridge-line のエラー型
#[derive(Error, Debug)]
pub enum LineError {
    #[error("LINE API error: {0}")]
    ApiError(String),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Channel secret not configured")]
    ChannelSecretNotConfigured,

    #[error("Channel access token not configured")]
    AccessTokenNotConfigured,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Webhook error: {0}")]
    Webhook(String),
}

/// Result 型エイリアス
pub type Result<T> = std::result::Result<T, LineError>;
