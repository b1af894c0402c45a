//! Error types for bridge-core

use thiserror::Error;

/// Main error type for bridge-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Delivery to {destination} failed: {reason}")]
    Delivery { destination: String, reason: String },

    #[error("Starter message unavailable: {0}")]
    StarterUnavailable(String),
}

/// Result type alias for bridge-core
pub type Result<T> = std::result::Result<T, Error>;
