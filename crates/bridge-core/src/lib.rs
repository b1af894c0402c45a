//! bridge-core: Discord → LINE relay core
//!
//! Platform-independent pieces of the relay: configuration, event types,
//! the notification formatter, thread-state classification, the bounded
//! starter-message fetch and the fan-out relay. The Discord and LINE crates
//! only translate platform callbacks into these types.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod format;
pub mod relay;
pub mod starter;
pub mod thread_state;

pub use config::{Config, DiscordConfig, LineConfig, RelayConfig};
pub use dispatch::RelayRules;
pub use error::{Error, Result};
pub use event::{ChatMessage, RelayMessage, StarterMessage, ThreadEvent};
pub use relay::{MessageSink, relay};
pub use starter::{RetryPolicy, StarterMessageSource, fetch_starter_message};
pub use thread_state::{CLOSED_MARKER, ThreadTransition, classify};
