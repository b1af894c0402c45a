//! Starter message fetch with bounded retry
//!
//! A thread and its first message are not created atomically on Discord, so
//! the message may not be retrievable yet when the thread-create event
//! arrives. The fetch waits a fixed delay before every attempt and gives up
//! with `None` once the attempts are used up.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::RelayConfig;
use crate::event::StarterMessage;
use crate::Result;

/// Where the starter message of one thread is read from
#[async_trait]
pub trait StarterMessageSource: Send + Sync {
    async fn fetch_starter(&self) -> Result<StarterMessage>;
}

/// Attempt count and delay for [`fetch_starter_message`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RelayConfig::default())
    }
}

impl From<&RelayConfig> for RetryPolicy {
    fn from(config: &RelayConfig) -> Self {
        Self::new(config.starter_max_retries, config.starter_retry_delay())
    }
}

/// Fetch the starter message, making at most `policy.max_retries` attempts.
///
/// Never fails: exhaustion is reported as `None`.
pub async fn fetch_starter_message(
    source: &dyn StarterMessageSource,
    policy: &RetryPolicy,
) -> Option<StarterMessage> {
    for attempt in 1..=policy.max_retries {
        tokio::time::sleep(policy.delay).await;

        match source.fetch_starter().await {
            Ok(message) => {
                debug!("Fetched starter message on attempt {}", attempt);
                return Some(message);
            }
            Err(e) => {
                warn!(
                    "Starter message fetch failed (attempt {}/{}): {}",
                    attempt, policy.max_retries, e
                );
            }
        }
    }

    warn!(
        "Giving up on starter message after {} attempts",
        policy.max_retries
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails until `succeed_on` attempts have been made (0 = never succeeds)
    struct FlakySource {
        attempts: AtomicU32,
        succeed_on: u32,
    }

    impl FlakySource {
        fn new(succeed_on: u32) -> Self {
            Self {
                attempts: AtomicU32::new(0),
                succeed_on,
            }
        }

        fn attempts(&self) -> u32 {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StarterMessageSource for FlakySource {
        async fn fetch_starter(&self) -> Result<StarterMessage> {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            if self.succeed_on != 0 && attempt >= self.succeed_on {
                Ok(StarterMessage {
                    author_display_name: "alice".to_string(),
                    body_text: "hello".to_string(),
                })
            } else {
                Err(Error::StarterUnavailable("Unknown Message".to_string()))
            }
        }
    }

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_always_failing_source_returns_none_after_max_attempts() {
        let source = FlakySource::new(0);
        let result = fetch_starter_message(&source, &fast_policy(3)).await;

        assert!(result.is_none());
        assert_eq!(source.attempts(), 3);
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let source = FlakySource::new(2);
        let result = fetch_starter_message(&source, &fast_policy(3)).await;

        let message = result.unwrap();
        assert_eq!(message.author_display_name, "alice");
        assert_eq!(message.body_text, "hello");
        assert_eq!(source.attempts(), 2);
    }

    #[tokio::test]
    async fn test_first_attempt_success_stops_retrying() {
        let source = FlakySource::new(1);
        assert!(fetch_starter_message(&source, &fast_policy(5)).await.is_some());
        assert_eq!(source.attempts(), 1);
    }

    #[tokio::test]
    async fn test_zero_retries_makes_no_attempt() {
        let source = FlakySource::new(1);
        assert!(fetch_starter_message(&source, &fast_policy(0)).await.is_none());
        assert_eq!(source.attempts(), 0);
    }

    #[test]
    fn test_policy_from_config() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.delay, Duration::from_millis(2000));
    }
}
