use crate::config::FetchConfig;
use crate::fetch::FetchError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retry budget and delay schedule shared by both fetch strategies
///
/// | Error | Retried | Delay before retry `n` (0-based) |
/// |-------|---------|----------------------------------|
/// | Rate limited (429/503) | yes | `base * (n + 1)` |
/// | Timeout | yes | `base` |
/// | Network | yes | `base` |
/// | Render | yes | `base` |
/// | Other HTTP status | no | - |
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.retry_delay_ms),
        )
    }

    /// Returns the delay before the next attempt, or `None` when the error is
    /// terminal or the budget is spent
    ///
    /// `retry` is the number of retries already made.
    pub fn next_delay(&self, error: &FetchError, retry: u32) -> Option<Duration> {
        if !error.is_retryable() || retry >= self.max_retries {
            return None;
        }

        Some(match error {
            FetchError::RateLimited(_) => self.base_delay.saturating_mul(retry + 1),
            _ => self.base_delay,
        })
    }

    /// Runs `attempt` until it succeeds, fails terminally, or the budget is spent
    ///
    /// Returns the final result together with the number of attempts made.
    pub async fn run<T, F, Fut>(&self, url: &str, mut attempt: F) -> (Result<T, FetchError>, u32)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let mut retry = 0;
        loop {
            match attempt().await {
                Ok(value) => return (Ok(value), retry + 1),
                Err(error) => match self.next_delay(&error, retry) {
                    Some(delay) => {
                        warn!(
                            "{} for {}, retrying in {:?} ({}/{})",
                            error,
                            url,
                            delay,
                            retry + 1,
                            self.max_retries
                        );
                        tokio::time::sleep(delay).await;
                        retry += 1;
                    }
                    None => return (Err(error), retry + 1),
                },
            }
        }
    }
}
