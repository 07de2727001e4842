//! Bounded retry with exponential backoff for connection establishment.
//!
//! Freshly provisioned servers often refuse connections for a while after
//! the host believes they exist, so opening the connection is retried until
//! a fixed ceiling. Statement execution is never retried.

use std::future::Future;
use std::time::{Duration, Instant};

use tfmysql_core::error::{ConnectionError, ConnectionErrorKind};
use tfmysql_core::{Error, Result};

/// Retry policy for establishing a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Give up once this much time has passed since the first attempt
    pub max_elapsed: Duration,
    /// Delay before the second attempt
    pub initial_backoff: Duration,
    /// Upper bound for any single delay
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_elapsed: Duration::from_secs(5 * 60),
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Delay following `current`: doubled, capped at `max_backoff`.
    pub fn next_backoff(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max_backoff)
    }

    /// Run `op` until it succeeds, fails non-retryably, or the ceiling passes.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let started = Instant::now();
        let mut backoff = self.initial_backoff;
        let mut attempt: u32 = 1;

        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_retryable() => {
                    tracing::debug!(attempt, error = %err, "Not retrying");
                    return Err(err);
                }
                Err(err) => {
                    let elapsed = started.elapsed();
                    if elapsed + backoff > self.max_elapsed {
                        return Err(Error::Connection(ConnectionError {
                            kind: ConnectionErrorKind::Timeout,
                            message: format!(
                                "Could not connect to server after {} attempts in {:?}: {}",
                                attempt, elapsed, err
                            ),
                            source: Some(Box::new(err)),
                        }));
                    }
                    tracing::warn!(
                        attempt,
                        backoff_ms = u64::try_from(backoff.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "Connection attempt failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = self.next_backoff(backoff);
                    attempt += 1;
                }
            }
        }
    }
}
