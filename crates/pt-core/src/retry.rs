//! Bounded re-attempts around a fallible async operation.

use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Default number of attempts, including the first one.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Retry policy: how many times to invoke an operation and how long to wait
/// between failed attempts.
///
/// Every error is treated as retryable. Callers are expected to rule out
/// permanent failures (such as an unsupported tracking number) before
/// handing the operation over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retry {
    max_attempts: u32,
    delay: Duration,
}

impl Default for Retry {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: Duration::ZERO,
        }
    }
}

impl Retry {
    /// Creates a policy making at most `max_attempts` invocations.
    ///
    /// A value of zero is treated as one: the operation always runs once.
    pub const fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: if max_attempts == 0 { 1 } else { max_attempts },
            delay: Duration::ZERO,
        }
    }

    /// Sets the pause between a failed attempt and the next one.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Maximum number of invocations.
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Pause between failed attempts.
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Runs `op` until it succeeds or the attempts are used up.
    ///
    /// Returns the first success, or the error from the final attempt
    /// unchanged. No delay follows the final attempt.
    pub async fn run<F, Fut, T, E>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt >= self.max_attempts => {
                    tracing::warn!(
                        attempts = attempt,
                        error = %err,
                        "giving up after final attempt"
                    );
                    return Err(err);
                }
                Err(err) => {
                    tracing::debug!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "attempt failed, retrying"
                    );
                }
            }
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            attempt += 1;
        }
    }
}
