//! Bounded, fixed-delay retry of whole reconciliation runs

use std::future::Future;
use std::time::Duration;

use crate::error::{WorkerError, WorkerResult};

/// Maximum attempts for one run
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Pause between attempts
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// How many times a run is attempted and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Run `operation` until it succeeds, fails with an error `should_retry`
    /// rejects, or the attempt budget is spent.
    ///
    /// Errors that are not retried are returned unchanged. Exhausting the
    /// budget yields [`WorkerError::MaxRetriesExceeded`].
    pub async fn run<T, F, Fut, P>(
        &self,
        operation_name: &str,
        should_retry: P,
        mut operation: F,
    ) -> WorkerResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = WorkerResult<T>>,
        P: Fn(&WorkerError) -> bool,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if !should_retry(&e) => return Err(e),
                Err(e) if attempt >= self.max_attempts => {
                    tracing::error!(
                        operation = operation_name,
                        attempts = attempt,
                        error = %e,
                        "Giving up after repeated failures"
                    );
                    return Err(WorkerError::MaxRetriesExceeded {
                        attempts: attempt,
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        operation = operation_name,
                        attempt,
                        max_attempts = self.max_attempts,
                        retry_in_secs = self.delay.as_secs(),
                        error = %e,
                        "Run failed, retrying"
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
