//! Bounded retry with exponential backoff.
//!
//! The only retry policy in the system. Rate-limit failures are retried
//! up to the attempt budget; every other failure propagates on first
//! occurrence. Parse and validation errors never reach this layer's
//! retryable path.

use super::error::LlmError;
use std::future::Future;
use std::time::Duration;

/// Total attempt budget (first call included).
pub(crate) const MAX_RETRIES: u32 = 3;
/// Backoff before the second attempt.
pub(crate) const INITIAL_DELAY_MS: u64 = 1000;

/// Delay before retrying after the failed attempt with 0-based index
/// `attempt`: `initial * 2^attempt`.
pub fn backoff_delay(attempt: u32, initial_delay_ms: u64) -> Duration {
    let factor = 1u64 << attempt.min(16);
    Duration::from_millis(initial_delay_ms.saturating_mul(factor))
}

/// Run `op` until it succeeds, fails non-retryably, or exhausts the
/// attempt budget.
///
/// The policy is fully decoupled from the operation: `is_retryable`
/// decides which failures are transient and `schedule` maps the 0-based
/// index of a failed attempt to the sleep before the next one. Exhaustion
/// on a retryable failure maps to `LlmError::RetriesExhausted`.
pub async fn retry_with_backoff<T, F, Fut, P, S>(
    mut op: F,
    is_retryable: P,
    schedule: S,
    max_attempts: u32,
) -> anyhow::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
    P: Fn(&anyhow::Error) -> bool,
    S: Fn(u32) -> Duration,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retryable(&err) {
                    return Err(err);
                }
                if attempt + 1 >= max_attempts {
                    tracing::debug!(attempts = attempt + 1, "retry budget exhausted");
                    return Err(anyhow::Error::new(LlmError::RetriesExhausted));
                }
                let delay = schedule(attempt);
                tracing::debug!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "transient failure, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// The concrete policy used by both pipelines: retry rate limits only,
/// exponential backoff from one second, three attempts total.
pub async fn retry_rate_limited<T, F, Fut>(op: F) -> anyhow::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    retry_with_backoff(
        op,
        LlmError::is_rate_limited,
        |attempt| backoff_delay(attempt, INITIAL_DELAY_MS),
        MAX_RETRIES,
    )
    .await
}
