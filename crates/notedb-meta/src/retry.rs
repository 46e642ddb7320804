//! Re-running an operation on retryable failures.

use std::fmt::Display;
use std::thread;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// How often and how patiently to retry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub base_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_backoff_ms: 20,
            max_backoff_ms: 1_000,
        }
    }
}

impl RetryPolicy {
    /// Retry up to `max_attempts` times without sleeping.
    pub fn no_backoff(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_backoff_ms: 0,
            max_backoff_ms: 0,
        }
    }

    /// Exponential delay after failed attempt `attempt` (1-based), capped,
    /// plus up to half the base as jitter.
    pub fn backoff(&self, attempt: u32) -> Duration {
        if self.base_backoff_ms == 0 {
            return Duration::ZERO;
        }
        let exp = attempt.saturating_sub(1).min(16);
        let delay = self
            .base_backoff_ms
            .saturating_mul(1u64 << exp)
            .min(self.max_backoff_ms);
        let jitter = rand::thread_rng().gen_range(0..=self.base_backoff_ms / 2);
        Duration::from_millis(delay.saturating_add(jitter))
    }
}

/// Why [`retry`] gave up.
#[derive(Debug)]
pub enum RetryError<E> {
    /// Every attempt failed with a retryable error.
    Exhausted { attempts: u32, last: E },
    /// An attempt failed with an error that is not retried.
    Aborted(E),
}

impl<E> RetryError<E> {
    pub fn into_inner(self) -> E {
        match self {
            Self::Exhausted { last, .. } => last,
            Self::Aborted(e) => e,
        }
    }
}

/// Run `op` until it succeeds, fails with an error `is_retryable` rejects,
/// or `policy.max_attempts` attempts are used up. `op` receives the 1-based
/// attempt number and must redo all of its reads on every call.
pub fn retry<T, E, F, P>(
    policy: &RetryPolicy,
    is_retryable: P,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    E: Display,
    F: FnMut(u32) -> Result<T, E>,
    P: Fn(&E) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(e) if is_retryable(&e) => {
                if attempt >= max_attempts {
                    warn!(attempts = attempt, error = %e, "giving up after retryable failures");
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        last: e,
                    });
                }
                let delay = policy.backoff(attempt);
                warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "retrying after failure"
                );
                if !delay.is_zero() {
                    thread::sleep(delay);
                }
                attempt += 1;
            }
            Err(e) => return Err(RetryError::Aborted(e)),
        }
    }
}
