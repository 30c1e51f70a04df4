//! Bounded retry around an atomic operation.
//!
//! One wrapper serves every call site. It takes a maximum attempt count, a
//! fixed backoff, a per-attempt time bound and a predicate deciding which
//! errors are worth another attempt.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use ledgerline_shared::config::PostingConfig;

use crate::ledger::LedgerError;

/// Retry limits for one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum attempts, first try included. Never below 1.
    pub max_attempts: u32,
    /// Fixed delay before every retry.
    pub backoff: Duration,
    /// Upper bound on a single attempt.
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&PostingConfig::default())
    }
}

impl From<&PostingConfig> for RetryPolicy {
    fn from(config: &PostingConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff: Duration::from_millis(config.backoff_ms),
            attempt_timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Why a retried operation gave up.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// Every attempt failed with a retryable error.
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        /// Attempts made.
        attempts: u32,
        /// Error from the final attempt.
        last: E,
    },

    /// An attempt failed with an error the predicate rejected.
    #[error("{0}")]
    Fatal(E),

    /// An attempt exceeded the time bound.
    ///
    /// The operation may or may not have taken effect, so it is not retried.
    #[error("attempt {attempt} timed out after {elapsed:?}")]
    TimedOut {
        /// The attempt that timed out (1-based).
        attempt: u32,
        /// The time bound that was exceeded.
        elapsed: Duration,
    },
}

/// Runs `op` until it succeeds, fails fatally, times out or the attempts run out.
///
/// `op` receives the 1-based attempt number.
///
/// # Errors
///
/// Returns a [`RetryError`] describing how the operation gave up.
pub async fn retry_with_policy<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    is_retryable: P,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let outcome = tokio::time::timeout(policy.attempt_timeout, op(attempt)).await;

        let err = match outcome {
            Ok(Ok(value)) => {
                if attempt > 1 {
                    debug!(attempt, "operation succeeded after retry");
                }
                return Ok(value);
            }
            Ok(Err(err)) => err,
            Err(_) => {
                warn!(attempt, timeout = ?policy.attempt_timeout, "attempt timed out");
                return Err(RetryError::TimedOut {
                    attempt,
                    elapsed: policy.attempt_timeout,
                });
            }
        };

        if !is_retryable(&err) {
            return Err(RetryError::Fatal(err));
        }

        if attempt >= max_attempts {
            warn!(attempts = attempt, error = %err, "retries exhausted");
            return Err(RetryError::Exhausted {
                attempts: attempt,
                last: err,
            });
        }

        let delay = policy.backoff;
        warn!(attempt, ?delay, error = %err, "retryable failure, backing off");
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

impl From<RetryError<LedgerError>> for LedgerError {
    fn from(err: RetryError<LedgerError>) -> Self {
        match err {
            RetryError::Exhausted { attempts, last } => Self::RetriesExhausted {
                attempts,
                last: last.to_string(),
            },
            RetryError::Fatal(err) => err,
            RetryError::TimedOut { elapsed, .. } => Self::Timeout(elapsed.as_millis()),
        }
    }
}
