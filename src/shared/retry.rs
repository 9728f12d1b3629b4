//! Retry with exponential backoff for transient remote failures (rate limit, 503).
//!
//! The executor never invents an error of its own: it returns the operation's value,
//! or the last error the operation produced. The only exception is an explicit
//! cancel through [`RetryExecutor::execute_cancellable`].

use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Default backoff table, in seconds.
pub const DEFAULT_BACKOFF_SECS: [u64; 5] = [1, 2, 4, 8, 16];

/// Default number of attempts (first call included).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Longest generated backoff table. Later retries reuse the last entry.
pub const MAX_TABLE_LEN: u32 = 32;

/// Returned (via `From`) when a cancellable retry loop is stopped by its token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation cancelled after {attempts} attempt(s)")]
pub struct RetryCancelled {
    pub attempts: u32,
}

/// Fixed table of backoff delays plus an attempt cap. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    delays: Vec<Duration>,
    max_attempts: u32,
}

impl RetryPolicy {
    /// Explicit delay table. `max_attempts` is clamped to at least 1.
    /// Retries past the end of the table reuse its last entry.
    pub fn new(delays: Vec<Duration>, max_attempts: u32) -> Self {
        Self {
            delays,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Table of `base * multiplier^k` for `k in 0..max_attempts`, at most
    /// [`MAX_TABLE_LEN`] entries long.
    pub fn exponential(base: Duration, multiplier: u32, max_attempts: u32) -> Self {
        let max_attempts = max_attempts.max(1);
        let len = max_attempts.min(MAX_TABLE_LEN);
        let mut delays = Vec::with_capacity(len as usize);
        let mut current = base;
        for _ in 0..len {
            delays.push(current);
            current = current.saturating_mul(multiplier);
        }
        Self {
            delays,
            max_attempts,
        }
    }

    /// Single attempt, no backoff.
    pub fn no_retry() -> Self {
        Self::new(Vec::new(), 1)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    /// Wait after failed attempt number `attempt` (1-based) before the next one.
    pub fn delay_before_retry(&self, attempt: u32) -> Duration {
        let idx = (attempt.saturating_sub(1) as usize).min(self.delays.len().saturating_sub(1));
        self.delays.get(idx).copied().unwrap_or(Duration::ZERO)
    }

    /// Upper bound on time spent sleeping when every attempt fails transiently.
    pub fn total_backoff(&self) -> Duration {
        (1..self.max_attempts)
            .map(|attempt| self.delay_before_retry(attempt))
            .sum()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_BACKOFF_SECS
                .iter()
                .map(|s| Duration::from_secs(*s))
                .collect(),
            DEFAULT_MAX_ATTEMPTS,
        )
    }
}

/// Decides whether an error is worth retrying. Supplied by the caller.
///
/// Implemented for any `Fn(&E) -> bool`, e.g. `DomainError::is_transient`.
pub trait TransientClassifier<E>: Send + Sync {
    fn is_transient(&self, error: &E) -> bool;
}

impl<E, F> TransientClassifier<E> for F
where
    F: Fn(&E) -> bool + Send + Sync,
{
    fn is_transient(&self, error: &E) -> bool {
        self(error)
    }
}

/// Suspends the caller between attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, delay: Duration);
}

/// Production sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

#[async_trait]
impl<T: Sleeper + ?Sized> Sleeper for Arc<T> {
    async fn sleep(&self, delay: Duration) {
        (**self).sleep(delay).await;
    }
}

/// Runs an operation, retrying transient failures sequentially with backoff.
pub struct RetryExecutor<C, S = TokioSleeper> {
    policy: RetryPolicy,
    classifier: C,
    sleeper: S,
}

impl<C> RetryExecutor<C, TokioSleeper> {
    pub fn new(policy: RetryPolicy, classifier: C) -> Self {
        Self {
            policy,
            classifier,
            sleeper: TokioSleeper,
        }
    }
}

impl<C, S: Sleeper> RetryExecutor<C, S> {
    /// Swap the sleeper (tests record delays instead of waiting).
    pub fn with_sleeper<S2: Sleeper>(self, sleeper: S2) -> RetryExecutor<C, S2> {
        RetryExecutor {
            policy: self.policy,
            classifier: self.classifier,
            sleeper,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Invoke `op` until it succeeds, fails non-transiently, or attempts run out.
    ///
    /// No sleep follows the final attempt. The returned error is the operation's own.
    pub async fn execute<T, E, F, Fut>(&self, mut op: F) -> Result<T, E>
    where
        C: TransientClassifier<E>,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let max_attempts = self.policy.max_attempts();
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(attempt, "operation succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) if !self.classifier.is_transient(&err) => {
                    debug!(attempt, error = %err, "non-transient failure, not retrying");
                    return Err(err);
                }
                Err(err) if attempt >= max_attempts => {
                    warn!(attempts = attempt, error = %err, "retries exhausted");
                    return Err(err);
                }
                Err(err) => {
                    let delay = self.policy.delay_before_retry(attempt);
                    warn!(
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient failure, backing off"
                    );
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Like [`execute`](Self::execute), but stops as soon as `token` is cancelled.
    ///
    /// A token cancelled up front prevents the first attempt. Cancelling during an
    /// attempt or a backoff drops it and returns `RetryCancelled` with the number
    /// of attempts started so far.
    pub async fn execute_cancellable<T, E, F, Fut>(
        &self,
        mut op: F,
        token: &CancellationToken,
    ) -> Result<T, E>
    where
        C: TransientClassifier<E>,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display + From<RetryCancelled>,
    {
        let started = AtomicU32::new(0);
        let counted = || {
            started.fetch_add(1, Ordering::Relaxed);
            op()
        };

        tokio::select! {
            biased;
            _ = token.cancelled() => {
                let attempts = started.load(Ordering::Relaxed);
                debug!(attempts, "retry loop cancelled");
                Err(RetryCancelled { attempts }.into())
            }
            result = self.execute(counted) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Error, PartialEq)]
    enum TestError {
        #[error("429 rate limited")]
        Transient,
        #[error("400 bad request")]
        Fatal,
        #[error(transparent)]
        Cancelled(#[from] RetryCancelled),
    }

    fn transient(e: &TestError) -> bool {
        matches!(e, TestError::Transient)
    }

    #[derive(Default)]
    struct RecordingSleeper {
        delays: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, delay: Duration) {
            self.delays.lock().unwrap().push(delay);
        }
    }

    fn secs(values: &[u64]) -> Vec<Duration> {
        values.iter().map(|s| Duration::from_secs(*s)).collect()
    }

    #[test]
    fn test_default_policy_table() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 5);
        assert_eq!(policy.delays(), secs(&[1, 2, 4, 8, 16]).as_slice());
        assert_eq!(policy.total_backoff(), Duration::from_secs(15));
    }

    #[test]
    fn test_exponential_matches_table() {
        let computed = RetryPolicy::exponential(Duration::from_secs(1), 2, 5);
        assert_eq!(computed, RetryPolicy::default());
    }

    #[test]
    fn test_exponential_table_is_bounded() {
        let policy = RetryPolicy::exponential(Duration::from_millis(10), 2, u32::MAX);
        assert_eq!(policy.max_attempts(), u32::MAX);
        assert_eq!(policy.delays().len(), MAX_TABLE_LEN as usize);
        let last = *policy.delays().last().unwrap();
        assert_eq!(policy.delay_before_retry(u32::MAX - 1), last);
    }

    #[test]
    fn test_delay_clamps_to_last_entry() {
        let policy = RetryPolicy::new(secs(&[1, 3]), 6);
        assert_eq!(policy.delay_before_retry(1), Duration::from_secs(1));
        assert_eq!(policy.delay_before_retry(2), Duration::from_secs(3));
        assert_eq!(policy.delay_before_retry(5), Duration::from_secs(3));
        assert_eq!(RetryPolicy::no_retry().delay_before_retry(1), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_always_transient_exhausts() {
        let sleeper = Arc::new(RecordingSleeper::default());
        let executor = RetryExecutor::new(RetryPolicy::default(), transient)
            .with_sleeper(Arc::clone(&sleeper));
        let calls = AtomicU32::new(0);

        let result: Result<(), TestError> = executor
            .execute(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TestError::Transient) }
            })
            .await;

        assert_eq!(result, Err(TestError::Transient));
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(*sleeper.delays.lock().unwrap(), secs(&[1, 2, 4, 8]));
    }

    #[tokio::test]
    async fn test_success_on_third_attempt() {
        let sleeper = Arc::new(RecordingSleeper::default());
        let executor = RetryExecutor::new(RetryPolicy::default(), transient)
            .with_sleeper(Arc::clone(&sleeper));
        let calls = AtomicU32::new(0);

        let result = executor
            .execute(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 3 {
                        Err(TestError::Transient)
                    } else {
                        Ok("answer")
                    }
                }
            })
            .await;

        assert_eq!(result, Ok("answer"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(sleeper.delays.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_fatal_error_is_not_retried() {
        let sleeper = Arc::new(RecordingSleeper::default());
        let executor = RetryExecutor::new(RetryPolicy::default(), transient)
            .with_sleeper(Arc::clone(&sleeper));
        let calls = AtomicU32::new(0);

        let result: Result<u8, TestError> = executor
            .execute(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TestError::Fatal) }
            })
            .await;

        assert_eq!(result, Err(TestError::Fatal));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(sleeper.delays.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_before_first_attempt() {
        let executor = RetryExecutor::new(RetryPolicy::default(), transient)
            .with_sleeper(RecordingSleeper::default());
        let token = CancellationToken::new();
        token.cancel();
        let calls = AtomicU32::new(0);

        let result: Result<(), TestError> = executor
            .execute_cancellable(
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Ok(()) }
                },
                &token,
            )
            .await;

        assert_eq!(
            result,
            Err(TestError::Cancelled(RetryCancelled { attempts: 0 }))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_backoff() {
        let policy = RetryPolicy::new(secs(&[60]), 3);
        let executor = RetryExecutor::new(policy, transient);
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let result: Result<(), TestError> = tokio::time::timeout(
            Duration::from_secs(5),
            executor.execute_cancellable(|| async { Err(TestError::Transient) }, &token),
        )
        .await
        .expect("cancel should cut the 60s backoff short");

        assert_eq!(
            result,
            Err(TestError::Cancelled(RetryCancelled { attempts: 1 }))
        );
    }

    #[tokio::test]
    async fn test_cancellable_passes_through_success() {
        let executor = RetryExecutor::new(RetryPolicy::default(), transient)
            .with_sleeper(RecordingSleeper::default());
        let token = CancellationToken::new();
        let result: Result<u32, TestError> =
            executor.execute_cancellable(|| async { Ok(7) }, &token).await;
        assert_eq!(result, Ok(7));
    }
}
