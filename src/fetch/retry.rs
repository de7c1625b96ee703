//! Exponential backoff around any [`PageSource`].
//!
//! Only failures whose [`FailureKind`](crate::error::FailureKind) is
//! retryable (rate limiting, timeouts, network errors) are retried. A 403 or
//! 404 will not change on the next attempt and is returned immediately.
//!
//! ```text
//! delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
//! ```

use super::PageSource;
use crate::error::FetchError;
use crate::sources::SourceConfig;
use rand::{rng, Rng};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, instrument, warn};

const MAX_JITTER_MS: u64 = 250;

/// Decorator that retries the wrapped [`PageSource`] with backoff and jitter.
pub struct RetryFetch<T> {
    inner: T,
    /// Retries after the first attempt.
    max_retries: usize,
    /// Doubles with each retry.
    base_delay: Duration,
    max_delay: Duration,
}

impl<T> RetryFetch<T>
where
    T: PageSource,
{
    /// # Arguments
    ///
    /// * `inner` - The page source to wrap
    /// * `max_retries` - Retries after the first attempt (0 disables retrying)
    /// * `base_delay` - Delay before the first retry
    pub fn new(inner: T, max_retries: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: Duration::from_secs(30),
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    fn backoff(&self, attempt: usize) -> Duration {
        let shift = (attempt.saturating_sub(1)).min(16) as u32;
        let delay = self.base_delay.saturating_mul(1 << shift).min(self.max_delay);
        delay + Duration::from_millis(rng().random_range(0..=MAX_JITTER_MS))
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> PageSource for RetryFetch<T>
where
    T: PageSource,
{
    #[instrument(level = "info", skip(self, source), fields(source = %source.id))]
    async fn fetch(&self, url: &str, source: &SourceConfig) -> Result<String, FetchError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let err = match self.inner.fetch(url, source).await {
                Ok(body) => return Ok(body),
                Err(e) => e,
            };
            attempt += 1;
            let elapsed_ms_total = total_t0.elapsed().as_millis() as u64;

            if !err.kind().is_retryable() {
                return Err(err);
            }
            if attempt > self.max_retries {
                error!(
                    attempt,
                    max = self.max_retries,
                    elapsed_ms_total,
                    error = %err,
                    "Fetch exhausted retries"
                );
                return Err(err);
            }

            let delay = self.backoff(attempt);
            warn!(
                attempt,
                max = self.max_retries,
                elapsed_ms_total,
                ?delay,
                error = %err,
                "Fetch attempt failed; backing off"
            );
            sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{registry, SourceId};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted outcomes and counts calls.
    struct Scripted {
        outcomes: Mutex<VecDeque<Result<String, FetchError>>>,
        calls: Mutex<usize>,
    }

    impl Scripted {
        fn new(outcomes: Vec<Result<String, FetchError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    impl PageSource for Scripted {
        async fn fetch(&self, _url: &str, _source: &SourceConfig) -> Result<String, FetchError> {
            *self.calls.lock().unwrap() += 1;
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::Network("script exhausted".into())))
        }
    }

    fn source() -> &'static SourceConfig {
        registry().config_or_custom(SourceId::Custom)
    }

    #[tokio::test]
    async fn test_retries_transient_failures_then_succeeds() {
        let inner = Scripted::new(vec![
            Err(FetchError::RateLimited),
            Err(FetchError::Timeout(30)),
            Ok("<html></html>".into()),
        ]);
        let retry = RetryFetch::new(inner, 3, Duration::from_millis(10));
        let body = retry.fetch("https://e.com", source()).await.unwrap();
        assert_eq!(body, "<html></html>");
        assert_eq!(retry.inner().calls(), 3);
    }

    #[tokio::test]
    async fn test_permanent_failures_are_not_retried() {
        let inner = Scripted::new(vec![Err(FetchError::Blocked), Ok("never".into())]);
        let retry = RetryFetch::new(inner, 3, Duration::from_millis(10));
        let err = retry.fetch("https://e.com", source()).await.unwrap_err();
        assert!(matches!(err, FetchError::Blocked));
        assert_eq!(retry.inner().calls(), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let inner = Scripted::new(vec![]);
        let retry = RetryFetch::new(inner, 2, Duration::from_millis(10));
        let err = retry.fetch("https://e.com", source()).await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
        assert_eq!(retry.inner().calls(), 3);
    }

    #[test]
    fn test_backoff_is_capped() {
        let retry = RetryFetch::new(Scripted::new(vec![]), 10, Duration::from_secs(1));
        assert!(retry.backoff(1) < Duration::from_millis(1_300));
        assert!(retry.backoff(10) <= Duration::from_secs(30) + Duration::from_millis(MAX_JITTER_MS));
    }
}
