//! Exponential back-off for catalog requests.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries only
//! on [`CatalogError::Throttled`] (HTTP 429 / 403). Every other error is
//! returned on the spot. When throttling outlasts the retry budget the caller
//! gets [`CatalogError::QuotaExceeded`].

use std::future::Future;
use std::time::Duration;

use crate::error::CatalogError;

/// Retry budget and delay schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure.
    pub max_retries: u32,
    /// Sleep before the first retry; doubled for each retry after it.
    pub initial_delay: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(2))
    }
}

/// Returns `true` for errors worth retrying after a back-off delay.
///
/// Only throttling qualifies. Network failures, unexpected statuses and
/// malformed bodies are treated as fatal for the run.
pub(crate) fn is_retriable(err: &CatalogError) -> bool {
    matches!(err, CatalogError::Throttled { .. })
}

/// Delay before the `retry_number`-th retry (1-based).
///
/// | Retry | Delay with the default policy |
/// |-------|-------------------------------|
/// | 1     | 2 s                           |
/// | 2     | 4 s                           |
/// | 3     | 8 s                           |
/// | 4     | 16 s                          |
/// | 5     | 32 s                          |
#[must_use]
pub fn backoff_delay(policy: &RetryPolicy, retry_number: u32) -> Duration {
    let exponent = retry_number.saturating_sub(1).min(31);
    policy.initial_delay.saturating_mul(1u32 << exponent)
}

/// Runs `operation`, retrying throttled attempts up to `policy.max_retries`
/// times.
///
/// No sleep follows the final failed attempt.
///
/// # Errors
///
/// - [`CatalogError::QuotaExceeded`] when every attempt was throttled.
/// - Any non-throttling error from `operation`, unchanged and without retry.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, CatalogError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CatalogError>>,
{
    let mut retries = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if is_retriable(&err) => {
                if retries >= policy.max_retries {
                    tracing::error!(
                        attempts = retries + 1,
                        error = %err,
                        "catalog throttling persisted through all retries"
                    );
                    return Err(CatalogError::QuotaExceeded {
                        attempts: retries + 1,
                    });
                }
                retries += 1;
                let delay = backoff_delay(policy, retries);
                tracing::warn!(
                    attempt = retries,
                    max_retries = policy.max_retries,
                    delay_secs = delay.as_secs_f64(),
                    error = %err,
                    "catalog request throttled \u{2014} retrying after back-off"
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use tokio::time::Instant;

    use super::*;

    fn throttled() -> CatalogError {
        CatalogError::Throttled {
            status: 429,
            endpoint: "videos".to_owned(),
        }
    }

    #[test]
    fn default_policy_matches_documented_schedule() {
        let policy = RetryPolicy::default();
        let delays: Vec<u64> = (1..=5)
            .map(|n| backoff_delay(&policy, n).as_secs())
            .collect();
        assert_eq!(delays, vec![2, 4, 8, 16, 32]);
    }

    #[test]
    fn backoff_delay_saturates_instead_of_overflowing() {
        let policy = RetryPolicy::new(100, Duration::from_secs(u64::MAX / 2));
        assert_eq!(backoff_delay(&policy, 40), Duration::MAX);
    }

    #[test]
    fn only_throttling_is_retriable() {
        assert!(is_retriable(&throttled()));
        assert!(!is_retriable(&CatalogError::InvalidChannel("UCx".to_owned())));
        assert!(!is_retriable(&CatalogError::QuotaExceeded { attempts: 6 }));
        assert!(!is_retriable(&CatalogError::UnexpectedStatus {
            status: 400,
            endpoint: "channels".to_owned(),
            message: "bad request".to_owned(),
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let started = Instant::now();
        let result = retry_with_backoff(&RetryPolicy::default(), || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, CatalogError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn four_throttles_then_success_sleeps_2_4_8_16() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let started = Instant::now();
        let result = retry_with_backoff(&RetryPolicy::default(), || {
            let c = Arc::clone(&c);
            async move {
                let attempt = c.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 5 {
                    Err(throttled())
                } else {
                    Ok::<u32, CatalogError>(99)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 99);
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(started.elapsed(), Duration::from_secs(2 + 4 + 8 + 16));
    }

    #[tokio::test(start_paused = true)]
    async fn sixth_consecutive_throttle_is_quota_exceeded() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let started = Instant::now();
        let result = retry_with_backoff(&RetryPolicy::default(), || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(throttled())
            }
        })
        .await;
        assert!(
            matches!(result, Err(CatalogError::QuotaExceeded { attempts: 6 })),
            "expected QuotaExceeded after 6 attempts, got: {result:?}"
        );
        assert_eq!(calls.load(Ordering::SeqCst), 6);
        assert_eq!(started.elapsed(), Duration::from_secs(2 + 4 + 8 + 16 + 32));
    }

    #[tokio::test(start_paused = true)]
    async fn does_not_retry_invalid_channel() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(&RetryPolicy::default(), || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(CatalogError::InvalidChannel("UCbad".to_owned()))
            }
        })
        .await;
        assert_eq!(
            calls.load(Ordering::SeqCst),
            1,
            "InvalidChannel must not be retried"
        );
        assert!(matches!(result, Err(CatalogError::InvalidChannel(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_retries_fails_on_first_throttle() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(&RetryPolicy::new(0, Duration::from_secs(2)), || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(throttled())
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(
            result,
            Err(CatalogError::QuotaExceeded { attempts: 1 })
        ));
    }
}
