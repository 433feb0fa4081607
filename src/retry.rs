//! Retry with full-jitter exponential backoff for outbound backend calls.
//!
//! Classification is intentionally domain-free: a failure is summarized as
//! an optional HTTP status plus an optional message, and [`is_transient`]
//! decides from that descriptor alone.

use std::future::Future;
use std::time::Duration;

use tracing::{error, warn};

/// Message substrings that mark a failure as transient when the status
/// code does not already say so.
const TRANSIENT_MARKERS: [&str; 3] = ["timeout", "network", "connection"];

/// Attempt budget and backoff base for one retried operation.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first (6 = one initial try plus five
    /// retries).
    pub max_attempts: u32,
    /// Backoff base; the delay ceiling before retry `i` is `base * 2^i`.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            base_delay: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Single attempt, no retries.
    pub fn no_retries() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Full-jitter delay before retry `retry` (0-indexed): uniform over
    /// `[0, base * 2^retry)`. No upper cap is applied.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let ceiling = self.base_delay.as_millis() as f64 * 2f64.powi(retry as i32);
        Duration::from_millis((rand::random::<f64>() * ceiling) as u64)
    }
}

/// Classify a failure from its normalized descriptor.
///
/// Transient: status 5xx or exactly 429, or a message containing
/// "timeout", "network" or "connection" (case-insensitive). Any other
/// status without a matching message is fatal, as are shape mismatches
/// and invalid parameters. A failure carrying neither signal is treated
/// as transient.
pub fn is_transient(status: Option<u16>, message: Option<&str>) -> bool {
    if let Some(code) = status
        && (code >= 500 || code == 429)
    {
        return true;
    }
    if let Some(text) = message {
        let text = text.to_ascii_lowercase();
        if TRANSIENT_MARKERS.iter().any(|marker| text.contains(marker)) {
            return true;
        }
    }
    status.is_none() && message.is_none()
}

/// Run `operation` until it succeeds, fails fatally, or exhausts the
/// attempt budget. The final failure is returned unchanged.
///
/// `classify` decides retryability; every retry and the final failure are
/// logged with the attempt number.
pub async fn retry_with_backoff<T, E, F, Fut, C>(
    policy: &RetryPolicy,
    mut operation: F,
    classify: C,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let mut failures = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                failures += 1;
                if failures >= policy.max_attempts || !classify(&e) {
                    error!(attempts = failures, error = %e, "giving up on backend operation");
                    return Err(e);
                }

                let delay = policy.delay_for(failures - 1);
                warn!(
                    attempt = failures,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug, PartialEq)]
    enum TestError {
        Transient,
        Fatal,
    }

    impl std::fmt::Display for TestError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                TestError::Transient => write!(f, "temporary glitch"),
                TestError::Fatal => write!(f, "permanent failure"),
            }
        }
    }

    fn retryable(e: &TestError) -> bool {
        matches!(e, TestError::Transient)
    }

    #[test]
    fn test_server_statuses_are_transient() {
        assert!(is_transient(Some(500), None));
        assert!(is_transient(Some(503), Some("Service Unavailable")));
        assert!(is_transient(Some(599), None));
        assert!(is_transient(Some(429), Some("Too Many Requests")));
    }

    #[test]
    fn test_client_statuses_are_fatal() {
        assert!(!is_transient(Some(400), Some("Bad Request")));
        assert!(!is_transient(Some(401), Some("Unauthorized")));
        assert!(!is_transient(Some(404), None));
        assert!(!is_transient(Some(422), Some("Unprocessable Entity")));
    }

    #[test]
    fn test_message_markers_are_transient() {
        assert!(is_transient(None, Some("connect timeout")));
        assert!(is_transient(None, Some("Network unreachable")));
        assert!(is_transient(None, Some("Connection refused")));
        assert!(is_transient(None, Some("TIMEOUT waiting for upstream")));
        assert!(!is_transient(None, Some("invalid api key")));
    }

    #[test]
    fn test_marker_overrides_client_status() {
        assert!(is_transient(Some(400), Some("upstream timeout while proxying")));
    }

    #[test]
    fn test_no_signal_is_transient() {
        assert!(is_transient(None, None));
    }

    #[test]
    fn test_delay_stays_under_jitter_ceiling() {
        let policy = RetryPolicy::default();
        for retry in 0..5u32 {
            let ceiling = 100 * 2u128.pow(retry);
            for _ in 0..32 {
                assert!(policy.delay_for(retry).as_millis() <= ceiling);
            }
        }
    }

    #[test]
    fn test_zero_base_means_no_delay() {
        let policy = RetryPolicy::new(3, Duration::ZERO);
        assert_eq!(policy.delay_for(4), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_success_needs_single_attempt() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(
            &RetryPolicy::new(6, Duration::ZERO),
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, TestError>(42) }
            },
            retryable,
        )
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(
            &RetryPolicy::new(6, Duration::ZERO),
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n == 0 {
                        Err(TestError::Transient)
                    } else {
                        Ok("recovered")
                    }
                }
            },
            retryable,
        )
        .await;

        assert_eq!(result, Ok("recovered"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fatal_failure_is_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_with_backoff(
            &RetryPolicy::new(6, Duration::ZERO),
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TestError::Fatal) }
            },
            retryable,
        )
        .await;

        assert_eq!(result, Err(TestError::Fatal));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_budget_exhaustion_surfaces_last_error() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_with_backoff(
            &RetryPolicy::new(6, Duration::ZERO),
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(TestError::Transient) }
            },
            retryable,
        )
        .await;

        assert_eq!(result, Err(TestError::Transient));
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }
}
