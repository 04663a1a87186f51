//! Bounded polling waits.
//!
//! Every suspension point in a crawl is one of these: poll a condition until it
//! holds or the timeout elapses. A timeout is reported, never raised.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Interval between predicate evaluations.
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Poll `predicate` until it returns `true` or `timeout` elapses.
///
/// The predicate is evaluated at least once. Returns whether it held.
pub async fn wait_until<F, Fut>(timeout: Duration, mut predicate: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if predicate().await {
            return true;
        }
        let now = Instant::now();
        if now >= deadline {
            return false;
        }
        tokio::time::sleep(POLL_INTERVAL.min(deadline - now)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_returns_true_once_condition_holds() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let held = wait_until(Duration::from_secs(5), move || {
            let counter = counter.clone();
            async move { counter.fetch_add(1, Ordering::SeqCst) >= 2 }
        })
        .await;

        assert!(held);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_without_error() {
        let started = Instant::now();
        let held = wait_until(Duration::from_secs(2), || async { false }).await;

        assert!(!held);
        assert!(started.elapsed() >= Duration::from_secs(2));
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_timeout_checks_once() {
        assert!(wait_until(Duration::ZERO, || async { true }).await);
        assert!(!wait_until(Duration::ZERO, || async { false }).await);
    }
}
