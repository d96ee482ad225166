//! Pacing and retry primitives for remote sources.

use std::sync::Arc;

use backon::ExponentialBuilder;
use tokio::sync::Semaphore;
use tokio::time::{sleep, Duration};

/// Per-source rate limiter.
///
/// Limits throughput to a configurable number of requests per second by
/// combining a single-permit [`Semaphore`] with a fixed sleep interval.
/// Clones share the same permit, so every handle on one client draws from
/// the same budget.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    interval: Duration,
}

impl RateLimiter {
    /// Creates a new `RateLimiter` that allows at most
    /// `requests_per_second` requests per second.
    pub fn new(requests_per_second: u32) -> Self {
        Self::with_interval(Duration::from_millis(
            1000 / u64::from(requests_per_second.max(1)),
        ))
    }

    /// Creates a limiter that spaces requests `interval` apart.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(1)),
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits until a request slot is available, then holds the slot for
    /// the configured interval to enforce the rate limit.
    pub async fn acquire(&self) {
        // The semaphore is never closed; an error would only mean there is
        // nothing left to pace against.
        if let Ok(_permit) = self.semaphore.acquire().await {
            sleep(self.interval).await;
        }
    }
}

/// Backoff used when re-attempting image downloads.
pub fn download_backoff(attempts: usize) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(500))
        .with_max_delay(Duration::from_secs(8))
        .with_max_times(attempts.saturating_sub(1))
}
