//! Per-host request spacing.
//!
//! Each host gets a token bucket with burst 1 and a fixed refill interval:
//! the first request fires immediately, every later one is spaced at least
//! `fire_delay` after the previous slot. At most one limiter object exists
//! per host for the lifetime of the process.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Token bucket for a single host.
///
/// The bucket state is the earliest instant the next request may fire.
/// Reserving a slot is a short synchronous critical section; the actual
/// waiting happens outside it, so concurrent callers queue up FIFO-ish
/// without holding any lock while asleep.
#[derive(Debug)]
pub struct HostLimiter {
    fire_delay: Duration,
    next_slot: Mutex<Instant>,
}

impl HostLimiter {
    fn new(fire_delay: Duration) -> Self {
        Self {
            fire_delay,
            next_slot: Mutex::new(Instant::now()),
        }
    }

    /// Reserve the next free slot and sleep until it arrives.
    ///
    /// Never fails; cancellation is handled by the caller dropping the
    /// future at a select point.
    pub async fn acquire(&self) {
        let slot = {
            let mut next = self.next_slot.lock();
            let slot = (*next).max(Instant::now());
            *next = slot + self.fire_delay;
            slot
        };
        tokio::time::sleep_until(slot).await;
    }
}

/// Lazily-populated map of host limiters sharing one refill interval.
#[derive(Debug)]
pub struct RateLimiterMap {
    fire_delay: Duration,
    limiters: DashMap<String, Arc<HostLimiter>>,
}

impl RateLimiterMap {
    #[must_use]
    pub fn new(fire_delay: Duration) -> Self {
        Self {
            fire_delay,
            limiters: DashMap::new(),
        }
    }

    /// Get the limiter for `host`, creating it on first request.
    #[must_use]
    pub fn limiter(&self, host: &str) -> Arc<HostLimiter> {
        Arc::clone(
            self.limiters
                .entry(host.to_string())
                .or_insert_with(|| Arc::new(HostLimiter::new(self.fire_delay)))
                .value(),
        )
    }

    /// Number of hosts with a limiter so far.
    #[must_use]
    pub fn tracked_count(&self) -> usize {
        self.limiters.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn one_limiter_per_host() {
        let map = RateLimiterMap::new(Duration::from_secs(2));
        let a = map.limiter("example.com");
        let b = map.limiter("example.com");
        assert!(Arc::ptr_eq(&a, &b));
        let _ = map.limiter("other.com");
        assert_eq!(map.tracked_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_three_is_spaced_by_fire_delay() {
        let fire_delay = Duration::from_secs(1);
        let map = RateLimiterMap::new(fire_delay);
        let limiter = map.limiter("a.com");

        let start = Instant::now();
        limiter.acquire().await;
        let first = start.elapsed();
        limiter.acquire().await;
        let second = start.elapsed();
        limiter.acquire().await;
        let third = start.elapsed();

        assert!(first < Duration::from_millis(10), "first fires immediately");
        assert!(second >= fire_delay, "second waits one interval, got {second:?}");
        assert!(third >= fire_delay * 2, "third waits two intervals, got {third:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn hosts_do_not_share_buckets() {
        let map = RateLimiterMap::new(Duration::from_secs(5));
        let start = Instant::now();
        map.limiter("a.com").acquire().await;
        map.limiter("b.com").acquire().await;
        assert!(start.elapsed() < Duration::from_millis(10));
    }
}
