//! Per-client trailing-window request limiter.
//!
//! Each client owns an ordered queue of admission timestamps. On every check
//! the queue is pruned to the trailing window, then the request is admitted
//! only if fewer than `max_requests` timestamps remain.
//!
//! # Concurrency
//!
//! State lives in a [`DashMap`]. The prune, count and append for one client
//! happen while holding that entry's shard lock, so concurrent bursts from the
//! same client cannot over- or under-count. Different clients usually land on
//! different shards and do not contend.
//!
//! # Memory
//!
//! A client entry survives as long as its window holds timestamps.
//! [`SlidingWindowLimiter::evict_idle`] drops entries whose window has drained;
//! the application runs it from a background task.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Outcome of a single admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed {
        /// Requests still available in the current window
        remaining: u32,
    },
    Rejected {
        /// Time until the oldest counted request leaves the window
        retry_after: Duration,
    },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed { .. })
    }
}

/// Sliding-window limiter keyed by client identifier.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    windows: DashMap<String, VecDeque<Instant>>,
    max_requests: u32,
    window: Duration,
}

impl SlidingWindowLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests,
            window,
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Check and record a request for `client_id` at the current instant.
    pub fn admit(&self, client_id: &str) -> Decision {
        self.admit_at(client_id, Instant::now())
    }

    /// Check and record a request for `client_id` at `now`.
    pub fn admit_at(&self, client_id: &str, now: Instant) -> Decision {
        // Avoid allocating the key for clients we have already seen
        let mut entry = match self.windows.get_mut(client_id) {
            Some(entry) => entry,
            None => self.windows.entry(client_id.to_string()).or_default(),
        };
        let timestamps = entry.value_mut();

        prune(timestamps, now, self.window);

        let count = u32::try_from(timestamps.len()).unwrap_or(u32::MAX);
        if count >= self.max_requests {
            let retry_after = timestamps
                .front()
                .map(|oldest| (*oldest + self.window).saturating_duration_since(now))
                .unwrap_or(self.window);
            return Decision::Rejected { retry_after };
        }

        timestamps.push_back(now);
        Decision::Allowed {
            remaining: self.max_requests - count - 1,
        }
    }

    /// Prune every client and drop those whose window is empty.
    ///
    /// Returns the number of evicted clients.
    pub fn evict_idle(&self) -> usize {
        self.evict_idle_at(Instant::now())
    }

    pub fn evict_idle_at(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, timestamps| {
            prune(timestamps, now, self.window);
            !timestamps.is_empty()
        });
        before.saturating_sub(self.windows.len())
    }

    /// Number of clients currently holding state.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    /// Requests counted for `client_id` as of the last check (not pruned).
    pub fn recorded_requests(&self, client_id: &str) -> usize {
        self.windows.get(client_id).map(|w| w.len()).unwrap_or(0)
    }
}

/// Drop timestamps that are at least `window` old.
fn prune(timestamps: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(oldest) = timestamps.front() {
        if now.saturating_duration_since(*oldest) >= window {
            timestamps.pop_front();
        } else {
            break;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_admits_up_to_threshold() {
        let limiter = SlidingWindowLimiter::new(5, secs(60));
        let t0 = Instant::now();

        for i in 0..5 {
            assert!(limiter.admit_at("client", t0 + secs(i)).is_allowed());
        }
        assert!(!limiter.admit_at("client", t0 + secs(5)).is_allowed());
    }

    #[test]
    fn test_remaining_counts_down() {
        let limiter = SlidingWindowLimiter::new(3, secs(60));
        let t0 = Instant::now();

        assert_eq!(limiter.admit_at("c", t0), Decision::Allowed { remaining: 2 });
        assert_eq!(limiter.admit_at("c", t0), Decision::Allowed { remaining: 1 });
        assert_eq!(limiter.admit_at("c", t0), Decision::Allowed { remaining: 0 });
    }

    #[test]
    fn test_threshold_two_scenario() {
        let limiter = SlidingWindowLimiter::new(2, secs(60));
        let t0 = Instant::now();

        assert!(limiter.admit_at("1.2.3.4", t0).is_allowed());
        assert!(limiter.admit_at("1.2.3.4", t0 + secs(1)).is_allowed());
        assert_eq!(
            limiter.admit_at("1.2.3.4", t0 + secs(2)),
            Decision::Rejected {
                retry_after: secs(58)
            }
        );
        assert!(limiter.admit_at("1.2.3.4", t0 + secs(61)).is_allowed());
    }

    #[test]
    fn test_rejected_requests_are_not_recorded() {
        let limiter = SlidingWindowLimiter::new(1, secs(60));
        let t0 = Instant::now();

        assert!(limiter.admit_at("c", t0).is_allowed());
        for i in 1..10 {
            assert!(!limiter.admit_at("c", t0 + secs(i)).is_allowed());
        }
        assert_eq!(limiter.recorded_requests("c"), 1);
        // Window measured from the one admitted request only
        assert!(limiter.admit_at("c", t0 + secs(60)).is_allowed());
    }

    #[test]
    fn test_window_resets_after_quiet_period() {
        let limiter = SlidingWindowLimiter::new(3, secs(60));
        let t0 = Instant::now();

        for _ in 0..3 {
            assert!(limiter.admit_at("c", t0).is_allowed());
        }
        assert!(!limiter.admit_at("c", t0 + secs(59)).is_allowed());

        for _ in 0..3 {
            assert!(limiter.admit_at("c", t0 + secs(120)).is_allowed());
        }
    }

    #[test]
    fn test_clients_are_independent() {
        let limiter = SlidingWindowLimiter::new(1, secs(60));
        let t0 = Instant::now();

        assert!(limiter.admit_at("a", t0).is_allowed());
        assert!(!limiter.admit_at("a", t0).is_allowed());
        assert!(limiter.admit_at("b", t0).is_allowed());
    }

    #[test]
    fn test_zero_threshold_rejects_everything() {
        let limiter = SlidingWindowLimiter::new(0, secs(60));
        assert!(!limiter.admit_at("c", Instant::now()).is_allowed());
    }

    #[test]
    fn test_evict_idle_drops_drained_clients() {
        let limiter = SlidingWindowLimiter::new(10, secs(60));
        let t0 = Instant::now();

        limiter.admit_at("old", t0);
        limiter.admit_at("fresh", t0 + secs(50));
        assert_eq!(limiter.tracked_clients(), 2);

        let evicted = limiter.evict_idle_at(t0 + secs(70));
        assert_eq!(evicted, 1);
        assert_eq!(limiter.tracked_clients(), 1);
        assert_eq!(limiter.recorded_requests("old"), 0);
        assert_eq!(limiter.recorded_requests("fresh"), 1);
    }

    #[test]
    fn test_evicted_client_starts_fresh() {
        let limiter = SlidingWindowLimiter::new(1, secs(60));
        let t0 = Instant::now();

        assert!(limiter.admit_at("c", t0).is_allowed());
        limiter.evict_idle_at(t0 + secs(60));
        assert!(limiter.admit_at("c", t0 + secs(60)).is_allowed());
    }

    #[test]
    fn test_concurrent_burst_never_over_admits() {
        let limiter = Arc::new(SlidingWindowLimiter::new(50, secs(60)));
        let t0 = Instant::now();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || {
                    (0..25)
                        .filter(|_| limiter.admit_at("burst", t0).is_allowed())
                        .count()
                })
            })
            .collect();

        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 50);
        assert_eq!(limiter.recorded_requests("burst"), 50);
    }
}
