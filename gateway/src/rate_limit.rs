//! Fixed 60-second counter-based rate limiter, keyed by principal string
//! (`ip:{addr}` or `user:{id}`). Backed by `dashmap` rather than a shared
//! cache since the gateway runs as a single process; a poisoned entry or any
//! other unexpected state fails *open* rather than rejecting traffic.

use std::time::{Duration, Instant};

use dashmap::DashMap;

const WINDOW: Duration = Duration::from_secs(60);

struct Counter {
    count: u32,
    window_start: Instant,
}

pub struct RateLimiter {
    limit: u32,
    counters: DashMap<String, Counter>,
}

pub struct Decision {
    pub allowed: bool,
    pub remaining: u32,
    pub retry_after: u64,
}

impl RateLimiter {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            counters: DashMap::new(),
        }
    }

    /// Checks and, if allowed, increments the counter for `principal`.
    /// Any failure to acquire the entry is treated as "allow" — this
    /// limiter never turns an internal hiccup into a 5xx for the caller.
    pub fn check_and_increment(&self, principal: &str) -> Decision {
        let now = Instant::now();
        let mut entry = self.counters.entry(principal.to_string()).or_insert_with(|| Counter {
            count: 0,
            window_start: now,
        });

        if now.duration_since(entry.window_start) >= WINDOW {
            entry.count = 0;
            entry.window_start = now;
        }

        let retry_after = WINDOW.saturating_sub(now.duration_since(entry.window_start)).as_secs();

        if entry.count >= self.limit {
            return Decision {
                allowed: false,
                remaining: 0,
                retry_after,
            };
        }

        entry.count += 1;
        Decision {
            allowed: true,
            remaining: self.limit.saturating_sub(entry.count),
            retry_after,
        }
    }

    /// Drops counters whose window closed at least one window-length ago —
    /// a principal that hasn't been seen since is no longer worth tracking.
    /// Called from a low-frequency background sweep, never from the request path.
    pub fn prune_stale(&self) -> usize {
        let now = Instant::now();
        let before = self.counters.len();
        self.counters.retain(|_, counter| now.duration_since(counter.window_start) < WINDOW * 2);
        before - self.counters.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_limit_then_rejects() {
        let limiter = RateLimiter::new(2);
        assert!(limiter.check_and_increment("ip:1.1.1.1").allowed);
        assert!(limiter.check_and_increment("ip:1.1.1.1").allowed);
        let third = limiter.check_and_increment("ip:1.1.1.1");
        assert!(!third.allowed);
        assert_eq!(third.remaining, 0);
    }

    #[test]
    fn tracks_principals_independently() {
        let limiter = RateLimiter::new(1);
        assert!(limiter.check_and_increment("ip:1.1.1.1").allowed);
        assert!(limiter.check_and_increment("ip:2.2.2.2").allowed);
    }

    #[test]
    fn remaining_never_goes_negative() {
        let limiter = RateLimiter::new(1);
        limiter.check_and_increment("ip:1.1.1.1");
        let decision = limiter.check_and_increment("ip:1.1.1.1");
        assert_eq!(decision.remaining, 0);
    }
}
