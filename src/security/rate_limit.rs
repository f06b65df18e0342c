//! Sliding-window rate limiting for outbound operations.
//!
//! A [`RateLimiter`] admits at most `max_requests` operations within any
//! trailing `window`. It keeps the timestamps of admitted operations and
//! evicts expired ones lazily on every check. Denied attempts are never
//! recorded.
//!
//! Limiters are built by their owner (usually from [`crate::AppConfig`])
//! and handed to whatever performs gated calls, either directly, as
//! `&mut dyn Admission`, or wrapped in a [`SharedRateLimiter`] when several
//! threads need the same budget.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::observability::metrics;

pub const DEFAULT_MAX_REQUESTS: u32 = 30;
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(60_000);

/// Time source for admission decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock monotonic time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Returned by [`RateLimiter::gate`] when the operation was not admitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateLimitError {
    #[error("rate limit exceeded for {limiter}: {max_requests} requests per {}ms", .window.as_millis())]
    Exceeded {
        limiter: String,
        max_requests: u32,
        window: Duration,
    },
}

/// Admission control seen by gated call sites.
pub trait Admission {
    /// Admit and record one operation, or refuse without recording.
    fn try_admit(&mut self) -> bool;

    /// Operations still admissible in the current window.
    fn remaining(&mut self) -> u32;
}

/// Sliding-window rate limiter.
pub struct RateLimiter {
    timestamps: VecDeque<Instant>,
    max_requests: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
    name: String,
}

impl RateLimiter {
    /// Create a limiter on the system clock.
    ///
    /// Zero limits are raised to one request and one millisecond.
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self::with_clock(max_requests, window, Arc::new(SystemClock))
    }

    pub fn with_clock(max_requests: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            timestamps: VecDeque::new(),
            max_requests: max_requests.max(1),
            window: window.max(Duration::from_millis(1)),
            clock,
            name: "default".to_string(),
        }
    }

    /// Label used in logs and metrics.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    fn evict(&mut self, now: Instant) {
        while let Some(&oldest) = self.timestamps.front() {
            if now.saturating_duration_since(oldest) >= self.window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// Admit one operation if the window has room.
    ///
    /// Callers must skip the gated operation when this returns `false`.
    pub fn can_make_request(&mut self) -> bool {
        let now = self.clock.now();
        self.evict(now);

        if self.timestamps.len() >= self.max_requests as usize {
            tracing::warn!(
                limiter = %self.name,
                max_requests = self.max_requests,
                window_ms = self.window.as_millis() as u64,
                "Rate limit exceeded"
            );
            metrics::record_rate_limited(&self.name);
            return false;
        }

        self.timestamps.push_back(now);
        metrics::record_admitted(&self.name);
        true
    }

    /// Remaining admissions in the current window. Only evicts, never records.
    pub fn remaining_requests(&mut self) -> u32 {
        let now = self.clock.now();
        self.evict(now);
        self.max_requests.saturating_sub(self.timestamps.len() as u32)
    }

    /// Run `op` only if admitted.
    pub fn gate<T, F>(&mut self, op: F) -> Result<T, RateLimitError>
    where
        F: FnOnce() -> T,
    {
        if self.can_make_request() {
            Ok(op())
        } else {
            Err(self.exceeded())
        }
    }

    fn exceeded(&self) -> RateLimitError {
        RateLimitError::Exceeded {
            limiter: self.name.clone(),
            max_requests: self.max_requests,
            window: self.window,
        }
    }
}

impl Default for RateLimiter {
    /// 30 requests per minute.
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW)
    }
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("name", &self.name)
            .field("max_requests", &self.max_requests)
            .field("window", &self.window)
            .field("in_window", &self.timestamps.len())
            .finish_non_exhaustive()
    }
}

impl Admission for RateLimiter {
    fn try_admit(&mut self) -> bool {
        self.can_make_request()
    }

    fn remaining(&mut self) -> u32 {
        self.remaining_requests()
    }
}

/// A limiter shared across threads. Each decision runs under one lock.
#[derive(Debug, Clone)]
pub struct SharedRateLimiter {
    inner: Arc<Mutex<RateLimiter>>,
}

impl SharedRateLimiter {
    pub fn new(limiter: RateLimiter) -> Self {
        Self {
            inner: Arc::new(Mutex::new(limiter)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RateLimiter> {
        // Eviction and push leave the log consistent even if a holder panicked.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn can_make_request(&self) -> bool {
        self.lock().can_make_request()
    }

    pub fn remaining_requests(&self) -> u32 {
        self.lock().remaining_requests()
    }

    /// Run `op` only if admitted. The lock is released before `op` runs.
    pub fn gate<T, F>(&self, op: F) -> Result<T, RateLimitError>
    where
        F: FnOnce() -> T,
    {
        let admitted = {
            let mut limiter = self.lock();
            if limiter.can_make_request() {
                Ok(())
            } else {
                Err(limiter.exceeded())
            }
        };
        admitted.map(|()| op())
    }
}

impl Admission for SharedRateLimiter {
    fn try_admit(&mut self) -> bool {
        self.can_make_request()
    }

    fn remaining(&mut self) -> u32 {
        self.remaining_requests()
    }
}

impl From<RateLimiter> for SharedRateLimiter {
    fn from(limiter: RateLimiter) -> Self {
        Self::new(limiter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max: u32, window_ms: u64) -> (RateLimiter, ManualClock) {
        let clock = ManualClock::new();
        let limiter =
            RateLimiter::with_clock(max, Duration::from_millis(window_ms), Arc::new(clock.clone()));
        (limiter, clock)
    }

    #[test]
    fn test_sliding_window_admission() {
        let (mut limiter, clock) = limiter(2, 1000);

        assert!(limiter.can_make_request());
        assert!(limiter.can_make_request());
        assert!(!limiter.can_make_request());

        clock.advance(Duration::from_millis(999));
        assert!(!limiter.can_make_request());

        clock.advance(Duration::from_millis(1));
        assert!(limiter.can_make_request());
    }

    #[test]
    fn test_window_slides_per_timestamp() {
        let (mut limiter, clock) = limiter(2, 1000);

        assert!(limiter.can_make_request());
        clock.advance(Duration::from_millis(600));
        assert!(limiter.can_make_request());
        clock.advance(Duration::from_millis(500));

        // Only the first admission has expired
        assert_eq!(limiter.remaining_requests(), 1);
        assert!(limiter.can_make_request());
        assert!(!limiter.can_make_request());
    }

    #[test]
    fn test_denied_attempts_are_not_recorded() {
        let (mut limiter, clock) = limiter(1, 1000);

        assert!(limiter.can_make_request());
        for _ in 0..10 {
            clock.advance(Duration::from_millis(50));
            assert!(!limiter.can_make_request());
        }
        // The denials above did not push the window forward
        clock.advance(Duration::from_millis(500));
        assert!(limiter.can_make_request());
    }

    #[test]
    fn test_remaining_requests() {
        let (mut limiter, _clock) = limiter(3, 1000);

        assert_eq!(limiter.remaining_requests(), 3);
        assert_eq!(limiter.remaining_requests(), 3);
        for expected in [2, 1, 0] {
            assert!(limiter.can_make_request());
            assert_eq!(limiter.remaining_requests(), expected);
        }
        assert!(!limiter.can_make_request());
        assert_eq!(limiter.remaining_requests(), 0);
    }

    #[test]
    fn test_zero_limits_are_clamped() {
        let limiter = RateLimiter::new(0, Duration::ZERO);
        assert_eq!(limiter.max_requests(), 1);
        assert_eq!(limiter.window(), Duration::from_millis(1));
    }

    #[test]
    fn test_default_is_thirty_per_minute() {
        let mut limiter = RateLimiter::default();
        assert_eq!(limiter.max_requests(), 30);
        assert_eq!(limiter.window(), Duration::from_secs(60));
        assert_eq!(limiter.remaining_requests(), 30);
    }

    #[test]
    fn test_gate_runs_only_when_admitted() {
        let (limiter, _clock) = limiter(1, 1000);
        let mut limiter = limiter.named("ai");

        assert_eq!(limiter.gate(|| 7), Ok(7));

        let mut ran = false;
        let err = limiter.gate(|| ran = true).unwrap_err();
        assert!(!ran);
        assert_eq!(
            err,
            RateLimitError::Exceeded {
                limiter: "ai".to_string(),
                max_requests: 1,
                window: Duration::from_millis(1000),
            }
        );
        assert_eq!(err.to_string(), "rate limit exceeded for ai: 1 requests per 1000ms");
    }

    #[test]
    fn test_admission_trait_object() {
        fn call_twice(gate: &mut dyn Admission) -> (bool, bool) {
            (gate.try_admit(), gate.try_admit())
        }

        let (mut limiter, _clock) = limiter(1, 1000);
        assert_eq!(call_twice(&mut limiter), (true, false));
        assert_eq!(limiter.remaining(), 0);
    }
}
