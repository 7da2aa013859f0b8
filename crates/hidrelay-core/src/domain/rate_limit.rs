//! Mouse-movement rate limiting.
//!
//! Pointer devices report at several hundred hertz, far faster than the
//! endpoint can replay.  [`MoveRateLimiter`] lets at most one movement through
//! per `interval` and accumulates the deltas of the samples it holds back, so
//! the net displacement seen by the endpoint always matches the physical one.
//!
//! Time is passed in by the caller, which keeps the limiter deterministic in
//! tests.

use std::time::{Duration, Instant};

/// Default movement cadence, roughly 60 Hz.
pub const DEFAULT_MOVE_INTERVAL: Duration = Duration::from_millis(16);

/// Accumulate-and-flush limiter for relative pointer motion.
#[derive(Debug, Clone)]
pub struct MoveRateLimiter {
    interval: Duration,
    last_forward: Option<Instant>,
    pending_dx: i32,
    pending_dy: i32,
}

impl MoveRateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last_forward: None, pending_dx: 0, pending_dy: 0 }
    }

    /// `true` when held-back motion is waiting to be flushed.
    pub fn has_pending(&self) -> bool {
        self.pending_dx != 0 || self.pending_dy != 0
    }

    /// Offers one movement sample.
    ///
    /// Returns the delta to forward now (accumulated motion plus this sample)
    /// or `None` if the sample was held back.
    pub fn offer(&mut self, dx: i32, dy: i32, now: Instant) -> Option<(i32, i32)> {
        self.pending_dx = self.pending_dx.saturating_add(dx);
        self.pending_dy = self.pending_dy.saturating_add(dy);

        if self.is_due(now) {
            Some(self.take(now))
        } else {
            None
        }
    }

    /// Releases held-back motion once the interval has elapsed.
    ///
    /// Called when no new samples arrive, so a trailing burst is not left
    /// stranded until the next physical movement.
    pub fn flush(&mut self, now: Instant) -> Option<(i32, i32)> {
        if self.has_pending() && self.is_due(now) {
            Some(self.take(now))
        } else {
            None
        }
    }

    /// Discards held-back motion and forgets the last forward time.
    pub fn reset(&mut self) {
        self.last_forward = None;
        self.pending_dx = 0;
        self.pending_dy = 0;
    }

    fn is_due(&self, now: Instant) -> bool {
        match self.last_forward {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        }
    }

    fn take(&mut self, now: Instant) -> (i32, i32) {
        self.last_forward = Some(now);
        let delta = (self.pending_dx, self.pending_dy);
        self.pending_dx = 0;
        self.pending_dy = 0;
        delta
    }
}

impl Default for MoveRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MOVE_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_first_sample_passes_immediately() {
        let mut limiter = MoveRateLimiter::default();
        assert_eq!(limiter.offer(3, -2, Instant::now()), Some((3, -2)));
    }

    #[test]
    fn test_samples_within_interval_accumulate_and_flush_together() {
        // Arrange
        let mut limiter = MoveRateLimiter::default();
        let t0 = Instant::now();
        limiter.offer(0, 0, t0);

        // Act
        let a = limiter.offer(1, 0, t0 + ms(2));
        let b = limiter.offer(2, 0, t0 + ms(5));
        let c = limiter.offer(1, 0, t0 + ms(20));

        // Assert
        assert_eq!(a, None);
        assert_eq!(b, None);
        assert_eq!(c, Some((4, 0)));
        assert!(!limiter.has_pending());
    }

    #[test]
    fn test_interval_is_measured_from_last_forward() {
        let mut limiter = MoveRateLimiter::new(ms(10));
        let t0 = Instant::now();

        assert!(limiter.offer(1, 1, t0).is_some());
        assert!(limiter.offer(1, 1, t0 + ms(9)).is_none());
        assert_eq!(limiter.offer(1, 1, t0 + ms(10)), Some((2, 2)));
        assert!(limiter.offer(1, 1, t0 + ms(15)).is_none());
    }

    #[test]
    fn test_flush_releases_pending_after_interval() {
        let mut limiter = MoveRateLimiter::default();
        let t0 = Instant::now();
        limiter.offer(1, 0, t0);
        limiter.offer(5, 7, t0 + ms(1));

        assert_eq!(limiter.flush(t0 + ms(8)), None);
        assert_eq!(limiter.flush(t0 + ms(16)), Some((5, 7)));
        assert_eq!(limiter.flush(t0 + ms(40)), None);
    }

    #[test]
    fn test_reset_discards_pending_motion() {
        let mut limiter = MoveRateLimiter::default();
        let t0 = Instant::now();
        limiter.offer(1, 0, t0);
        limiter.offer(9, 9, t0 + ms(1));

        limiter.reset();

        assert!(!limiter.has_pending());
        assert_eq!(limiter.offer(1, 0, t0 + ms(2)), Some((1, 0)));
    }
}
