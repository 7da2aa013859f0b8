//! Exponential reconnect backoff.
//!
//! After the Nth consecutive failed connect, the delay before the next
//! attempt is `min(base * multiplier^(N-1), max)`.  A successful connect
//! calls [`Backoff::reset`] and the sequence starts over at `base`.

use std::time::Duration;

pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);
pub const DEFAULT_MULTIPLIER: f64 = 1.5;

#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    multiplier: f64,
    current: Duration,
}

impl Backoff {
    /// Creates a backoff.  A multiplier below 1 is treated as 1, and a base
    /// above `max` is clamped to `max`.
    pub fn new(base: Duration, max: Duration, multiplier: f64) -> Self {
        let base = base.min(max);
        let multiplier = if multiplier.is_finite() && multiplier >= 1.0 { multiplier } else { 1.0 };
        Self { base, max, multiplier, current: base }
    }

    /// The delay the next call to [`next_delay`](Self::next_delay) returns.
    pub fn current(&self) -> Duration {
        self.current
    }

    /// Returns the delay to wait after a failure and grows it for next time.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        let grown = self.current.as_secs_f64() * self.multiplier;
        self.current = if grown >= self.max.as_secs_f64() {
            self.max
        } else {
            Duration::from_secs_f64(grown)
        };
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.base;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_DELAY, DEFAULT_MAX_DELAY, DEFAULT_MULTIPLIER)
    }
}
