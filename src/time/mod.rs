//! `TimeSource`: the deterministic-clock abstraction used by the `now()` host
//! binding and the execution loop's periodic timer.
//!
//! Mirrors the ambient crate's own `time/driver.rs` abstraction: production
//! code takes [`WallClock`], lab tests take [`VirtualClock`] so assertions on
//! exact nanosecond values don't depend on wall-clock jitter.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Nanoseconds since the Unix epoch.
pub type Time = i64;

/// A source of the current time, abstracted so tests can control it exactly.
pub trait TimeSource: Send + Sync {
    /// The current time, in nanoseconds since the Unix epoch.
    fn now(&self) -> Time;
}

/// The production clock: `SystemTime::now()` converted to epoch nanoseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl TimeSource for WallClock {
    fn now(&self) -> Time {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as i64)
            .unwrap_or(0)
    }
}

/// A clock tests can set and advance exactly, with no wall-clock coupling.
#[derive(Debug, Default)]
pub struct VirtualClock {
    now: AtomicI64,
}

impl VirtualClock {
    /// A virtual clock starting at `start` nanoseconds.
    #[must_use]
    pub fn new(start: Time) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    /// Advances the clock by `delta_ns` nanoseconds, returning the new time.
    pub fn advance(&self, delta_ns: i64) -> Time {
        self.now.fetch_add(delta_ns, Ordering::SeqCst) + delta_ns
    }

    /// Sets the clock to an exact time.
    pub fn set(&self, time: Time) {
        self.now.store(time, Ordering::SeqCst);
    }
}

impl TimeSource for VirtualClock {
    fn now(&self) -> Time {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virtual_clock_starts_at_given_time() {
        let c = VirtualClock::new(1_000);
        assert_eq!(c.now(), 1_000);
    }

    #[test]
    fn virtual_clock_advance_is_exact() {
        let c = VirtualClock::new(0);
        assert_eq!(c.advance(500), 500);
        assert_eq!(c.now(), 500);
    }

    #[test]
    fn wall_clock_is_nonzero_and_monotone_enough() {
        let c = WallClock;
        let a = c.now();
        let b = c.now();
        assert!(a > 0);
        assert!(b >= a);
    }
}
