//! Fallback notifier: an atomic flag polled on a short sleep cycle.
//!
//! Used on platforms without a cheap OS wake primitive, and as the
//! degraded-but-correct fallback if `eventfd`/self-pipe/`CreateEventW`
//! creation fails at runtime.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use super::Notifier;

/// The sleep granularity while polling for a signal.
const POLL_INTERVAL: Duration = Duration::from_micros(100);

/// An atomic-bool notifier: `wait` sleeps in [`POLL_INTERVAL`] slices until
/// the flag is set or the deadline passes.
pub struct PollingNotifier {
    signalled: AtomicBool,
}

impl PollingNotifier {
    /// A fresh, unsignalled notifier.
    #[must_use]
    pub fn new() -> Self {
        Self {
            signalled: AtomicBool::new(false),
        }
    }
}

impl Default for PollingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for PollingNotifier {
    fn signal(&self) {
        self.signalled.store(true, Ordering::Release);
    }

    fn wait(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.poll() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(POLL_INTERVAL.min(timeout));
        }
    }

    fn poll(&self) -> bool {
        self.signalled.swap(false, Ordering::AcqRel)
    }
}
