//! `Breaker`: a cooperative cross-thread shutdown flag.
//!
//! Grounded on the §5 cancellation model: `stop()` is callable from any
//! thread; the execution loop observes it during `wait` and exits the next
//! iteration rather than being preemptively cancelled mid-tick.

use std::sync::atomic::{AtomicBool, Ordering};

/// A shutdown flag shared between the runtime thread and whatever external
/// code owns the decision to stop it.
#[derive(Debug, Default)]
pub struct Breaker {
    stopped: AtomicBool,
}

impl Breaker {
    /// A fresh, un-stopped breaker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a stop. Safe from any thread; idempotent.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    /// True once [`Self::stop`] has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Clears the flag, for tests that reuse one loop across scenarios.
    pub fn reset(&self) {
        self.stopped.store(false, Ordering::Release);
    }
}
