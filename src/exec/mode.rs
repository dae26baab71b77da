//! The five execution modes and the reason a [`super::ExecutionLoop::wait`]
//! call returned.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Trades CPU utilisation for wake latency. See SPEC_FULL.md's table in
/// §4.6 for the exact latency/CPU/suspension-primitive profile of each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Resolved to a concrete mode by [`super::Config::apply_defaults`];
    /// never observed by [`super::ExecutionLoop::wait`].
    Auto,
    /// Spinloop; sub-microsecond wake latency at 100% of one core.
    BusyWait,
    /// Periodic timer only, no notifier wait.
    HighRate,
    /// Busy-spin for `spin_duration`, then behave like `event_driven`.
    Hybrid,
    /// Block on the watched notifiers with a bounded timer timeout.
    EventDriven,
    /// `event_driven` plus OS real-time scheduling hints.
    RtEvent,
}

impl Mode {
    /// True for the two modes that busy-spin at any point in their wait path.
    #[must_use]
    pub const fn spins(self) -> bool {
        matches!(self, Self::BusyWait | Self::Hybrid)
    }
}

/// Resolves `Mode::Auto` per §4.6's `apply_defaults` step 1. `auto` never
/// selects `busy_wait` — that mode must be requested explicitly.
#[must_use]
pub fn select_auto_mode(interval: Duration) -> Mode {
    if interval.is_zero() {
        Mode::EventDriven
    } else if interval <= Duration::from_millis(1) {
        Mode::Hybrid
    } else if interval < Duration::from_millis(5) {
        Mode::Hybrid
    } else {
        Mode::EventDriven
    }
}

/// Why [`super::ExecutionLoop::wait`] returned control to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WakeReason {
    /// The periodic timer elapsed with no notifier signalled.
    Timer,
    /// A watched (or the primary) notifier was signalled.
    Input,
    /// The loop's [`super::Breaker`] requested a stop.
    Shutdown,
}
