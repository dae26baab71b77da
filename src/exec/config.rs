//! `Config`: construction-time tuning for the [`super::ExecutionLoop`], built
//! with a `ConfigBuilder` and resolved with [`Config::apply_defaults`].

use std::time::Duration;

use super::mode::{select_auto_mode, Mode};

/// Special `cpu_affinity` value meaning "do not pin this thread".
pub const CPU_AFFINITY_NONE: i32 = -1;
/// Special `cpu_affinity` value meaning "pick a core automatically".
pub const CPU_AFFINITY_AUTO: i32 = -2;

/// A platform-appropriate high-rate polling interval, used when a mode that
/// needs an interval is configured with `interval == 0`.
const DEFAULT_HIGH_RATE_INTERVAL: Duration = Duration::from_millis(1);

/// The upper bound on an `event_driven`/`rt_event` wait, ensuring shutdown
/// latency stays bounded even with no configured timer.
pub const EVENT_DRIVEN_MAX_WAIT: Duration = Duration::from_millis(100);

/// Construction-time tuning for the execution loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Config {
    /// The requested mode; `Mode::Auto` is resolved by [`Self::apply_defaults`].
    pub mode: Mode,
    /// The nominal tick interval. Zero means "no periodic timer" for modes
    /// that don't need one.
    pub interval: Duration,
    /// How long `hybrid`/`busy_wait` spin before falling back to blocking.
    pub spin_duration: Duration,
    /// Requested OS real-time priority for `rt_event`. Platform-scaled;
    /// applied best-effort (a failure to raise priority is not fatal).
    pub rt_priority: i32,
    /// `-1` (no affinity), `-2` (auto-pick one core), or an explicit core index.
    pub cpu_affinity: i32,
    /// Whether `rt_event` should attempt to lock the process's memory pages.
    pub lock_memory: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Auto,
            interval: Duration::ZERO,
            spin_duration: Duration::from_micros(50),
            rt_priority: 80,
            cpu_affinity: CPU_AFFINITY_NONE,
            lock_memory: false,
        }
    }
}

impl Config {
    /// Starts a builder from the default configuration.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Resolves `Mode::Auto`, fills in a missing interval for modes that need
    /// one, and auto-picks a CPU core for `rt_event` when requested. Mutates
    /// in place and is idempotent: calling it twice on an already-resolved
    /// config is a no-op.
    pub fn apply_defaults(&mut self, hardware_threads: usize) {
        if self.mode == Mode::Auto {
            self.mode = select_auto_mode(self.interval);
        }
        let needs_interval = matches!(self.mode, Mode::HighRate | Mode::Hybrid | Mode::EventDriven | Mode::RtEvent);
        if needs_interval && self.interval.is_zero() {
            self.interval = DEFAULT_HIGH_RATE_INTERVAL;
        }
        if self.mode == Mode::RtEvent && self.cpu_affinity == CPU_AFFINITY_AUTO && hardware_threads > 1 {
            self.cpu_affinity = 1;
        }
    }

    /// The timeout `event_driven`/`rt_event` pass to the notifier wait: the
    /// configured interval, capped at [`EVENT_DRIVEN_MAX_WAIT`] (or exactly
    /// that cap if no interval is configured).
    #[must_use]
    pub fn event_driven_timeout(&self) -> Duration {
        if self.interval.is_zero() {
            EVENT_DRIVEN_MAX_WAIT
        } else {
            self.interval.min(EVENT_DRIVEN_MAX_WAIT)
        }
    }
}

/// Builds a [`Config`] field by field; `build()` does not resolve `auto` —
/// call [`Config::apply_defaults`] (done automatically by
/// [`super::ExecutionLoop::new`]) for that.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Sets the requested mode.
    #[must_use]
    pub fn mode(mut self, mode: Mode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Sets the nominal tick interval.
    #[must_use]
    pub fn interval(mut self, interval: Duration) -> Self {
        self.config.interval = interval;
        self
    }

    /// Sets the `hybrid`/`busy_wait` spin budget.
    #[must_use]
    pub fn spin_duration(mut self, spin_duration: Duration) -> Self {
        self.config.spin_duration = spin_duration;
        self
    }

    /// Sets the requested `rt_event` OS priority.
    #[must_use]
    pub fn rt_priority(mut self, rt_priority: i32) -> Self {
        self.config.rt_priority = rt_priority;
        self
    }

    /// Sets the CPU affinity request.
    #[must_use]
    pub fn cpu_affinity(mut self, cpu_affinity: i32) -> Self {
        self.config.cpu_affinity = cpu_affinity;
        self
    }

    /// Sets whether `rt_event` should attempt `mlockall`.
    #[must_use]
    pub fn lock_memory(mut self, lock_memory: bool) -> Self {
        self.config.lock_memory = lock_memory;
        self
    }

    /// Finalises the builder into a [`Config`], `auto` left unresolved.
    #[must_use]
    pub fn build(self) -> Config {
        self.config
    }
}
