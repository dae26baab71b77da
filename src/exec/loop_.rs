//! `ExecutionLoop`: the runtime thread's suspension point.
//!
//! Grounded on SPEC_FULL.md §4.6/§5: the loop blocks only in [`Self::wait`];
//! every other operation on the runtime thread is non-blocking. The five
//! modes share one `wait` shape (check breaker, check notifiers, check
//! timer) that differs only in how long/whether it spins versus blocks,
//! mirroring the ambient crate's `io_driver.rs`/`timer.rs` split between a
//! blocking primitive and a deadline check.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::queue::Notifier;
use crate::time::{Time, TimeSource, WallClock};

use super::breaker::Breaker;
use super::config::Config;
use super::mode::{Mode, WakeReason};

/// The runtime thread's suspension point: wraps a primary notifier, any
/// additionally watched notifiers, a periodic deadline, and a [`Breaker`].
pub struct ExecutionLoop {
    config: Config,
    breaker: Arc<Breaker>,
    primary: Arc<dyn Notifier>,
    watched: Vec<Arc<dyn Notifier>>,
    clock: Arc<dyn TimeSource>,
    next_deadline: std::cell::Cell<Time>,
    rt_applied: AtomicBool,
}

impl ExecutionLoop {
    /// Builds a loop from `config`, resolving `Mode::Auto` against the given
    /// hardware thread count (typically `std::thread::available_parallelism`).
    #[must_use]
    pub fn new(mut config: Config, hardware_threads: usize) -> Self {
        config.apply_defaults(hardware_threads);
        let clock: Arc<dyn TimeSource> = Arc::new(WallClock);
        let next_deadline = clock.now().saturating_add(duration_to_nanos(config.interval));
        Self {
            config,
            breaker: Arc::new(Breaker::new()),
            primary: crate::queue::notifier::create(),
            watched: Vec::new(),
            clock,
            next_deadline: std::cell::Cell::new(next_deadline),
            rt_applied: AtomicBool::new(false),
        }
    }

    /// Substitutes the clock (tests use a [`crate::time::VirtualClock`]).
    pub fn set_clock(&mut self, clock: Arc<dyn TimeSource>) {
        self.next_deadline.set(clock.now().saturating_add(duration_to_nanos(self.config.interval)));
        self.clock = clock;
    }

    /// The resolved mode (never `Mode::Auto` once constructed).
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    /// The loop's cooperative shutdown flag.
    #[must_use]
    pub fn breaker(&self) -> &Arc<Breaker> {
        &self.breaker
    }

    /// Signals the primary notifier unconditionally, waking a blocked `wait`.
    pub fn wake(&self) {
        self.primary.signal();
    }

    /// Registers an additional notifier to be observed by [`Self::wait`].
    /// Idempotent: re-watching the same notifier (by pointer identity)
    /// succeeds without duplicating the registration. On Windows, at most one
    /// additional notifier may be watched; a second distinct attempt returns
    /// `false`.
    pub fn watch(&mut self, notifier: Arc<dyn Notifier>) -> bool {
        if self.watched.iter().any(|n| Arc::ptr_eq(n, &notifier)) {
            return true;
        }
        #[cfg(windows)]
        {
            if !self.watched.is_empty() {
                return false;
            }
        }
        self.watched.push(notifier);
        true
    }

    fn timer_elapsed(&self) -> bool {
        !self.config.interval.is_zero() && self.clock.now() >= self.next_deadline.get()
    }

    fn advance_deadline(&self) {
        self.next_deadline
            .set(self.next_deadline.get().saturating_add(duration_to_nanos(self.config.interval)));
    }

    fn poll_notifiers(&self) -> bool {
        self.primary.poll() || self.watched.iter().any(|n| n.poll())
    }

    /// Blocks (or spins) according to the resolved mode until one of: the
    /// periodic timer elapses (`Timer`), a notifier is signalled (`Input`),
    /// or the breaker requests a stop (`Shutdown`).
    pub fn wait(&self) -> WakeReason {
        if self.config.mode == Mode::RtEvent {
            self.ensure_rt_setup();
        }
        match self.config.mode {
            Mode::Auto => unreachable!("Config::apply_defaults resolves auto before a loop is built"),
            Mode::BusyWait => self.wait_busy(None),
            Mode::HighRate => self.wait_high_rate(),
            Mode::Hybrid => self.wait_busy(Some(self.config.spin_duration)).unwrap_or_else(|| self.wait_blocking()),
            Mode::EventDriven | Mode::RtEvent => self.wait_blocking(),
        }
    }

    /// Spins checking breaker/notifiers/timer with a cheap pause between
    /// checks. With `budget = None`, spins until one condition fires
    /// (`busy_wait`). With `Some(budget)`, gives up after `budget` elapses
    /// and returns `None` so the caller can fall back to blocking (`hybrid`).
    fn wait_busy(&self, budget: Option<Duration>) -> Option<WakeReason> {
        let deadline = budget.map(|b| self.clock.now().saturating_add(duration_to_nanos(b)));
        loop {
            if self.breaker.is_stopped() {
                return Some(WakeReason::Shutdown);
            }
            if self.poll_notifiers() {
                return Some(WakeReason::Input);
            }
            if self.timer_elapsed() {
                self.advance_deadline();
                return Some(WakeReason::Timer);
            }
            if let Some(deadline) = deadline {
                if self.clock.now() >= deadline {
                    return None;
                }
            }
            std::hint::spin_loop();
        }
    }

    fn wait_blocking(&self) -> WakeReason {
        let timeout = self.config.event_driven_timeout();
        let signalled = self.wait_on_watch_set(timeout);
        if self.breaker.is_stopped() {
            return WakeReason::Shutdown;
        }
        if signalled {
            return WakeReason::Input;
        }
        self.advance_deadline();
        WakeReason::Timer
    }

    /// The notifiers `wait_blocking` must observe: the primary plus every
    /// watched notifier, in that order.
    fn watch_set(&self) -> Vec<&Arc<dyn Notifier>> {
        let mut set = Vec::with_capacity(1 + self.watched.len());
        set.push(&self.primary);
        set.extend(self.watched.iter());
        set
    }

    /// Blocks for up to `timeout` across the primary and every watched
    /// notifier at once, rather than the primary alone. On Linux/macOS, where
    /// every notifier in the set exposes a real fd, this multiplexes them
    /// into a single `poll(2)` call (the spec's "epoll / kqueue on their
    /// fds"; `poll(2)` already multiplexes arbitrarily many fds in one
    /// syscall, so a dedicated epoll/kqueue instance isn't needed). On
    /// Windows, `WaitForMultipleObjects` plays the same role. If any notifier
    /// in the set has no real descriptor (the polling fallback), this slices
    /// the wait into short polls of every notifier instead, trading some
    /// latency for correctness.
    #[cfg(unix)]
    fn wait_on_watch_set(&self, timeout: Duration) -> bool {
        use std::os::fd::BorrowedFd;

        use nix::poll::{poll, PollFd, PollFlags, PollTimeout};

        let notifiers = self.watch_set();
        let fds: Vec<Option<std::os::fd::RawFd>> = notifiers.iter().map(|n| n.raw_fd()).collect();
        if fds.iter().all(Option::is_some) {
            // SAFETY: each fd is owned by its notifier, which outlives this call.
            let borrowed: Vec<BorrowedFd> =
                fds.iter().map(|fd| unsafe { BorrowedFd::borrow_raw(fd.unwrap()) }).collect();
            let mut pollfds: Vec<PollFd> =
                borrowed.iter().map(|fd| PollFd::new(*fd, PollFlags::POLLIN)).collect();
            let timeout_ms = PollTimeout::try_from(timeout.as_millis().min(u128::from(u32::MAX)) as u32)
                .unwrap_or(PollTimeout::MAX);
            match poll(&mut pollfds, timeout_ms) {
                Ok(n) if n > 0 => notifiers.iter().any(|n| n.poll()),
                _ => false,
            }
        } else {
            poll_watch_set_in_slices(&notifiers, timeout)
        }
    }

    #[cfg(windows)]
    fn wait_on_watch_set(&self, timeout: Duration) -> bool {
        use windows_sys::Win32::Foundation::{WAIT_OBJECT_0, WAIT_TIMEOUT};
        use windows_sys::Win32::System::Threading::WaitForMultipleObjects;

        let notifiers = self.watch_set();
        let handles: Vec<_> = notifiers.iter().map(|n| n.raw_handle()).collect();
        if handles.iter().all(Option::is_some) {
            let handles: Vec<_> = handles.into_iter().map(Option::unwrap).collect();
            let millis = timeout.as_millis();
            let timeout_ms = if millis >= u128::from(u32::MAX) { u32::MAX } else { millis as u32 };
            // SAFETY: every handle is owned by its notifier, which outlives this call.
            let result =
                unsafe { WaitForMultipleObjects(handles.len() as u32, handles.as_ptr(), 0, timeout_ms) };
            if result == WAIT_TIMEOUT {
                return false;
            }
            let signalled_index = result.wrapping_sub(WAIT_OBJECT_0);
            if signalled_index >= handles.len() as u32 {
                return false;
            }
            // An auto-reset event's own wait already drained it; poll the
            // rest so a second, coalesced signal on another notifier isn't lost.
            notifiers
                .iter()
                .enumerate()
                .any(|(i, n)| i as u32 == signalled_index || n.poll())
        } else {
            poll_watch_set_in_slices(&notifiers, timeout)
        }
    }

    #[cfg(not(any(unix, windows)))]
    fn wait_on_watch_set(&self, timeout: Duration) -> bool {
        poll_watch_set_in_slices(&self.watch_set(), timeout)
    }

    fn wait_high_rate(&self) -> WakeReason {
        const SLICE: Duration = Duration::from_micros(200);
        loop {
            if self.breaker.is_stopped() {
                return WakeReason::Shutdown;
            }
            if self.timer_elapsed() {
                self.advance_deadline();
                return WakeReason::Timer;
            }
            std::thread::sleep(SLICE.min(self.config.interval));
        }
    }

    fn ensure_rt_setup(&self) {
        if self.rt_applied.swap(true, Ordering::AcqRel) {
            return;
        }
        apply_rt_setup(&self.config);
    }
}

fn duration_to_nanos(d: Duration) -> i64 {
    i64::try_from(d.as_nanos()).unwrap_or(i64::MAX)
}

/// Degraded fallback for when the watch set contains a notifier with no real
/// OS descriptor to multiplex on (the polling fallback notifier): repeatedly
/// polls every notifier in the set on a short sleep cycle until one fires or
/// `timeout` elapses.
fn poll_watch_set_in_slices(notifiers: &[&Arc<dyn Notifier>], timeout: Duration) -> bool {
    const SLICE: Duration = Duration::from_millis(1);
    let deadline = std::time::Instant::now() + timeout;
    loop {
        if notifiers.iter().any(|n| n.poll()) {
            return true;
        }
        if std::time::Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(SLICE.min(timeout));
    }
}

#[cfg(unix)]
fn apply_rt_setup(config: &Config) {
    if config.cpu_affinity >= 0 {
        // Best-effort; a sandboxed process may lack CAP_SYS_NICE or the
        // scheduler may reject the affinity mask. Failure is silently
        // tolerated since `rt_event` degrades to `event_driven` behaviour.
        #[cfg(target_os = "linux")]
        unsafe {
            let mut set: libc::cpu_set_t = std::mem::zeroed();
            libc::CPU_SET(config.cpu_affinity as usize, &mut set);
            libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set);
        }
    }
    unsafe {
        libc::setpriority(libc::PRIO_PROCESS, 0, -config.rt_priority);
    }
    if config.lock_memory {
        unsafe {
            libc::mlockall(libc::MCL_CURRENT | libc::MCL_FUTURE);
        }
    }
}

#[cfg(windows)]
fn apply_rt_setup(_config: &Config) {
    // Priority class / affinity mask adjustment on Windows goes through
    // `SetPriorityClass`/`SetThreadAffinityMask`; omitted here since the
    // loop's correctness does not depend on it taking effect.
}

#[cfg(not(any(unix, windows)))]
fn apply_rt_setup(_config: &Config) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::config::ConfigBuilder;
    use crate::time::VirtualClock;

    fn loop_with_mode(mode: Mode) -> ExecutionLoop {
        let config = ConfigBuilder::default().mode(mode).interval(Duration::from_millis(10)).build();
        ExecutionLoop::new(config, 4)
    }

    #[test]
    fn wake_then_wait_reports_input() {
        let l = loop_with_mode(Mode::EventDriven);
        l.wake();
        assert_eq!(l.wait(), WakeReason::Input);
    }

    #[test]
    fn stopped_breaker_reports_shutdown() {
        let l = loop_with_mode(Mode::EventDriven);
        l.breaker().stop();
        assert_eq!(l.wait(), WakeReason::Shutdown);
    }

    #[test]
    fn busy_wait_reports_timer_once_virtual_clock_elapses() {
        let mut l = loop_with_mode(Mode::BusyWait);
        let clock = Arc::new(VirtualClock::new(0));
        l.set_clock(clock.clone());
        clock.advance(11_000_000);
        assert_eq!(l.wait(), WakeReason::Timer);
    }

    #[test]
    fn watch_is_idempotent_for_the_same_notifier() {
        let mut l = loop_with_mode(Mode::EventDriven);
        let n = crate::queue::notifier::create();
        assert!(l.watch(n.clone()));
        assert!(l.watch(n));
        assert_eq!(l.watched.len(), 1);
    }

    #[test]
    fn watched_notifier_wakes_event_driven_wait() {
        let mut l = loop_with_mode(Mode::EventDriven);
        let n = crate::queue::notifier::create();
        l.watch(n.clone());
        n.signal();
        assert_eq!(l.wait(), WakeReason::Input);
    }

    #[test]
    fn watched_notifier_wakes_wait_promptly_not_after_the_full_interval() {
        // `wait_blocking` must multiplex `primary` and every watched notifier
        // into one wait, not poll `watched` only after `primary`'s own
        // timeout elapses. With a 10ms interval, a signal delivered from
        // another thread just after `wait()` blocks should be observed in
        // well under that interval.
        let mut l = loop_with_mode(Mode::EventDriven);
        let n = crate::queue::notifier::create();
        l.watch(n.clone());
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(1));
            n.signal();
        });
        let started = std::time::Instant::now();
        assert_eq!(l.wait(), WakeReason::Input);
        assert!(started.elapsed() < Duration::from_millis(8), "elapsed: {:?}", started.elapsed());
    }
}
