//! Platform wake primitives behind a single [`Notifier`] contract.
//!
//! Grounded on `examples/original_source/x/cpp/notify/notify.h`: `signal` is
//! callable from any thread, `wait`/`poll` are consumer-only, signals coalesce
//! (N signals before or during a wait produce at most one wake), and `poll` is
//! level-triggered until the notifier is drained.

use std::sync::Arc;
use std::time::Duration;

#[cfg(target_os = "linux")]
mod eventfd;
#[cfg(target_os = "macos")]
mod pipe;
#[cfg(windows)]
mod event;
mod polling;

/// A coalescing wake primitive: many signals between waits collapse to one
/// wake, matching the semantics of `eventfd`/kqueue/`SetEvent`.
pub trait Notifier: Send + Sync {
    /// Wakes a blocked (or future) `wait`/`poll`. Safe from any thread.
    fn signal(&self);

    /// Blocks until signalled or `timeout` elapses. Returns `true` if
    /// signalled, `false` on timeout. Consumer-thread only.
    fn wait(&self, timeout: Duration) -> bool;

    /// Non-blocking check: true and clears the pending signal if one is
    /// outstanding, false otherwise. Consumer-thread only.
    fn poll(&self) -> bool;

    /// The OS descriptor backing this notifier's signal, for multiplexing
    /// several notifiers into one blocking wait (`poll(2)` on Linux/macOS).
    /// `None` for notifiers with no real descriptor (the polling fallback) —
    /// callers fall back to polling those directly.
    #[cfg(unix)]
    fn raw_fd(&self) -> Option<std::os::fd::RawFd> {
        None
    }

    /// The OS handle backing this notifier's signal, for
    /// `WaitForMultipleObjects`-style multiplexing. `None` for the polling
    /// fallback.
    #[cfg(windows)]
    fn raw_handle(&self) -> Option<windows_sys::Win32::Foundation::HANDLE> {
        None
    }
}

/// Builds the best available notifier for the current platform: `eventfd` on
/// Linux, a self-pipe on macOS, an auto-reset event object on Windows, and an
/// atomic-bool polling fallback everywhere else.
#[must_use]
pub fn create() -> Arc<dyn Notifier> {
    #[cfg(target_os = "linux")]
    {
        // eventfd creation can fail under restrictive sandboxes (fd
        // exhaustion, seccomp); fall back rather than panic in `create`.
        match eventfd::EventFdNotifier::new() {
            Ok(n) => Arc::new(n) as Arc<dyn Notifier>,
            Err(_) => Arc::new(polling::PollingNotifier::new()) as Arc<dyn Notifier>,
        }
    }
    #[cfg(target_os = "macos")]
    {
        match pipe::SelfPipeNotifier::new() {
            Ok(n) => Arc::new(n) as Arc<dyn Notifier>,
            Err(_) => Arc::new(polling::PollingNotifier::new()) as Arc<dyn Notifier>,
        }
    }
    #[cfg(windows)]
    {
        match event::WindowsEventNotifier::new() {
            Ok(n) => Arc::new(n) as Arc<dyn Notifier>,
            Err(_) => Arc::new(polling::PollingNotifier::new()) as Arc<dyn Notifier>,
        }
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", windows)))]
    {
        Arc::new(polling::PollingNotifier::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polling_notifier_coalesces_signals() {
        let n = polling::PollingNotifier::new();
        n.signal();
        n.signal();
        n.signal();
        assert!(n.poll());
        assert!(!n.poll());
    }

    #[test]
    fn wait_returns_true_when_signalled() {
        let n = polling::PollingNotifier::new();
        n.signal();
        assert!(n.wait(Duration::from_millis(50)));
    }

    #[test]
    fn wait_times_out_without_signal() {
        let n = polling::PollingNotifier::new();
        assert!(!n.wait(Duration::from_millis(5)));
    }

    #[test]
    fn platform_default_notifier_round_trips() {
        let n = create();
        n.signal();
        assert!(n.wait(Duration::from_millis(50)));
    }
}
