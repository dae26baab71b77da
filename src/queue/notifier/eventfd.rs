//! Linux notifier backed by `eventfd(2)` in nonblocking, close-on-exec mode.
//!
//! Grounded on `examples/original_source/x/cpp/notify/notify.h`'s Linux
//! implementation: one write of `1` per signal (coalesced by the kernel
//! counter semantics), `poll(2)` to wait for readability, a single `read`
//! draining the full accumulated count.

use std::io;
use std::os::fd::{AsFd, AsRawFd, OwnedFd, RawFd};
use std::time::Duration;

use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use nix::sys::eventfd::{EfdFlags, EventFd};
use nix::unistd::{read, write};

use super::Notifier;

/// An `eventfd`-backed notifier.
pub struct EventFdNotifier {
    fd: OwnedFd,
}

impl EventFdNotifier {
    /// Creates a nonblocking, close-on-exec eventfd starting at counter zero.
    pub fn new() -> io::Result<Self> {
        let fd = EventFd::from_flags(EfdFlags::EFD_NONBLOCK | EfdFlags::EFD_CLOEXEC)
            .map_err(io::Error::from)?;
        Ok(Self { fd: fd.into() })
    }

    /// The raw file descriptor, for embedding in an external poll/epoll loop.
    #[must_use]
    pub fn raw_fd(&self) -> RawFd {
        self.fd.as_raw_fd()
    }
}

impl Notifier for EventFdNotifier {
    fn signal(&self) {
        let one: u64 = 1;
        let _ = write(&self.fd, &one.to_ne_bytes());
    }

    fn wait(&self, timeout: Duration) -> bool {
        let mut fds = [PollFd::new(self.fd.as_fd(), PollFlags::POLLIN)];
        let timeout_ms = PollTimeout::try_from(timeout.as_millis().min(u128::from(u32::MAX)) as u32)
            .unwrap_or(PollTimeout::MAX);
        match poll(&mut fds, timeout_ms) {
            Ok(n) if n > 0 => self.poll(),
            _ => false,
        }
    }

    fn poll(&self) -> bool {
        let mut buf = [0u8; 8];
        match read(self.fd.as_raw_fd(), &mut buf) {
            Ok(8) => u64::from_ne_bytes(buf) > 0,
            _ => false,
        }
    }

    fn raw_fd(&self) -> Option<RawFd> {
        Some(self.fd.as_raw_fd())
    }
}
