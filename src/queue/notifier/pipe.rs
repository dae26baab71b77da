//! macOS notifier backed by a self-pipe.
//!
//! A kqueue `EVFILT_USER` trigger is internal to the kqueue instance that
//! registered it and cannot be observed by another kqueue-based event loop;
//! a self-pipe (write end signalled, read end polled) is the portable
//! workaround, matching `examples/original_source/x/cpp/notify/notify.h`'s
//! macOS implementation.

use std::io;
use std::os::fd::{AsFd, AsRawFd, OwnedFd, RawFd};
use std::time::Duration;

use nix::fcntl::{fcntl, FcntlArg, OFlag};
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use nix::unistd::{pipe, read, write};

use super::Notifier;

/// A self-pipe notifier: one byte written per signal, drained on `poll`.
pub struct SelfPipeNotifier {
    read_fd: OwnedFd,
    write_fd: OwnedFd,
}

impl SelfPipeNotifier {
    /// Creates the pipe and puts both ends in nonblocking mode.
    pub fn new() -> io::Result<Self> {
        let (read_fd, write_fd) = pipe().map_err(io::Error::from)?;
        for fd in [&read_fd, &write_fd] {
            let flags = fcntl(fd.as_raw_fd(), FcntlArg::F_GETFL).map_err(io::Error::from)?;
            let flags = OFlag::from_bits_truncate(flags) | OFlag::O_NONBLOCK;
            fcntl(fd.as_raw_fd(), FcntlArg::F_SETFL(flags)).map_err(io::Error::from)?;
        }
        Ok(Self { read_fd, write_fd })
    }
}

impl Notifier for SelfPipeNotifier {
    fn signal(&self) {
        let _ = write(&self.write_fd, &[1u8]);
    }

    fn wait(&self, timeout: Duration) -> bool {
        let mut fds = [PollFd::new(self.read_fd.as_fd(), PollFlags::POLLIN)];
        let timeout_ms = PollTimeout::try_from(timeout.as_millis().min(u128::from(u32::MAX)) as u32)
            .unwrap_or(PollTimeout::MAX);
        match poll(&mut fds, timeout_ms) {
            Ok(n) if n > 0 => self.poll(),
            _ => false,
        }
    }

    fn poll(&self) -> bool {
        let mut buf = [0u8; 64];
        let mut drained = false;
        loop {
            match read(self.read_fd.as_raw_fd(), &mut buf) {
                Ok(n) if n > 0 => drained = true,
                _ => break,
            }
        }
        drained
    }

    fn raw_fd(&self) -> Option<RawFd> {
        Some(self.read_fd.as_raw_fd())
    }
}
