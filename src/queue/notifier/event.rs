//! Windows notifier backed by an auto-reset event object.
//!
//! Grounded on `examples/original_source/x/cpp/notify/notify.h`'s Windows
//! implementation (`CreateEventW` auto-reset, `SetEvent`/`WaitForSingleObject`),
//! using `windows-sys`'s `Win32_Foundation`/`Win32_System_Threading` features.
#![allow(unsafe_code)]

use std::io;
use std::time::Duration;

use windows_sys::Win32::Foundation::{CloseHandle, HANDLE, WAIT_OBJECT_0};
use windows_sys::Win32::System::Threading::{CreateEventW, SetEvent, WaitForSingleObject, INFINITE};

use super::Notifier;

/// Wraps an auto-reset `HANDLE`; auto-reset means a successful wait already
/// clears the signalled state, so no separate drain step is needed.
pub struct WindowsEventNotifier {
    handle: HANDLE,
}

// The handle is only ever touched through `SetEvent`/`WaitForSingleObject`,
// both safe to call from any thread.
unsafe impl Send for WindowsEventNotifier {}
unsafe impl Sync for WindowsEventNotifier {}

impl WindowsEventNotifier {
    /// Creates an auto-reset, initially-unsignalled event object.
    pub fn new() -> io::Result<Self> {
        // SAFETY: `CreateEventW` with null attributes/name is a well-defined
        // call; `bManualReset = FALSE` selects auto-reset semantics.
        let handle = unsafe { CreateEventW(std::ptr::null(), 0, 0, std::ptr::null()) };
        if handle.is_null() {
            return Err(io::Error::last_os_error());
        }
        Ok(Self { handle })
    }
}

impl Drop for WindowsEventNotifier {
    fn drop(&mut self) {
        // SAFETY: `handle` was created by `CreateEventW` in `new` and is
        // closed exactly once here.
        unsafe {
            CloseHandle(self.handle);
        }
    }
}

impl Notifier for WindowsEventNotifier {
    fn signal(&self) {
        // SAFETY: `handle` is a valid event object for the lifetime of `self`.
        unsafe {
            SetEvent(self.handle);
        }
    }

    fn wait(&self, timeout: Duration) -> bool {
        let millis = timeout.as_millis();
        let timeout_ms = if millis >= u128::from(INFINITE) {
            INFINITE
        } else {
            millis as u32
        };
        // SAFETY: `handle` is a valid event object for the lifetime of `self`.
        let result = unsafe { WaitForSingleObject(self.handle, timeout_ms) };
        result == WAIT_OBJECT_0
    }

    fn poll(&self) -> bool {
        // SAFETY: `handle` is a valid event object for the lifetime of `self`.
        let result = unsafe { WaitForSingleObject(self.handle, 0) };
        result == WAIT_OBJECT_0
    }

    fn raw_handle(&self) -> Option<HANDLE> {
        Some(self.handle)
    }
}
