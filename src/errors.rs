//! Hierarchical error codes, [`RuntimeError`], and the configured-handler
//! propagation seam.
//!
//! Grounded on `examples/original_source/arc/cpp/errors/errors.h` and
//! `examples/original_source/arc/cpp/runtime/errors/errors.h`'s
//! `BASE`/`sub()` chaining: every error carries a dotted code whose parents
//! are real prefixes of its children, not just documentation.

use std::fmt;

/// A dotted hierarchical error code, e.g. `arc.runtime.queue_full.input`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode(&'static str);

/// The root of all Arc errors.
pub const ARC: ErrorCode = ErrorCode("arc");
/// Runtime-level errors.
pub const RUNTIME: ErrorCode = ErrorCode("arc.runtime");
/// Backpressure on the input queue: fatal for the current frame.
pub const QUEUE_FULL_INPUT: ErrorCode = ErrorCode("arc.runtime.queue_full.input");
/// Backpressure on the output queue: drops the oldest pending write.
pub const QUEUE_FULL_OUTPUT: ErrorCode = ErrorCode("arc.runtime.queue_full.output");
/// Compiled user code panicked or trapped; fatal for the current tick.
pub const WASM_PANIC: ErrorCode = ErrorCode("arc.runtime.wasm_panic");
/// Non-fatal runtime warning.
pub const WARNING: ErrorCode = ErrorCode("arc.runtime.warning");
/// A frame or write was dropped but execution continues.
pub const DATA_DROPPED: ErrorCode = ErrorCode("arc.runtime.warning.data_dropped");

impl ErrorCode {
    /// The dotted string form, e.g. `"arc.runtime.wasm_panic"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }

    /// True iff `self` is `other` or a dot-prefixed descendant of it:
    /// `arc.runtime.warning.data_dropped.is_descendant_of(arc.runtime.warning)`.
    #[must_use]
    pub fn is_descendant_of(self, other: Self) -> bool {
        self.0 == other.0 || self.0.starts_with(&format!("{}.", other.0))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A runtime-thread error, carrying the structured context needed to act on
/// it. `Display` renders the dotted §7 code; [`RuntimeError::code`] exposes it
/// as data for callers that branch on the code string rather than the variant.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The input queue was full; the current frame was dropped.
    #[error("arc.runtime.queue_full.input: dropped frame for channel {channel_key}")]
    QueueFullInput {
        /// The channel whose frame was dropped.
        channel_key: u32,
    },
    /// The output queue was full; the oldest pending write for the channel
    /// was dropped.
    #[error("arc.runtime.queue_full.output: dropped write for channel {channel_key}")]
    QueueFullOutput {
        /// The channel whose write was dropped.
        channel_key: u32,
    },
    /// Compiled user code called `panic()` or the WASM call trapped.
    #[error("arc.runtime.wasm_panic: {message} (node {node_key:?})")]
    WasmPanic {
        /// The node executing when the panic/trap occurred, if known.
        node_key: Option<String>,
        /// The panic message, or a trap description.
        message: String,
    },
    /// A frame or write was dropped but execution continues.
    #[error("arc.runtime.warning.data_dropped: {reason}")]
    DataDropped {
        /// Human-readable reason for the drop.
        reason: String,
    },
    /// The AOT module failed to load (malformed bytecode, missing exports).
    #[error("arc.runtime: failed to load module: {reason}")]
    LoadFailed {
        /// Why loading failed.
        reason: String,
    },
    /// Instance construction failed (bad stack/heap sizing, import mismatch).
    #[error("arc.runtime: failed to instantiate module: {reason}")]
    InstantiateFailed {
        /// Why instantiation failed.
        reason: String,
    },
}

impl RuntimeError {
    /// The dotted §7 code for this error, as data.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::QueueFullInput { .. } => QUEUE_FULL_INPUT,
            Self::QueueFullOutput { .. } => QUEUE_FULL_OUTPUT,
            Self::WasmPanic { .. } => WASM_PANIC,
            Self::DataDropped { .. } => DATA_DROPPED,
            Self::LoadFailed { .. } | Self::InstantiateFailed { .. } => RUNTIME,
        }
    }
}

/// A configured error-handling callback. The default ([`noop_handler`]) is
/// silent; [`tracing_handler`] (behind `tracing-integration`) forwards to
/// `tracing::warn!`/`error!` by severity.
pub type Handler = Box<dyn Fn(&RuntimeError) + Send + 'static>;

/// The default handler: does nothing. Matches `arc::runtime::noop_handler`.
#[must_use]
pub fn noop_handler() -> Handler {
    Box::new(|_| {})
}

/// A handler that forwards each error to `tracing`, classified by severity
/// (`data_dropped` → `warn!`, everything else → `error!`).
#[cfg(feature = "tracing-integration")]
#[must_use]
pub fn tracing_handler() -> Handler {
    Box::new(|err: &RuntimeError| {
        if err.code().is_descendant_of(WARNING) {
            tracing::warn!(code = %err.code(), "{err}");
        } else {
            tracing::error!(code = %err.code(), "{err}");
        }
    })
}
