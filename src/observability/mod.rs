//! Logging integration surface: a severity enum plus a `tracing` facade gated
//! behind `tracing-integration`, so the tick hot path pays nothing when an
//! embedder opts out.
//!
//! The runtime core has no logging framework of its own — it is linked into a
//! larger driver process — so every diagnostic goes through `tracing`'s
//! macros rather than stdout/stderr, exactly as [`crate::errors::Handler`]
//! forwards to them when `tracing_handler` is used.

pub mod level;

pub use level::LogLevel;

/// Emits a `tracing::trace!` event when `tracing-integration` is enabled;
/// compiles to nothing otherwise.
#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing-integration")]
        ::tracing::trace!($($arg)*);
    };
}

/// Emits a `tracing::debug!` event when `tracing-integration` is enabled;
/// compiles to nothing otherwise.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing-integration")]
        ::tracing::debug!($($arg)*);
    };
}

/// Emits a `tracing::warn!` event when `tracing-integration` is enabled;
/// compiles to nothing otherwise.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing-integration")]
        ::tracing::warn!($($arg)*);
    };
}

/// Emits a `tracing::error!` event when `tracing-integration` is enabled;
/// compiles to nothing otherwise.
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing-integration")]
        ::tracing::error!($($arg)*);
    };
}
