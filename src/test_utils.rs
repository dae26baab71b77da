//! Shared test-support helpers: one-shot logging init plus the
//! `test_phase!`/`assert_with_log!`/`test_complete!` macro trio used to give
//! `tracing`-subscribed test runs a readable progress narration.
//!
//! The macro bodies are reconstructed from their call-site contract
//! (`init_test_logging`, `test_phase!`, `assert_with_log!`, `test_complete!`
//! used across this crate's own test modules): `test_phase!(name)` and
//! `test_complete!(name)` bracket a test with `tracing::info!` markers,
//! `assert_with_log!(cond, desc, expected, actual)` logs the comparison at
//! `debug!` before asserting.

use std::sync::Once;

static INIT: Once = Once::new();

/// Installs a `tracing-subscriber` `fmt` layer once per test process, honouring
/// `RUST_LOG` (defaulting to `debug`). Safe to call from every test; later
/// calls are no-ops.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Logs the start of a named test phase. Routed through [`crate::debug`], so
/// it compiles to nothing when `tracing-integration` is disabled.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        $crate::debug!(phase = %$name, "test phase starting");
    };
}

/// Logs a labelled comparison, then asserts it. On failure, the panic message
/// carries the same expected/actual pair the log line did.
#[macro_export]
macro_rules! assert_with_log {
    ($cond:expr, $desc:expr, $expected:expr, $actual:expr) => {{
        $crate::debug!(desc = %$desc, expected = ?$expected, actual = ?$actual, "assertion check");
        assert!(
            $cond,
            "{}: expected {:?}, got {:?}",
            $desc, $expected, $actual
        );
    }};
}

/// Logs the completion of a named test phase.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        $crate::debug!(phase = %$name, "test phase complete");
    };
}

#[cfg(test)]
mod tests {
    use super::init_test_logging;

    #[test]
    fn init_test_logging_is_idempotent() {
        init_test_logging();
        init_test_logging();
    }

    #[test]
    fn macro_trio_runs_without_panicking_on_a_true_condition() {
        init_test_logging();
        crate::test_phase!("macro_trio_smoke");
        crate::assert_with_log!(1 + 1 == 2, "arithmetic sanity", 2, 1 + 1);
        crate::test_complete!("macro_trio_smoke");
    }

    #[test]
    #[should_panic(expected = "arithmetic sanity")]
    fn assert_with_log_panics_with_its_description_on_failure() {
        crate::assert_with_log!(1 + 1 == 3, "arithmetic sanity", 3, 1 + 1);
    }
}
