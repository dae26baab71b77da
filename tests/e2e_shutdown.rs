//! Scenario 6 — shutdown: with the loop idle in `event_driven` mode and no
//! input, requesting a stop on its breaker makes the outer tick loop's next
//! `wait()` return `WakeReason::Shutdown` well within the 100 ms event-driven
//! cap. `wait()` itself only blocks for one `event_driven_timeout()` slice
//! per call (returning `Timer` on an uneventful expiry) — the surrounding
//! `while` loop below is the driving shape `Task`'s caller repeats it in.

use std::thread;
use std::time::{Duration, Instant};

use arc_runtime::{LoopConfig, Mode, WakeReason};

#[test]
fn stop_wakes_a_blocked_wait_with_shutdown_reason() {
    arc_runtime::test_utils::init_test_logging();
    let config = LoopConfig::builder().mode(Mode::EventDriven).build();
    let loop_ = arc_runtime::ExecutionLoop::new(config, 4);
    let breaker = loop_.breaker().clone();

    arc_runtime::test_phase!("stop the breaker shortly after wait() blocks");
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(10));
        breaker.stop();
    });

    let started = Instant::now();
    let mut reason = loop_.wait();
    while reason != WakeReason::Shutdown && started.elapsed() < Duration::from_millis(100) {
        reason = loop_.wait();
    }
    let elapsed = started.elapsed();

    arc_runtime::assert_with_log!(
        reason == WakeReason::Shutdown,
        "wait() reports shutdown once the breaker stops",
        WakeReason::Shutdown,
        reason
    );
    arc_runtime::assert_with_log!(
        elapsed < Duration::from_millis(100),
        "shutdown wakes well within the event-driven cap",
        "< 100ms",
        elapsed
    );
    arc_runtime::test_complete!("shutdown");
}
