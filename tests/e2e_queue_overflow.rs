//! Scenario 5 — queue overflow: a full SPSC ring rejects a fifth push and
//! still yields its first four entries, in order, to the consumer.

use arc_runtime::state::FrameUpdate;
use arc_runtime::{ChannelKey, Series, Spsc};

#[test]
fn fifth_push_is_rejected_first_four_drain_in_order() {
    arc_runtime::test_utils::init_test_logging();
    let queue: Spsc<FrameUpdate> = Spsc::new(4);

    arc_runtime::test_phase!("fill the ring to capacity");
    for i in 0..4 {
        let result = queue.try_push(FrameUpdate {
            channel_key: ChannelKey(i),
            data: Series::one(f64::from(i)),
            time: Series::one(i64::from(i)),
        });
        arc_runtime::assert_with_log!(result.is_ok(), "push within capacity succeeds", true, result.is_ok());
    }

    arc_runtime::test_phase!("fifth push is rejected");
    let fifth = queue.try_push(FrameUpdate {
        channel_key: ChannelKey(4),
        data: Series::one(4.0_f64),
        time: Series::one(4_i64),
    });
    arc_runtime::assert_with_log!(fifth.is_err(), "fifth push on a full ring fails", true, fifth.is_err());

    arc_runtime::test_phase!("drain yields the original four in order");
    for expected in 0..4u32 {
        let popped = queue.try_pop().expect("entry present");
        arc_runtime::assert_with_log!(
            popped.channel_key == ChannelKey(expected),
            "entries drain in push order",
            expected,
            popped.channel_key.0
        );
    }
    arc_runtime::assert_with_log!(queue.try_pop().is_none(), "ring is empty after draining four", true, queue.try_pop().is_none());
    arc_runtime::test_complete!("queue_overflow");
}
