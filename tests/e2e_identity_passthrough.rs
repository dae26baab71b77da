//! Scenario 1 — identity passthrough: a source node relays one externally
//! ingested channel sample through an identity stage to a sink node, which
//! re-publishes it on a different channel.
//!
//! Exercising the compiled stage itself needs an AOT `wasmtime::Module` this
//! harness has no toolchain to produce, so the identity computation is
//! performed inline, standing in for what a `stage calc(x: f32) -> f32 {
//! return x }` body would do when called with the node already latched via
//! `wasm::Bindings::set_node`. Everything else — channel ingest, node
//! alignment, channel write, queue flush — runs through the real runtime.

use std::rc::Rc;

use arc_runtime::state::Config;
use arc_runtime::types::ir::{ChannelBindings, Edge, Function, IrModule, Node as IrNode, Param};
use arc_runtime::{ChannelKey, Handle, Kind, Series, State, Type};

fn module() -> Rc<IrModule> {
    Rc::new(IrModule {
        functions: vec![
            Function {
                name: "source".to_string(),
                inputs: vec![],
                outputs: vec![Param::new("out", Type::scalar(Kind::F32))],
            },
            Function {
                name: "calc".to_string(),
                inputs: vec![Param::new("x", Type::scalar(Kind::F32))],
                outputs: vec![Param::new("out", Type::scalar(Kind::F32))],
            },
            Function {
                name: "sink".to_string(),
                inputs: vec![Param::new("y", Type::scalar(Kind::F32))],
                outputs: vec![],
            },
        ],
        nodes: vec![
            IrNode {
                key: "A".to_string(),
                node_type: "source".to_string(),
                inputs: vec![],
                outputs: vec!["out".to_string()],
                channels: ChannelBindings::default(),
            },
            IrNode {
                key: "F".to_string(),
                node_type: "calc".to_string(),
                inputs: vec!["x".to_string()],
                outputs: vec!["out".to_string()],
                channels: ChannelBindings::default(),
            },
            IrNode {
                key: "B".to_string(),
                node_type: "sink".to_string(),
                inputs: vec!["y".to_string()],
                outputs: vec![],
                channels: ChannelBindings::default(),
            },
        ],
        edges: vec![
            Edge {
                source: Handle::new("A", "out"),
                target: Handle::new("F", "x"),
            },
            Edge {
                source: Handle::new("F", "out"),
                target: Handle::new("B", "y"),
            },
        ],
        strata: vec![vec!["A".to_string()], vec!["F".to_string()], vec!["B".to_string()]],
    })
}

#[test]
fn one_tick_relays_the_last_ingested_sample_through_identity() {
    arc_runtime::test_utils::init_test_logging();
    const SOURCE_CHANNEL: ChannelKey = ChannelKey(10);
    const SINK_CHANNEL: ChannelKey = ChannelKey(11);
    let t0: i64 = 1_000_000_000;

    let state = State::new(Config {
        ir: module(),
        channel_digests: vec![],
    });
    let node_a = state.node("A");
    let node_f = state.node("F");
    let node_b = state.node("B");

    arc_runtime::test_phase!("ingest three samples on channel 10");
    for (i, value) in [1.0_f32, 2.0, 3.0].into_iter().enumerate() {
        state.ingest(arc_runtime::state::FrameUpdate {
            channel_key: SOURCE_CHANNEL,
            data: Series::one(value),
            time: Series::one(t0 + i as i64),
        });
    }

    arc_runtime::test_phase!("run one tick by hand: A relays, F identity, B republishes");
    let (data, time, ok) = node_a.read_chan(SOURCE_CHANNEL);
    arc_runtime::assert_with_log!(ok, "channel 10 has data", true, ok);
    node_a.set_output(0, data, time);

    let f_ran = node_f.refresh_inputs();
    arc_runtime::assert_with_log!(f_ran, "F's input advanced", true, f_ran);
    node_f.set_output(0, node_f.input(0), node_f.input_time(0));

    let b_ran = node_b.refresh_inputs();
    arc_runtime::assert_with_log!(b_ran, "B's input advanced", true, b_ran);
    node_b.write_chan(SINK_CHANNEL, node_b.input(0), node_b.input_time(0));

    let writes = state.flush_writes();
    arc_runtime::assert_with_log!(writes.len() == 1, "exactly one write flushed", 1, writes.len());
    let write = &writes[0];
    arc_runtime::assert_with_log!(
        write.channel_key == SINK_CHANNEL,
        "write targets channel 11",
        SINK_CHANNEL,
        write.channel_key
    );
    let value = write.data.at::<f32>(0).expect("scalar sample");
    arc_runtime::assert_with_log!(value == 3.0, "relayed value is the last sample", 3.0, value);
    let ts = write.time.at::<i64>(0).expect("timestamp");
    arc_runtime::assert_with_log!(ts >= t0 + 2, "timestamp at or after t0+2ms", t0 + 2, ts);

    state.clear_reads();
    arc_runtime::test_complete!("identity_passthrough");
}
