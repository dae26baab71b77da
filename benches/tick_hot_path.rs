//! Benchmarks the per-tick dataflow path around a node's WASM call: watermark
//! refresh, aligned-input read, output publish, and the ingest/flush/clear
//! bracket `Task::tick` wraps every call in.
//!
//! A loaded `wasmtime::Instance` needs AOT bytes this benchmark harness has no
//! way to produce, so the WASM call itself is out of scope here; what's
//! measured is everything `Task::tick` does around it, which is the part the
//! runtime controls the cost of. Run with `cargo bench --bench tick_hot_path`.

#![allow(missing_docs)]
#![allow(clippy::semicolon_if_nothing_returned)]

use std::rc::Rc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

use arc_runtime::{ChannelKey, Kind, Series, State, Type};
use arc_runtime::types::ir::{ChannelBindings, Edge, Function, IrModule, Node as IrNode, Param};
use arc_runtime::types::Handle;

fn fanout_module(width: usize) -> Rc<IrModule> {
    let mut nodes = vec![IrNode {
        key: "src".to_string(),
        node_type: "source".to_string(),
        inputs: vec![],
        outputs: vec!["out".to_string()],
        channels: ChannelBindings::default(),
    }];
    let mut edges = Vec::with_capacity(width);
    let mut strata_sinks = Vec::with_capacity(width);
    for i in 0..width {
        let key = format!("sink{i}");
        nodes.push(IrNode {
            key: key.clone(),
            node_type: "sink".to_string(),
            inputs: vec!["x".to_string()],
            outputs: vec!["y".to_string()],
            channels: ChannelBindings::default(),
        });
        edges.push(Edge {
            source: Handle::new("src", "out"),
            target: Handle::new(&key, "x"),
        });
        strata_sinks.push(key);
    }
    Rc::new(IrModule {
        functions: vec![
            Function {
                name: "source".to_string(),
                inputs: vec![],
                outputs: vec![Param::new("out", Type::scalar(Kind::F64))],
            },
            Function {
                name: "sink".to_string(),
                inputs: vec![Param::new("x", Type::scalar(Kind::F64))],
                outputs: vec![Param::new("y", Type::scalar(Kind::F64))],
            },
        ],
        nodes,
        edges,
        strata: vec![vec!["src".to_string()], strata_sinks],
    })
}

// ===== node refresh + aligned read/write =====

fn bench_refresh_and_relay(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick/refresh_and_relay");
    for width in [1usize, 4, 16, 64] {
        group.throughput(Throughput::Elements(width as u64));
        group.bench_with_input(BenchmarkId::new("sinks", width), &width, |b, &width| {
            let state = State::new(arc_runtime::state::Config {
                ir: fanout_module(width),
                channel_digests: vec![],
            });
            let src = state.node("src");
            let sinks: Vec<_> = (0..width).map(|i| state.node(&format!("sink{i}"))).collect();
            let mut t: i64 = 0;
            b.iter(|| {
                t += 1;
                src.set_output(0, Series::one(t as f64), Series::one(t));
                let mut executed = 0;
                for sink in &sinks {
                    if black_box(sink.refresh_inputs()) {
                        let x = sink.input(0);
                        sink.set_output(0, x, Series::one(t));
                        executed += 1;
                    }
                }
                state.clear_reads();
                black_box(executed)
            });
        });
    }
    group.finish();
}

// ===== full ingest -> flush -> clear bracket =====

fn bench_ingest_flush_clear(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick/ingest_flush_clear");
    for batch in [1usize, 16, 256] {
        group.throughput(Throughput::Elements(batch as u64));
        group.bench_with_input(BenchmarkId::new("frames", batch), &batch, |b, &batch| {
            let mut channel_digests = Vec::with_capacity(batch);
            for i in 0..batch {
                let key = ChannelKey(i as u32);
                channel_digests.push(arc_runtime::state::ChannelDigest { key, index: key });
            }
            let state = State::new(arc_runtime::state::Config {
                ir: fanout_module(1),
                channel_digests,
            });
            b.iter(|| {
                for i in 0..batch {
                    state.ingest(arc_runtime::state::FrameUpdate {
                        channel_key: ChannelKey(i as u32),
                        data: Series::one(i as f64),
                        time: Series::one(i as i64),
                    });
                }
                for i in 0..batch {
                    state.write_channel(
                        ChannelKey(i as u32),
                        Series::one(i as f64),
                        Series::one(i as i64),
                    );
                }
                let writes = black_box(state.flush_writes());
                state.clear_reads();
                writes.len()
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_refresh_and_relay, bench_ingest_flush_clear);
criterion_main!(benches);
