//! Tick orchestration: the one place that ties the state container, the node
//! adapters, and the WASM runtimes together into the per-tick sequence of
//! §4.7.
//!
//! Grounded on `examples/original_source/arc/cpp/runtime/task/task.cpp`'s
//! tick body (ingest, stratum walk, flush, clear) and on
//! `examples/original_source/arc/cpp/runtime/nodes/wasm/node.cpp`'s
//! per-node `set_user_data` + `call_function` sequence.

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use crate::errors::{noop_handler, Handler, RuntimeError};
use crate::node::Node;
use crate::queue::Spsc;
use crate::state::{ChannelWrite, FrameUpdate, State};
use crate::wasm::Runtime;

const DEFAULT_STACK_SIZE: u32 = 64 * 1024;
const DEFAULT_HEAP_SIZE: u32 = 0;

struct NodeRuntime {
    node: Rc<Node>,
    runtime: Runtime,
}

/// Precompiled AOT module bytes, one entry per IR node type (stage) name.
pub type Modules = HashMap<String, Vec<u8>>;

/// Ties one [`State`] container to its per-node WASM runtimes and boundary
/// queues, and drives one tick at a time.
///
/// One [`Runtime`]/`wasmtime::Instance` is built per node rather than per
/// node type: each node needs its own [`Bindings`](crate::wasm::Bindings)
/// context pointing at its own node adapter, and `wasmtime` already shares
/// the compiled `Module`/`Engine` between instances built from the same
/// bytes, so this costs one `Store` and one set of host-function closures
/// per node, not one compilation.
pub struct Task {
    state: Rc<State>,
    strata: Vec<Vec<NodeRuntime>>,
    input: Arc<Spsc<FrameUpdate>>,
    output: Arc<Spsc<ChannelWrite>>,
    error_handler: Handler,
}

impl Task {
    /// Builds one [`Runtime`] per node named in `state`'s IR strata,
    /// instantiating each against the AOT bytes registered under its node
    /// type in `modules`.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::LoadFailed`] if `modules` has no entry for a
    /// node's type, or [`RuntimeError::LoadFailed`]/[`RuntimeError::InstantiateFailed`]
    /// if loading or instantiating that node's runtime fails.
    pub fn new(
        state: Rc<State>,
        modules: &Modules,
        input: Arc<Spsc<FrameUpdate>>,
        output: Arc<Spsc<ChannelWrite>>,
    ) -> Result<Self, RuntimeError> {
        let mut strata = Vec::with_capacity(state.ir().strata.len());
        for stratum in &state.ir().strata {
            let mut built = Vec::with_capacity(stratum.len());
            for key in stratum {
                let ir_node = state.ir().node(key).unwrap_or_else(|| {
                    panic!("IR has no node with key {key:?}; strata and nodes disagree")
                });
                let bytes = modules.get(&ir_node.node_type).ok_or_else(|| RuntimeError::LoadFailed {
                    reason: format!("no AOT module registered for node type {:?}", ir_node.node_type),
                })?;
                let node = Rc::new(state.node(key));
                let mut runtime = Runtime::new();
                runtime.load_aot_module(bytes)?;
                runtime.instantiate(Rc::clone(&node), DEFAULT_STACK_SIZE, DEFAULT_HEAP_SIZE)?;
                built.push(NodeRuntime { node, runtime });
            }
            strata.push(built);
        }
        Ok(Self {
            state,
            strata,
            input,
            output,
            error_handler: noop_handler(),
        })
    }

    /// Installs the handler every tick's non-fatal warnings and WASM panics
    /// are reported to. Defaults to a silent no-op.
    pub fn set_error_handler(&mut self, handler: Handler) {
        self.error_handler = handler;
    }

    fn report(&self, err: RuntimeError) {
        (self.error_handler)(&err);
    }

    /// Runs one tick: drains the input queue, walks the strata invoking any
    /// node whose inputs advanced, flushes accumulated writes to the output
    /// queue, then clears this tick's channel read buffers.
    ///
    /// Returns the number of nodes that executed their WASM function this
    /// tick (zero is normal — it just means nothing advanced).
    pub fn tick(&mut self) -> usize {
        self.ingest_all();
        let mut executed = 0;
        for stratum in &mut self.strata {
            for entry in stratum.iter_mut() {
                if !entry.node.refresh_inputs() {
                    continue;
                }
                entry.runtime.set_user_data(Rc::clone(&entry.node));
                let key = entry.node.key().to_string();
                match entry.runtime.call_function(&key, Some(&key)) {
                    Ok(_) => executed += 1,
                    Err(err) => self.report(err),
                }
            }
        }
        self.flush_writes();
        self.state.clear_reads();
        executed
    }

    fn ingest_all(&self) {
        while let Some(frame) = self.input.try_pop() {
            self.state.ingest(frame);
        }
    }

    fn flush_writes(&self) {
        for write in self.state.flush_writes() {
            let channel_key = write.channel_key;
            if let Err(rejected) = self.output.try_push(write) {
                self.report(RuntimeError::QueueFullOutput {
                    channel_key: channel_key.0,
                });
                self.report(RuntimeError::DataDropped {
                    reason: format!(
                        "output queue full, dropped oldest pending write to admit channel {channel_key}"
                    ),
                });
                // Evict the oldest pending write and admit the new one in its place.
                self.output.try_pop();
                let _ = self.output.try_push(rejected);
            }
        }
    }
}
