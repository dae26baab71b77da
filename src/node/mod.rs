//! The node adapter: binds one IR node's inputs to their sources, tracks
//! per-input watermarks, and presents aligned input/output accessors to the
//! compiled stage function.
//!
//! Grounded on `examples/original_source/arc/cpp/runtime/state/state.cpp`'s
//! `State::node` (construction) and `Node::refresh_inputs`/`read_chan`/
//! `write_chan`/`input_time`/`output`/`output_time`/`is_output_truthy`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::state::{node_id_hash, State, StateKey};
use crate::types::{ChannelKey, Handle, MultiSeries, Sample, Series, SeriesHandle, StringHandle, Type};

struct AccInput {
    slot_idx: usize,
    data: Series,
    time: Series,
    last_timestamp: i64,
    consumed: bool,
}

struct Mutable {
    inputs: Vec<AccInput>,
    aligned_data: Vec<Series>,
    aligned_time: Vec<Series>,
}

/// The runtime projection of one IR node: resolved input bindings, the
/// per-input watermark accumulator, the aligned buffers presented to the
/// stage function, and the node's output slot indices.
///
/// The watermark/alignment state lives behind a [`RefCell`] rather than
/// requiring `&mut Node`, since a [`Node`] is shared (via `Rc`) between the
/// task that drives ticks and the [`crate::wasm::Bindings`] the active WASM
/// instance reaches it through — mirroring `node.cpp`'s raw `NodeState*`,
/// which is mutated through regardless of who else holds a reference to it.
pub struct Node {
    state: Rc<State>,
    key: String,
    node_id_hash: u64,
    mutable: RefCell<Mutable>,
    outputs: Vec<usize>,
    output_names: HashMap<String, usize>,
}

impl Node {
    pub(crate) fn build(state: &Rc<State>, key: &str) -> Self {
        let ir_node = state.ir_node(key).clone();
        let function = state.ir_function(&ir_node.node_type).clone();

        let mut inputs = Vec::with_capacity(ir_node.inputs.len());
        for param_name in &ir_node.inputs {
            let target = Handle::new(key, param_name.as_str());
            let edge = state.ir().edges.iter().find(|e| e.target == target);
            let slot_idx = if let Some(edge) = edge {
                state
                    .slot_index(&edge.source)
                    .unwrap_or_else(|| panic!("edge source {:?} has no value slot", edge.source))
            } else {
                let param = function
                    .input(param_name)
                    .unwrap_or_else(|| panic!("function {:?} has no input {param_name:?}", function.name));
                let value = crate::state::parse_default_value(&param.ty, param.default.as_ref());
                let time = if value.is_empty() {
                    Series::empty(Type::timestamp())
                } else {
                    Series::one(0_i64)
                };
                let handle = Handle::synthetic_default(key, param_name);
                state.push_slot(handle, value, time)
            };
            inputs.push(AccInput {
                slot_idx,
                data: Series::empty(function.input(param_name).map_or_else(
                    || Type::scalar(crate::types::Kind::Invalid),
                    |p| p.ty.clone(),
                )),
                time: Series::empty(Type::timestamp()),
                last_timestamp: 0,
                consumed: edge.is_some(),
            });
        }

        let mut outputs = Vec::with_capacity(ir_node.outputs.len());
        let mut output_names = HashMap::new();
        for (i, out_name) in ir_node.outputs.iter().enumerate() {
            let handle = Handle::new(key, out_name.as_str());
            let idx = state
                .slot_index(&handle)
                .unwrap_or_else(|| panic!("output slot {handle:?} missing"));
            outputs.push(idx);
            output_names.insert(out_name.clone(), i);
        }

        let n_inputs = inputs.len();
        Self {
            state: Rc::clone(state),
            node_id_hash: node_id_hash(key),
            key: key.to_string(),
            mutable: RefCell::new(Mutable {
                inputs,
                aligned_data: vec![Series::empty(Type::scalar(crate::types::Kind::Invalid)); n_inputs],
                aligned_time: vec![Series::empty(Type::timestamp()); n_inputs],
            }),
            outputs,
            output_names,
        }
    }

    /// The node's IR key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Advances each input's watermark against its source slot. Returns
    /// `true` iff the node should execute this tick.
    ///
    /// A node with no inputs always returns `true` (a pure source node runs
    /// unconditionally every tick). Otherwise: any input whose source has
    /// produced a newer timestamp than its accumulator adopts that source's
    /// data/time and clears `consumed`; any input that has *never* produced
    /// data aborts the refresh with `false`; if, after the pass, every input
    /// is still marked `consumed` (nothing advanced), the node does not run.
    pub fn refresh_inputs(&self) -> bool {
        let mut m = self.mutable.borrow_mut();
        if m.inputs.is_empty() {
            return true;
        }
        let state = Rc::clone(&self.state);
        for acc in &mut m.inputs {
            let (data, time) = state.slot_snapshot(acc.slot_idx);
            if !data.is_empty() && !time.is_empty() {
                if let Some(ts) = time.at::<i64>(-1) {
                    // `acc.data.is_empty()` covers the first observation of a
                    // slot seeded at timestamp 0 (e.g. a synthetic default),
                    // which `ts > acc.last_timestamp` alone would never admit.
                    if acc.data.is_empty() || ts > acc.last_timestamp {
                        acc.data = data;
                        acc.time = time;
                        acc.last_timestamp = ts;
                        acc.consumed = false;
                    }
                }
            }
            if acc.data.is_empty() {
                return false;
            }
        }
        if m.inputs.iter().all(|a| a.consumed) {
            return false;
        }
        for i in 0..m.inputs.len() {
            m.aligned_data[i] = m.inputs[i].data.clone();
            m.aligned_time[i] = m.inputs[i].time.clone();
            m.inputs[i].consumed = true;
        }
        true
    }

    /// The aligned input data series at position `i`.
    #[must_use]
    pub fn input(&self, i: usize) -> Series {
        self.mutable.borrow().aligned_data[i].clone()
    }

    /// The aligned input time series at position `i`.
    #[must_use]
    pub fn input_time(&self, i: usize) -> Series {
        self.mutable.borrow().aligned_time[i].clone()
    }

    /// A snapshot of output slot `i`'s current data series.
    #[must_use]
    pub fn output(&self, i: usize) -> Series {
        self.state.slot_snapshot(self.outputs[i]).0
    }

    /// A snapshot of output slot `i`'s current time series.
    #[must_use]
    pub fn output_time(&self, i: usize) -> Series {
        self.state.slot_snapshot(self.outputs[i]).1
    }

    /// Writes output slot `i` by position.
    pub fn set_output(&self, i: usize, data: Series, time: Series) {
        self.state.write_slot(self.outputs[i], data, time);
    }

    /// Writes an output slot by declared name.
    ///
    /// # Panics
    ///
    /// Panics if `name` does not name a declared output of this node.
    pub fn set_output_named(&self, name: &str, data: Series, time: Series) {
        let i = *self
            .output_names
            .get(name)
            .unwrap_or_else(|| panic!("node {:?} has no output {name:?}", self.key));
        self.set_output(i, data, time);
    }

    /// True iff the named output's last sample is truthy (nonzero / non-empty
    /// string); false if the output has no declared slot by that name or is
    /// currently empty.
    #[must_use]
    pub fn is_output_truthy(&self, name: &str) -> bool {
        self.output_names
            .get(name)
            .is_some_and(|&i| self.state.slot_snapshot(self.outputs[i]).0.last_is_truthy())
    }

    /// Host-binding-level channel read, passed through to the state
    /// container (see [`State::read_chan`]).
    #[must_use]
    pub fn read_chan(&self, key: ChannelKey) -> (Series, Series, bool) {
        self.state.read_chan(key)
    }

    /// Host-binding-level channel write, passed through to the state
    /// container (see [`State::write_channel`]).
    pub fn write_chan(&self, key: ChannelKey, data: Series, time: Series) {
        self.state.write_channel(key, data, time);
    }

    /// Deep copies of every series accumulated this tick for `key`, passed
    /// through to the state container (see [`State::read_channel`]).
    #[must_use]
    pub fn read_channel(&self, key: ChannelKey) -> (MultiSeries, bool) {
        self.state.read_channel(key)
    }

    /// Handle-table string interning, passed through to the state container.
    /// WASM host bindings reach the handle table exclusively through the
    /// active node, the way `bindings.cpp`'s `this->state` (really the
    /// per-node `NodeState*` latched via `set_user_data`) forwards every
    /// handle op to its owning container.
    pub fn string_create(&self, s: impl Into<std::rc::Rc<str>>) -> StringHandle {
        self.state.string_create(s)
    }

    /// Interns a string decoded from raw WASM-memory bytes.
    pub fn string_from_memory(&self, bytes: &[u8]) -> StringHandle {
        self.state.string_from_memory(bytes)
    }

    /// Looks up an interned string's content.
    #[must_use]
    pub fn string_get(&self, handle: StringHandle) -> Option<String> {
        self.state.string_get(handle)
    }

    /// True if `handle` addresses a live interned string.
    #[must_use]
    pub fn string_exists(&self, handle: StringHandle) -> bool {
        self.state.string_exists(handle)
    }

    /// Stores a series in the handle table, returning a fresh handle.
    pub fn series_store(&self, series: Series) -> SeriesHandle {
        self.state.series_store(series)
    }

    /// A deep copy of the handle-table series addressed by `handle`.
    #[must_use]
    pub fn series_get(&self, handle: SeriesHandle) -> Option<Series> {
        self.state.series_get(handle)
    }

    /// Replaces the handle-table series addressed by `handle` in place.
    pub fn series_replace(&self, handle: SeriesHandle, series: Series) {
        self.state.series_replace(handle, series);
    }

    /// This node's key for [`StateKey`] construction (state variables are
    /// namespaced per node by this hash).
    #[must_use]
    pub(crate) fn state_key(&self, var_id: u32) -> StateKey {
        (self.node_id_hash, var_id)
    }

    /// Loads (installing `init` on first access) a scalar state variable
    /// owned by this node.
    pub fn load_var(&self, var_id: u32, init: Sample) -> Sample {
        self.state.var_load_scalar(self.state_key(var_id), init)
    }

    /// Overwrites a scalar state variable owned by this node.
    pub fn store_var(&self, var_id: u32, value: Sample) {
        self.state.var_store_scalar(self.state_key(var_id), value);
    }

    /// Loads (installing `init` on first access) a series state variable
    /// owned by this node.
    pub fn load_var_series(&self, var_id: u32, init: SeriesHandle) -> SeriesHandle {
        self.state.var_load_series(self.state_key(var_id), init)
    }

    /// Overwrites a series state variable owned by this node.
    pub fn store_var_series(&self, var_id: u32, handle: SeriesHandle) {
        self.state.var_store_series(self.state_key(var_id), handle);
    }

    /// Loads (installing `init` on first access) a string state variable
    /// owned by this node.
    pub fn load_var_string(&self, var_id: u32, init: StringHandle) -> StringHandle {
        self.state.var_load_string(self.state_key(var_id), init)
    }

    /// Overwrites a string state variable owned by this node.
    pub fn store_var_string(&self, var_id: u32, handle: StringHandle) {
        self.state.var_store_string(self.state_key(var_id), handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Config;
    use crate::types::ir::{ChannelBindings, Edge, Function, IrModule, Param};
    use crate::types::Kind;

    fn module_with_edge() -> Rc<crate::types::IrModule> {
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
                    outputs: vec![Param::new("out", Type::scalar(Kind::F64))],
                },
            ],
            nodes: vec![
                crate::types::ir::Node {
                    key: "src".to_string(),
                    node_type: "source".to_string(),
                    inputs: vec![],
                    outputs: vec!["out".to_string()],
                    channels: ChannelBindings::default(),
                },
                crate::types::ir::Node {
                    key: "snk".to_string(),
                    node_type: "sink".to_string(),
                    inputs: vec!["x".to_string()],
                    outputs: vec!["out".to_string()],
                    channels: ChannelBindings::default(),
                },
            ],
            edges: vec![Edge {
                source: Handle::new("src", "out"),
                target: Handle::new("snk", "x"),
            }],
            strata: vec![vec!["src".to_string()], vec!["snk".to_string()]],
        })
    }

    #[test]
    fn zero_input_node_always_executes() {
        let state = State::new(Config {
            ir: module_with_edge(),
            channel_digests: vec![],
        });
        let src = state.node("src");
        assert!(src.refresh_inputs());
        assert!(src.refresh_inputs());
    }

    #[test]
    fn bound_input_waits_for_first_data_then_requires_advance() {
        let state = State::new(Config {
            ir: module_with_edge(),
            channel_digests: vec![],
        });
        let sink = state.node("snk");
        assert!(!sink.refresh_inputs(), "no data yet on source slot");

        state.write_slot_for_test("src", "out", Series::one(1.0_f64), Series::one(10_i64));
        assert!(sink.refresh_inputs());
        assert!(!sink.refresh_inputs(), "timestamp has not advanced");

        state.write_slot_for_test("src", "out", Series::one(2.0_f64), Series::one(20_i64));
        assert!(sink.refresh_inputs());
        assert_eq!(sink.input(0).at::<f64>(0), Some(2.0));
    }

    #[test]
    fn default_slot_used_when_no_edge_bound() {
        let ir = Rc::new(IrModule {
            functions: vec![Function {
                name: "f".to_string(),
                inputs: vec![Param::with_default(
                    "x",
                    Type::scalar(Kind::I32),
                    serde_json::json!(7),
                )],
                outputs: vec![Param::new("out", Type::scalar(Kind::I32))],
            }],
            nodes: vec![crate::types::ir::Node {
                key: "n1".to_string(),
                node_type: "f".to_string(),
                inputs: vec!["x".to_string()],
                outputs: vec!["out".to_string()],
                channels: ChannelBindings::default(),
            }],
            edges: vec![],
            strata: vec![vec!["n1".to_string()]],
        });
        let state = State::new(Config {
            ir,
            channel_digests: vec![],
        });
        let n1 = state.node("n1");
        assert!(n1.refresh_inputs());
        assert_eq!(n1.input(0).at::<i32>(0), Some(7));
    }
}
