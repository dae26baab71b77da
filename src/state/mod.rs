//! The state container: owns every value slot, channel read/write buffer,
//! interned string, handle-table series, and per-node state variable.
//!
//! Grounded on `examples/original_source/arc/cpp/runtime/state/state.cpp`
//! (`State::State`, `State::node`, `ingest`, `read_channel`, `write_channel`,
//! `flush_writes`, `clear_reads`, `parse_default_value`).

pub mod handle_table;
pub mod vars;

pub use handle_table::HandleTable;
pub use vars::{node_id_hash, StateKey, Vars};

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::types::{ChannelKey, Handle, IrModule, Kind, MultiSeries, Sample, Series, SeriesHandle, StringHandle, Type};

/// Pairs an external channel with its companion timestamp channel. A nonzero
/// `index` names the channel that must also receive `time` whenever `key`
/// is written, and is consulted as a fallback timestamp source when `key`'s
/// own ingested frames carry no time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelDigest {
    /// The data channel.
    pub key: ChannelKey,
    /// The companion timestamp channel, or `ChannelKey(0)` for none.
    pub index: ChannelKey,
}

/// Construction-time configuration for a [`State`].
pub struct Config {
    /// The compiled module this state container's value slots are shaped by.
    pub ir: Rc<IrModule>,
    /// Data/timestamp channel pairings.
    pub channel_digests: Vec<ChannelDigest>,
}

#[derive(Debug, Clone)]
struct ValueSlot {
    data: Series,
    time: Series,
}

struct Inner {
    values: Vec<ValueSlot>,
    value_index: HashMap<Handle, usize>,
    channel_reads: HashMap<ChannelKey, Vec<(Series, Series)>>,
    pending_writes: Vec<ChannelWrite>,
    handles: HandleTable,
    vars: Vars,
}

/// One telemetry frame delivered by the I/O thread into the input queue.
#[derive(Debug, Clone)]
pub struct FrameUpdate {
    /// The channel this frame belongs to.
    pub channel_key: ChannelKey,
    /// The newly arrived samples.
    pub data: Series,
    /// The samples' timestamps.
    pub time: Series,
}

/// One output sample pair drained from the output queue.
#[derive(Debug, Clone)]
pub struct ChannelWrite {
    /// The channel this write targets.
    pub channel_key: ChannelKey,
    /// The written samples.
    pub data: Series,
    /// The samples' timestamps.
    pub time: Series,
}

/// Converts an IR default-value literal (or its absence) into the one-element
/// series a default input slot is seeded with. Mirrors `parse_default_value`:
/// a present literal is cast to `ty`; otherwise every integer/float kind gets
/// its zero value, and `string`/`chan`/`series`/`invalid` — which have no zero
/// literal — get an empty series.
#[must_use]
pub fn parse_default_value(ty: &Type, default: Option<&serde_json::Value>) -> Series {
    default.map_or_else(|| zero_value_series(ty), |value| literal_to_series(ty, value))
}

fn zero_value_series(ty: &Type) -> Series {
    match ty.kind {
        Kind::U8 => Series::one(0u8),
        Kind::U16 => Series::one(0u16),
        Kind::U32 => Series::one(0u32),
        Kind::U64 => Series::one(0u64),
        Kind::I8 => Series::one(0i8),
        Kind::I16 => Series::one(0i16),
        Kind::I32 => Series::one(0i32),
        Kind::I64 => Series::one(0i64),
        Kind::F32 => Series::one(0f32),
        Kind::F64 => Series::one(0f64),
        Kind::String | Kind::Chan | Kind::Series | Kind::Invalid => Series::empty(ty.clone()),
    }
}

fn literal_to_series(ty: &Type, value: &serde_json::Value) -> Series {
    match ty.kind {
        Kind::U8 => Series::one(value.as_u64().unwrap_or(0) as u8),
        Kind::U16 => Series::one(value.as_u64().unwrap_or(0) as u16),
        Kind::U32 => Series::one(value.as_u64().unwrap_or(0) as u32),
        Kind::U64 => Series::one(value.as_u64().unwrap_or(0)),
        Kind::I8 => Series::one(value.as_i64().unwrap_or(0) as i8),
        Kind::I16 => Series::one(value.as_i64().unwrap_or(0) as i16),
        Kind::I32 => Series::one(value.as_i64().unwrap_or(0) as i32),
        Kind::I64 => Series::one(value.as_i64().unwrap_or(0)),
        Kind::F32 => Series::one(value.as_f64().unwrap_or(0.0) as f32),
        Kind::F64 => Series::one(value.as_f64().unwrap_or(0.0)),
        Kind::String => Series::one_string(value.as_str().unwrap_or_default().to_string()),
        Kind::Chan | Kind::Series | Kind::Invalid => Series::empty(ty.clone()),
    }
}

/// The runtime's sole owner of persistent per-tick data.
pub struct State {
    ir: Rc<IrModule>,
    index_channels: HashMap<ChannelKey, ChannelKey>,
    inner: RefCell<Inner>,
}

impl State {
    /// Pre-allocates one value slot per IR node output (`O(total outputs)`)
    /// and builds the `(node, param) -> slot index` map. Handed-out indices
    /// remain stable for the life of the container; the vector only grows
    /// afterward when [`Self::node`] materialises synthetic default slots for
    /// unbound inputs, which happens during graph construction, never during
    /// a tick.
    #[must_use]
    pub fn new(cfg: Config) -> Rc<Self> {
        let mut values = Vec::new();
        let mut value_index = HashMap::new();
        for node in &cfg.ir.nodes {
            let function = cfg.ir.function(&node.node_type);
            for out_name in &node.outputs {
                let ty = function
                    .and_then(|f| f.output(out_name))
                    .map_or_else(|| Type::scalar(Kind::Invalid), |p| p.ty.clone());
                let idx = values.len();
                values.push(ValueSlot {
                    data: Series::empty(ty),
                    time: Series::empty(Type::timestamp()),
                });
                value_index.insert(Handle::new(node.key.clone(), out_name.clone()), idx);
            }
        }
        let index_channels = cfg
            .channel_digests
            .iter()
            .filter(|d| d.index.0 != 0)
            .map(|d| (d.key, d.index))
            .collect();
        Rc::new(Self {
            ir: cfg.ir,
            index_channels,
            inner: RefCell::new(Inner {
                values,
                value_index,
                channel_reads: HashMap::new(),
                pending_writes: Vec::new(),
                handles: HandleTable::new(),
                vars: Vars::new(),
            }),
        })
    }

    /// The module this container was built from.
    #[must_use]
    pub fn ir(&self) -> &IrModule {
        &self.ir
    }

    /// Builds a [`crate::node::Node`] adapter for `key`, binding each input to
    /// an edge's source slot or a freshly materialised synthetic default slot.
    ///
    /// # Panics
    ///
    /// Panics if `key` does not name a node in the module, or the node names a
    /// function not present in the module — both are graph-construction
    /// errors the compiler is expected to have already rejected.
    #[must_use]
    pub fn node(self: &Rc<Self>, key: &str) -> crate::node::Node {
        crate::node::Node::build(self, key)
    }

    pub(crate) fn ir_node(&self, key: &str) -> &crate::types::ir::Node {
        self.ir
            .node(key)
            .unwrap_or_else(|| panic!("no IR node named {key:?}"))
    }

    pub(crate) fn ir_function(&self, name: &str) -> &crate::types::ir::Function {
        self.ir
            .function(name)
            .unwrap_or_else(|| panic!("no IR function named {name:?}"))
    }

    pub(crate) fn slot_index(&self, handle: &Handle) -> Option<usize> {
        self.inner.borrow().value_index.get(handle).copied()
    }

    pub(crate) fn push_slot(&self, handle: Handle, data: Series, time: Series) -> usize {
        let mut inner = self.inner.borrow_mut();
        let idx = inner.values.len();
        inner.values.push(ValueSlot { data, time });
        inner.value_index.insert(handle, idx);
        idx
    }

    pub(crate) fn slot_snapshot(&self, idx: usize) -> (Series, Series) {
        let inner = self.inner.borrow();
        let slot = &inner.values[idx];
        (slot.data.clone(), slot.time.clone())
    }

    pub(crate) fn write_slot(&self, idx: usize, data: Series, time: Series) {
        let mut inner = self.inner.borrow_mut();
        inner.values[idx] = ValueSlot { data, time };
    }

    /// Appends a newly arrived frame to its channel's per-tick read buffer.
    /// Called while the runtime thread is suspended; no concurrent readers.
    pub fn ingest(&self, frame: FrameUpdate) {
        self.inner
            .borrow_mut()
            .channel_reads
            .entry(frame.channel_key)
            .or_default()
            .push((frame.data, frame.time));
    }

    /// Deep copies of every series accumulated for `key` this tick, and
    /// whether any were present.
    #[must_use]
    pub fn read_channel(&self, key: ChannelKey) -> (MultiSeries, bool) {
        let inner = self.inner.borrow();
        match inner.channel_reads.get(&key) {
            Some(entries) if !entries.is_empty() => (
                MultiSeries {
                    series: entries.iter().map(|(d, _)| d.deep_copy()).collect(),
                },
                true,
            ),
            _ => (MultiSeries::new(), false),
        }
    }

    /// The host-binding-level channel read: the most recently ingested
    /// `(data, time)` pair for `key`. If `key` has a registered index channel
    /// and its own frame carried no time samples, the index channel's most
    /// recent data series is used as the time series instead.
    #[must_use]
    pub fn read_chan(&self, key: ChannelKey) -> (Series, Series, bool) {
        let inner = self.inner.borrow();
        let Some((data, time)) = inner.channel_reads.get(&key).and_then(|v| v.last()) else {
            return (Series::empty(Type::scalar(Kind::Invalid)), Series::empty(Type::timestamp()), false);
        };
        let data = data.deep_copy();
        let mut time = time.deep_copy();
        if time.is_empty() {
            if let Some(index_key) = self.index_channels.get(&key) {
                if let Some((idx_data, _)) = inner.channel_reads.get(index_key).and_then(|v| v.last()) {
                    time = idx_data.deep_copy();
                }
            }
        }
        (data, time, true)
    }

    /// Records a pending output write. If `key` has a registered companion
    /// index channel, also queues `(index_key, time, time)` so downstream
    /// subscribers of the index channel observe the same timestamps.
    pub fn write_channel(&self, key: ChannelKey, data: Series, time: Series) {
        let mut inner = self.inner.borrow_mut();
        if let Some(&index_key) = self.index_channels.get(&key) {
            inner.pending_writes.push(ChannelWrite {
                channel_key: index_key,
                data: time.deep_copy(),
                time: time.deep_copy(),
            });
        }
        inner.pending_writes.push(ChannelWrite {
            channel_key: key,
            data,
            time,
        });
    }

    /// Drains and returns every pending write queued since the last call.
    pub fn flush_writes(&self) -> Vec<ChannelWrite> {
        std::mem::take(&mut self.inner.borrow_mut().pending_writes)
    }

    /// Invalidates the current read buffer (policy: one tick, one snapshot).
    pub fn clear_reads(&self) {
        self.inner.borrow_mut().channel_reads.clear();
    }

    /// Interns a string, deduplicating by content.
    pub fn string_create(&self, s: impl Into<Rc<str>>) -> StringHandle {
        self.inner.borrow_mut().handles.string_create(s)
    }

    /// Interns a string decoded from raw WASM-memory bytes.
    pub fn string_from_memory(&self, bytes: &[u8]) -> StringHandle {
        self.inner.borrow_mut().handles.string_from_bytes(bytes)
    }

    /// Looks up an interned string's content.
    #[must_use]
    pub fn string_get(&self, handle: StringHandle) -> Option<String> {
        self.inner
            .borrow()
            .handles
            .string_get(handle)
            .map(ToOwned::to_owned)
    }

    /// True if `handle` addresses a live interned string.
    #[must_use]
    pub fn string_exists(&self, handle: StringHandle) -> bool {
        self.inner.borrow().handles.string_exists(handle)
    }

    /// Stores a series in the handle table, returning a fresh handle.
    pub fn series_store(&self, series: Series) -> SeriesHandle {
        self.inner.borrow_mut().handles.series_store(series)
    }

    /// A deep copy of the handle-table series addressed by `handle`.
    #[must_use]
    pub fn series_get(&self, handle: SeriesHandle) -> Option<Series> {
        self.inner.borrow().handles.series_get(handle).cloned()
    }

    /// Replaces the handle-table series addressed by `handle` in place.
    pub fn series_replace(&self, handle: SeriesHandle, series: Series) {
        self.inner.borrow_mut().handles.series_replace(handle, series);
    }

    /// Loads (installing `init` on first access) a per-node scalar variable.
    pub fn var_load_scalar(&self, key: StateKey, init: Sample) -> Sample {
        self.inner.borrow_mut().vars.load_scalar(key, init)
    }

    /// Overwrites a per-node scalar variable.
    pub fn var_store_scalar(&self, key: StateKey, value: Sample) {
        self.inner.borrow_mut().vars.store_scalar(key, value);
    }

    /// Loads (installing `init` on first access) a per-node series variable.
    pub fn var_load_series(&self, key: StateKey, init: SeriesHandle) -> SeriesHandle {
        self.inner.borrow_mut().vars.load_series(key, init)
    }

    /// Overwrites a per-node series variable.
    pub fn var_store_series(&self, key: StateKey, handle: SeriesHandle) {
        self.inner.borrow_mut().vars.store_series(key, handle);
    }

    /// Loads (installing `init` on first access) a per-node string variable.
    pub fn var_load_string(&self, key: StateKey, init: StringHandle) -> StringHandle {
        self.inner.borrow_mut().vars.load_string(key, init)
    }

    /// Overwrites a per-node string variable.
    pub fn var_store_string(&self, key: StateKey, handle: StringHandle) {
        self.inner.borrow_mut().vars.store_string(key, handle);
    }

    /// Test-only direct write to a `(node_key, out_name)` value slot, used to
    /// simulate a producing node's output without driving a full tick.
    #[cfg(test)]
    pub fn write_slot_for_test(&self, node_key: &str, out_name: &str, data: Series, time: Series) {
        let idx = self
            .slot_index(&Handle::new(node_key, out_name))
            .expect("slot must exist");
        self.write_slot(idx, data, time);
    }
}
