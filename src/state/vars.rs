//! Per-node state variables: scalars and series addressed by
//! `(node_id_hash, var_id)`, disjoint across nodes that reuse the same `var_id`.
//!
//! Grounded on spec §3 "State variables" and the `state_load_<T>`/`state_store_<T>`
//! binding family in `examples/original_source/arc/cpp/runtime/wasm/bindings.cpp`'s
//! `IMPL_STATE_OPS` macro.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::types::{Sample, SeriesHandle, StringHandle};

/// Identifies one state variable slot: a node (by its key's hash) and a
/// compiler-assigned variable id local to that node.
pub type StateKey = (u64, u32);

/// Hashes a node key into the stable component of a [`StateKey`]. Stable only
/// within one process run (state is never persisted, so cross-run stability
/// is not required).
#[must_use]
pub fn node_id_hash(node_key: &str) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    node_key.hash(&mut hasher);
    hasher.finish()
}

/// Storage for every node's scalar, series, and string state variables.
#[derive(Debug, Default)]
pub struct Vars {
    scalars: HashMap<StateKey, Sample>,
    series: HashMap<StateKey, SeriesHandle>,
    strings: HashMap<StateKey, StringHandle>,
}

impl Vars {
    /// An empty variable store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// First load installs `init` and returns it; subsequent loads return the
    /// stored value.
    pub fn load_scalar(&mut self, key: StateKey, init: Sample) -> Sample {
        self.scalars.entry(key).or_insert(init).clone()
    }

    /// Overwrites the scalar at `key`.
    pub fn store_scalar(&mut self, key: StateKey, value: Sample) {
        self.scalars.insert(key, value);
    }

    /// First load installs `init` and returns it; subsequent loads return the
    /// stored handle.
    pub fn load_series(&mut self, key: StateKey, init: SeriesHandle) -> SeriesHandle {
        *self.series.entry(key).or_insert(init)
    }

    /// Overwrites the series handle at `key`.
    pub fn store_series(&mut self, key: StateKey, handle: SeriesHandle) {
        self.series.insert(key, handle);
    }

    /// First load installs `init` and returns it; subsequent loads return the
    /// stored handle.
    pub fn load_string(&mut self, key: StateKey, init: StringHandle) -> StringHandle {
        *self.strings.entry(key).or_insert(init)
    }

    /// Overwrites the string handle at `key`.
    pub fn store_string(&mut self, key: StateKey, handle: StringHandle) {
        self.strings.insert(key, handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_nodes_with_same_var_id_are_disjoint() {
        let mut v = Vars::new();
        let a = (node_id_hash("n1"), 0);
        let b = (node_id_hash("n2"), 0);
        v.store_scalar(a, Sample::I32(1));
        v.store_scalar(b, Sample::I32(2));
        assert_eq!(v.load_scalar(a, Sample::I32(0)), Sample::I32(1));
        assert_eq!(v.load_scalar(b, Sample::I32(0)), Sample::I32(2));
    }

    #[test]
    fn first_load_installs_init() {
        let mut v = Vars::new();
        let k = (node_id_hash("n1"), 3);
        assert_eq!(v.load_scalar(k, Sample::F64(9.0)), Sample::F64(9.0));
        assert_eq!(v.load_scalar(k, Sample::F64(0.0)), Sample::F64(9.0));
    }

    #[test]
    fn series_and_string_vars_are_independent_namespaces() {
        let mut v = Vars::new();
        let k = (node_id_hash("n1"), 0);
        v.store_series(k, SeriesHandle(5));
        v.store_string(k, StringHandle(7));
        assert_eq!(v.load_series(k, SeriesHandle::NULL), SeriesHandle(5));
        assert_eq!(v.load_string(k, StringHandle::NULL), StringHandle(7));
    }
}
