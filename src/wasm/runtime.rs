//! The AOT WASM runtime: loads a precompiled module, instantiates it against
//! the host binding [`Linker`], and invokes stage functions.
//!
//! Grounded on `examples/original_source/arc/cpp/runtime/wasm/runtime.h`'s
//! `Runtime` contract (`initialize_runtime`/`destroy_runtime`,
//! `load_aot_module`, `instantiate`, `set_user_data`, `find_function`,
//! `call_function`), embedded here over `wasmtime` rather than WAMR. The
//! process-global engine setup is latched once per `wasmtime`-adoption note in
//! DESIGN.md, mirroring the source's one-shot `initialize_runtime`.

#![allow(unsafe_code)]

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::OnceLock;

use parking_lot::Mutex;
use wasmtime::{Config as WasmtimeConfig, Engine, Instance, Linker, Memory, Module, Store};

use crate::errors::RuntimeError;
use crate::node::Node;

use super::bindings::Bindings;
use super::value::{WasmValue, MAX_RESULTS};

static ENGINE: OnceLock<Engine> = OnceLock::new();
static INIT_LOCK: Mutex<()> = Mutex::new(());

/// One-shot process-global engine initialisation. Safe to call more than
/// once per process; later calls are no-ops. Mirrors `initialize_runtime`.
pub fn initialize_runtime() {
    let _guard = INIT_LOCK.lock();
    ENGINE.get_or_init(|| {
        let mut config = WasmtimeConfig::new();
        config.cranelift_opt_level(wasmtime::OptLevel::Speed);
        Engine::new(&config).expect("wasmtime engine configuration is infallible for this config")
    });
}

/// No-op placeholder matching `destroy_runtime`'s signature. `wasmtime`'s
/// `Engine` has no explicit teardown; the latch is released when the process
/// exits.
pub fn destroy_runtime() {}

fn engine() -> &'static Engine {
    ENGINE.get().expect("initialize_runtime must be called before constructing a Runtime")
}

/// An instantiated AOT WASM module bound to one [`Bindings`] host-function
/// table, ready to invoke stage exports.
pub struct Runtime {
    module: Option<Module>,
    store: Option<Store<Bindings>>,
    instance: Option<Instance>,
    memory: Option<Memory>,
    functions: HashMap<String, wasmtime::Func>,
}

impl Runtime {
    /// Creates a runtime with no loaded module. Call [`Self::load_aot_module`]
    /// then [`Self::instantiate`] before invoking any stage function.
    #[must_use]
    pub fn new() -> Self {
        initialize_runtime();
        Self {
            module: None,
            store: None,
            instance: None,
            memory: None,
            functions: HashMap::new(),
        }
    }

    /// Deserialises a precompiled (AOT) module from `bytes`.
    ///
    /// # Safety contract
    ///
    /// `Module::deserialize` trusts `bytes` came from a matching `wasmtime`
    /// compilation; passing arbitrary bytes is undefined behaviour upstream,
    /// which is why this crate never accepts source `.wasm` at this seam —
    /// only the paired compiler's AOT output.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::LoadFailed`] if `bytes` is not a valid
    /// precompiled module for this engine.
    pub fn load_aot_module(&mut self, bytes: &[u8]) -> Result<(), RuntimeError> {
        let module = unsafe { Module::deserialize(engine(), bytes) }.map_err(|e| RuntimeError::LoadFailed {
            reason: e.to_string(),
        })?;
        self.module = Some(module);
        Ok(())
    }

    /// Instantiates the loaded module, registering the §4.4 host bindings in
    /// the linker and proxying every binding through `node`.
    ///
    /// `heap_size` is accepted for interface fidelity with the source but is
    /// advisory only: `wasmtime` instances size their linear memory from the
    /// module's own memory section, not a caller-supplied bound. `stack_size`
    /// is likewise advisory; `wasmtime`'s stack limits are configured on the
    /// engine, not per instance.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::InstantiateFailed`] if no module is loaded, the
    /// module's imports don't match the registered bindings, or instantiation
    /// traps.
    #[allow(clippy::missing_panics_doc, unused_variables)]
    pub fn instantiate(&mut self, node: Rc<Node>, stack_size: u32, heap_size: u32) -> Result<(), RuntimeError> {
        let module = self.module.as_ref().ok_or_else(|| RuntimeError::InstantiateFailed {
            reason: "no module loaded".to_string(),
        })?;

        let bindings = Bindings::new(node);
        let mut store = Store::new(engine(), bindings);
        let mut linker: Linker<Bindings> = Linker::new(engine());
        super::bindings::register(&mut linker).map_err(|e| RuntimeError::InstantiateFailed {
            reason: e.to_string(),
        })?;

        let instance = linker
            .instantiate(&mut store, module)
            .map_err(|e| RuntimeError::InstantiateFailed {
                reason: e.to_string(),
            })?;

        let memory = instance
            .get_memory(&mut store, "memory")
            .ok_or_else(|| RuntimeError::InstantiateFailed {
                reason: "module does not export `memory`".to_string(),
            })?;
        store.data_mut().set_memory(memory);

        let mut functions = HashMap::new();
        for export in module.exports() {
            if export.ty().func().is_some() {
                if let Some(func) = instance.get_func(&mut store, export.name()) {
                    functions.insert(export.name().to_string(), func);
                }
            }
        }

        self.instance = Some(instance);
        self.memory = Some(memory);
        self.functions = functions;
        self.store = Some(store);
        Ok(())
    }

    /// Attaches the active node adapter as the instance's user-data context,
    /// mirroring `set_user_data`. Host bindings read it back on every call.
    pub fn set_user_data(&mut self, node: Rc<Node>) {
        if let Some(store) = self.store.as_mut() {
            store.data_mut().set_node(node);
        }
    }

    /// True once a module has been loaded and successfully instantiated.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.instance.is_some() && self.store.is_some()
    }

    /// Looks up an exported function by name without invoking it.
    #[must_use]
    pub fn find_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Invokes the named export with no arguments, collecting up to
    /// [`MAX_RESULTS`] results. Stage exports take no parameters and return no
    /// values per §4.5; other exports may return scalars.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::WasmPanic`] if the function is unknown or the
    /// call traps.
    pub fn call_function(&mut self, name: &str, node_key: Option<&str>) -> Result<Vec<WasmValue>, RuntimeError> {
        let func = *self.functions.get(name).ok_or_else(|| RuntimeError::WasmPanic {
            node_key: node_key.map(ToString::to_string),
            message: format!("no exported function named {name:?}"),
        })?;
        let store = self.store.as_mut().ok_or_else(|| RuntimeError::WasmPanic {
            node_key: node_key.map(ToString::to_string),
            message: "runtime not instantiated".to_string(),
        })?;

        let ty = func.ty(&mut *store);
        let mut results = vec![wasmtime::Val::I32(0); ty.results().len().min(MAX_RESULTS)];
        func.call(&mut *store, &[], &mut results).map_err(|e| RuntimeError::WasmPanic {
            node_key: node_key.map(ToString::to_string),
            message: e.to_string(),
        })?;
        Ok(results.iter().map(WasmValue::from_val).collect())
    }

    /// The instance's exported linear memory, once instantiated.
    #[must_use]
    pub fn memory(&self) -> Option<Memory> {
        self.memory
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_runtime_is_not_ready() {
        let rt = Runtime::new();
        assert!(!rt.is_ready());
        assert!(!rt.find_function("anything"));
    }

    #[test]
    fn load_aot_module_rejects_garbage_bytes() {
        let mut rt = Runtime::new();
        let err = rt.load_aot_module(b"not a real module").unwrap_err();
        assert!(matches!(err, RuntimeError::LoadFailed { .. }));
    }
}
