//! WASM host embedding: the AOT runtime wrapper and the host-function table
//! it exposes to compiled stages (§4.4-4.5).

pub mod bindings;
pub mod runtime;
pub mod value;

pub use bindings::Bindings;
pub use runtime::Runtime;
pub use value::WasmValue;
