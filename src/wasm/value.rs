//! `WasmValue`: a tagged union over the four WASM value types, plus the fixed
//! 16-slot argument/result buffers the call path is provisioned with.
//!
//! Grounded on `examples/original_source/arc/cpp/runtime/wasm/runtime.h`'s
//! `WasmValue` (a tagged `{I32, I64, F32, F64}` union) and its `MAX_ARGS`/
//! `MAX_RESULTS` pre-allocated call buffers.

use wasmtime::Val;

/// The maximum number of arguments a [`super::runtime::Runtime::call_function`]
/// invocation may pass, matching the source's `MAX_ARGS`.
pub const MAX_ARGS: usize = 16;
/// The maximum number of results a call may produce, matching `MAX_RESULTS`.
pub const MAX_RESULTS: usize = 16;

/// A WASM-ABI value: i32, i64, f32, or f64.
///
/// Stage entry points currently take no arguments and return no values —
/// all I/O flows through host bindings — but the type and its fixed buffers
/// exist so the call path is provisioned for forward compatibility without
/// an ABI break.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WasmValue {
    /// 32-bit integer.
    I32(i32),
    /// 64-bit integer.
    I64(i64),
    /// 32-bit float.
    F32(f32),
    /// 64-bit float.
    F64(f64),
}

impl WasmValue {
    /// Converts to a `wasmtime::Val` for passing across the call boundary.
    #[must_use]
    pub(crate) fn to_val(self) -> Val {
        match self {
            Self::I32(v) => Val::I32(v),
            Self::I64(v) => Val::I64(v),
            Self::F32(v) => Val::F32(v.to_bits()),
            Self::F64(v) => Val::F64(v.to_bits()),
        }
    }

    /// Converts from a `wasmtime::Val`; a reference/func value (which never
    /// appears in this ABI) degrades to `I32(0)` rather than panicking.
    #[must_use]
    pub(crate) fn from_val(val: &Val) -> Self {
        match val {
            Val::I32(v) => Self::I32(*v),
            Val::I64(v) => Self::I64(*v),
            Val::F32(bits) => Self::F32(f32::from_bits(*bits)),
            Val::F64(bits) => Self::F64(f64::from_bits(*bits)),
            Val::FuncRef(_) | Val::ExternRef(_) | Val::AnyRef(_) | Val::V128(_) => Self::I32(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn i32_round_trips_through_val() {
        let v = WasmValue::I32(42);
        assert_eq!(WasmValue::from_val(&v.to_val()), v);
    }

    #[test]
    fn i64_round_trips_through_val() {
        let v = WasmValue::I64(-7);
        assert_eq!(WasmValue::from_val(&v.to_val()), v);
    }

    #[test]
    fn f32_round_trips_through_bit_pattern() {
        let v = WasmValue::F32(1.5);
        assert_eq!(WasmValue::from_val(&v.to_val()), v);
    }

    #[test]
    fn f64_round_trips_through_bit_pattern() {
        let v = WasmValue::F64(3.25);
        assert_eq!(WasmValue::from_val(&v.to_val()), v);
    }
}
