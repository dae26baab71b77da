//! `Bindings`: the host-function table exposed to compiled WASM.
//!
//! Grounded on `examples/original_source/arc/cpp/runtime/wasm/bindings.cpp`'s
//! binding families (channel scalar/string read-write, series create/set/
//! index/arithmetic/comparison, series unary, state scalar/series load-store,
//! series length/slice, string ops, misc now/math_pow/panic) and
//! `examples/original_source/arc/cpp/runtime/nodes/wasm/node.cpp`'s
//! `set_user_data(node_state_.get())`, which is why every binding here reaches
//! the state container through the active [`Node`] rather than directly.
//!
//! Each binding is a plain function recovering `&Bindings` from the call's
//! [`wasmtime::Caller`] rather than a trait-object method, per the "no dynamic
//! dispatch across host functions" design note: this keeps every binding
//! inlinable and avoids a vtable for a table that is, in practice, fixed at
//! compile time.

use std::panic::AssertUnwindSafe;
use std::rc::Rc;
use std::sync::Arc;

use wasmtime::{Caller, Linker, Memory};

use crate::errors::{noop_handler, Handler, RuntimeError};
use crate::node::Node;
use crate::time::{TimeSource, WallClock};
use crate::types::{
    compare, negate, not_u8, scalar_op, zip_numeric, ChannelKey, Element, Kind, Sample, Series, SeriesHandle,
    StringHandle, Type,
};

/// The host-function context: the active node adapter, the instance's
/// exported memory, the configured clock, and the error handler. Latched once
/// per instantiation and re-pointed at the active node every tick via
/// [`Runtime::set_user_data`](super::runtime::Runtime::set_user_data).
pub struct Bindings {
    node: Option<Rc<Node>>,
    memory: Option<Memory>,
    clock: Arc<dyn TimeSource>,
    error_handler: Handler,
}

impl Bindings {
    pub(crate) fn new(node: Rc<Node>) -> Self {
        Self {
            node: Some(node),
            memory: None,
            clock: Arc::new(WallClock),
            error_handler: noop_handler(),
        }
    }

    pub(crate) fn set_node(&mut self, node: Rc<Node>) {
        self.node = Some(node);
    }

    pub(crate) fn set_memory(&mut self, memory: Memory) {
        self.memory = Some(memory);
    }

    /// Overrides the clock `now()` reads from (tests substitute a
    /// [`crate::time::VirtualClock`] to assert exact nanosecond values).
    pub fn set_clock(&mut self, clock: Arc<dyn TimeSource>) {
        self.clock = clock;
    }

    /// Overrides the error handler errors are reported to.
    pub fn set_error_handler(&mut self, handler: Handler) {
        self.error_handler = handler;
    }

    fn report(&self, err: RuntimeError) {
        (self.error_handler)(&err);
    }
}

fn now_series(clock: &Arc<dyn TimeSource>) -> Series {
    let mut t = Series::empty(Type::timestamp());
    t.write(clock.now());
    t
}

/// Registers every §4.4 binding family into `linker`, in the source's
/// enumerated order.
///
/// # Errors
///
/// Propagates any `wasmtime` error from a duplicate or conflicting import
/// definition.
pub(crate) fn register(linker: &mut Linker<Bindings>) -> wasmtime::Result<()> {
    register_channel_scalar(linker)?;
    register_channel_string(linker)?;
    register_series_ops(linker)?;
    register_series_unary(linker)?;
    register_state_scalar(linker)?;
    register_series_len_slice(linker)?;
    register_string_ops(linker)?;
    register_misc(linker)?;
    Ok(())
}

macro_rules! for_each_numeric {
    ($macro_name:ident, $linker:expr) => {
        $macro_name!($linker, u8, u8, i32, U8);
        $macro_name!($linker, u16, u16, i32, U16);
        $macro_name!($linker, u32, u32, i32, U32);
        $macro_name!($linker, u64, u64, i64, U64);
        $macro_name!($linker, i8, i8, i32, I8);
        $macro_name!($linker, i16, i16, i32, I16);
        $macro_name!($linker, i32, i32, i32, I32);
        $macro_name!($linker, i64, i64, i64, I64);
        $macro_name!($linker, f32, f32, f32, F32);
        $macro_name!($linker, f64, f64, f64, F64);
    };
}

// ---------------------------------------------------------------------
// Family 1: channel scalar read/write.
// ---------------------------------------------------------------------

macro_rules! channel_scalar_binding {
    ($linker:expr, $suffix:ident, $native:ty, $wasm:ty, $variant:ident) => {
        $linker.func_wrap(
            "env",
            concat!("channel_read_", stringify!($suffix)),
            |caller: Caller<'_, Bindings>, channel_id: u32| -> $wasm {
                let Some(node) = caller.data().node.clone() else {
                    return 0 as $wasm;
                };
                let (data, _time, _ok) = node.read_chan(ChannelKey(channel_id));
                data.at::<$native>(-1).map_or(0 as $wasm, |v| v as $wasm)
            },
        )?;
        $linker.func_wrap(
            "env",
            concat!("channel_write_", stringify!($suffix)),
            |caller: Caller<'_, Bindings>, channel_id: u32, value: $wasm| {
                let Some(node) = caller.data().node.clone() else {
                    return;
                };
                let mut data = Series::empty(Type::scalar(<$native as Element>::KIND));
                data.write(value as $native);
                let time = now_series(&caller.data().clock);
                node.write_chan(ChannelKey(channel_id), data, time);
            },
        )?;
    };
}

fn register_channel_scalar(linker: &mut Linker<Bindings>) -> wasmtime::Result<()> {
    for_each_numeric!(channel_scalar_binding, linker);
    Ok(())
}

// ---------------------------------------------------------------------
// Family 2: channel string read/write.
// ---------------------------------------------------------------------

fn register_channel_string(linker: &mut Linker<Bindings>) -> wasmtime::Result<()> {
    linker.func_wrap(
        "env",
        "channel_read_string",
        |caller: Caller<'_, Bindings>, channel_id: u32| -> u32 {
            let Some(node) = caller.data().node.clone() else {
                return 0;
            };
            let (data, _time, _ok) = node.read_chan(ChannelKey(channel_id));
            data.at_string(-1).map_or(0, |s| node.string_create(s.to_string()).0)
        },
    )?;
    linker.func_wrap(
        "env",
        "channel_write_string",
        |caller: Caller<'_, Bindings>, channel_id: u32, handle: u32| {
            let Some(node) = caller.data().node.clone() else {
                return;
            };
            if handle == 0 {
                return;
            }
            let Some(s) = node.string_get(StringHandle(handle)) else {
                return;
            };
            let data = Series::one_string(s);
            let time = now_series(&caller.data().clock);
            node.write_chan(ChannelKey(channel_id), data, time);
        },
    )?;
    Ok(())
}

// ---------------------------------------------------------------------
// Family 3: series create/set/index, scalar and series-series arithmetic,
// comparisons, state-scoped series load/store.
// ---------------------------------------------------------------------

macro_rules! scalar_binop {
    ($linker:expr, $suffix:ident, $wasm:ty, $name:literal, $rhs_on_left:expr, $check_zero_divisor:expr, $f:expr) => {
        $linker.func_wrap(
            "env",
            concat!("series_", $name, "_", stringify!($suffix)),
            |caller: Caller<'_, Bindings>, h: u32, scalar: $wasm| -> u32 {
                let Some(node) = caller.data().node.clone() else {
                    return 0;
                };
                if h == 0 {
                    return 0;
                }
                if $check_zero_divisor && scalar as f64 == 0.0 {
                    return 0;
                }
                let Some(series) = node.series_get(SeriesHandle(h)) else {
                    return 0;
                };
                let result = scalar_op(&series, scalar as f64, $rhs_on_left, $f);
                node.series_store(result).0
            },
        )?;
    };
}

macro_rules! series_series_binop {
    ($linker:expr, $suffix:ident, $name:literal, $f:expr) => {
        $linker.func_wrap(
            "env",
            concat!("series_series_", $name, "_", stringify!($suffix)),
            |caller: Caller<'_, Bindings>, h1: u32, h2: u32| -> u32 {
                let Some(node) = caller.data().node.clone() else {
                    return 0;
                };
                if h1 == 0 || h2 == 0 {
                    return 0;
                }
                let (Some(a), Some(b)) = (node.series_get(SeriesHandle(h1)), node.series_get(SeriesHandle(h2)))
                else {
                    return 0;
                };
                match std::panic::catch_unwind(AssertUnwindSafe(|| zip_numeric(&a, &b, $f))) {
                    Ok(result) => node.series_store(result).0,
                    Err(_) => {
                        caller.data().report(RuntimeError::WasmPanic {
                            node_key: Some(node.key().to_string()),
                            message: format!("series-series op {} requires equal length/kind", $name),
                        });
                        0
                    }
                }
            },
        )?;
    };
}

macro_rules! series_series_cmp {
    ($linker:expr, $suffix:ident, $name:literal, $f:expr) => {
        $linker.func_wrap(
            "env",
            concat!("series_series_", $name, "_", stringify!($suffix)),
            |caller: Caller<'_, Bindings>, h1: u32, h2: u32| -> u32 {
                let Some(node) = caller.data().node.clone() else {
                    return 0;
                };
                if h1 == 0 || h2 == 0 {
                    return 0;
                }
                let (Some(a), Some(b)) = (node.series_get(SeriesHandle(h1)), node.series_get(SeriesHandle(h2)))
                else {
                    return 0;
                };
                match std::panic::catch_unwind(AssertUnwindSafe(|| compare(&a, &b, $f))) {
                    Ok(result) => node.series_store(result).0,
                    Err(_) => {
                        caller.data().report(RuntimeError::WasmPanic {
                            node_key: Some(node.key().to_string()),
                            message: format!("series-series comparison {} requires equal length", $name),
                        });
                        0
                    }
                }
            },
        )?;
    };
}

macro_rules! series_scalar_cmp {
    ($linker:expr, $suffix:ident, $native:ty, $wasm:ty, $name:literal, $f:expr) => {
        $linker.func_wrap(
            "env",
            concat!("series_scalar_", $name, "_", stringify!($suffix)),
            |caller: Caller<'_, Bindings>, h: u32, scalar: $wasm| -> u32 {
                let Some(node) = caller.data().node.clone() else {
                    return 0;
                };
                if h == 0 {
                    return 0;
                }
                let Some(series) = node.series_get(SeriesHandle(h)) else {
                    return 0;
                };
                let mut out = Series::empty(Type::scalar(Kind::U8));
                for i in 0..series.len() {
                    let Some(v) = series.at::<$native>(i as isize) else {
                        break;
                    };
                    out.write(u8::from($f(v as f64, scalar as f64)));
                }
                node.series_store(out).0
            },
        )?;
    };
}

macro_rules! series_ops_binding {
    ($linker:expr, $suffix:ident, $native:ty, $wasm:ty, $variant:ident) => {
        $linker.func_wrap(
            "env",
            concat!("series_create_empty_", stringify!($suffix)),
            |caller: Caller<'_, Bindings>, length: i32| -> u32 {
                let Some(node) = caller.data().node.clone() else {
                    return 0;
                };
                let mut s = Series::empty(Type::scalar(<$native as Element>::KIND));
                s.resize(length.max(0) as usize);
                node.series_store(s).0
            },
        )?;
        $linker.func_wrap(
            "env",
            concat!("series_set_element_", stringify!($suffix)),
            |caller: Caller<'_, Bindings>, h: u32, index: i32, value: $wasm| {
                let Some(node) = caller.data().node.clone() else {
                    return;
                };
                if h == 0 || index < 0 {
                    return;
                }
                let handle = SeriesHandle(h);
                let Some(mut s) = node.series_get(handle) else {
                    return;
                };
                if let Some(v) = <$native as Element>::as_mut_vec(s.raw_mut()) {
                    if let Some(slot) = v.get_mut(index as usize) {
                        *slot = value as $native;
                    }
                }
                node.series_replace(handle, s);
            },
        )?;
        $linker.func_wrap(
            "env",
            concat!("series_index_", stringify!($suffix)),
            |caller: Caller<'_, Bindings>, h: u32, index: i32| -> $wasm {
                let Some(node) = caller.data().node.clone() else {
                    return 0 as $wasm;
                };
                if h == 0 {
                    return 0 as $wasm;
                }
                node.series_get(SeriesHandle(h))
                    .and_then(|s| s.at::<$native>(index as isize))
                    .map_or(0 as $wasm, |v| v as $wasm)
            },
        )?;
        scalar_binop!($linker, $suffix, $wasm, "add", false, false, |a, b| a + b);
        scalar_binop!($linker, $suffix, $wasm, "radd", true, false, |a, b| a + b);
        scalar_binop!($linker, $suffix, $wasm, "sub", false, false, |a, b| a - b);
        scalar_binop!($linker, $suffix, $wasm, "rsub", true, false, |a, b| a - b);
        scalar_binop!($linker, $suffix, $wasm, "mul", false, false, |a, b| a * b);
        scalar_binop!($linker, $suffix, $wasm, "rmul", true, false, |a, b| a * b);
        // The divisor is checked against zero before `scalar_op` is even
        // called (see `scalar_binop!`'s `$check_zero_divisor` arm), so these
        // closures never see `b == 0.0`.
        scalar_binop!($linker, $suffix, $wasm, "div", false, true, |a: f64, b: f64| a / b);
        scalar_binop!($linker, $suffix, $wasm, "rdiv", true, true, |a: f64, b: f64| a / b);
        scalar_binop!($linker, $suffix, $wasm, "mod", false, true, |a: f64, b: f64| a % b);
        scalar_binop!($linker, $suffix, $wasm, "rmod", true, true, |a: f64, b: f64| a % b);
        series_series_binop!($linker, $suffix, "add", |a, b| a + b);
        series_series_binop!($linker, $suffix, "sub", |a, b| a - b);
        series_series_binop!($linker, $suffix, "mul", |a, b| a * b);
        series_series_binop!($linker, $suffix, "div", |a: f64, b: f64| if b == 0.0 { 0.0 } else { a / b });
        series_series_binop!($linker, $suffix, "mod", |a: f64, b: f64| if b == 0.0 { 0.0 } else { a % b });
        series_series_cmp!($linker, $suffix, "eq", |a, b| (a - b).abs() < f64::EPSILON);
        series_series_cmp!($linker, $suffix, "ne", |a, b| (a - b).abs() >= f64::EPSILON);
        series_series_cmp!($linker, $suffix, "lt", |a, b| a < b);
        series_series_cmp!($linker, $suffix, "le", |a, b| a <= b);
        series_series_cmp!($linker, $suffix, "gt", |a, b| a > b);
        series_series_cmp!($linker, $suffix, "ge", |a, b| a >= b);
        series_scalar_cmp!($linker, $suffix, $native, $wasm, "eq", |a: f64, b: f64| (a - b).abs() < f64::EPSILON);
        series_scalar_cmp!($linker, $suffix, $native, $wasm, "ne", |a: f64, b: f64| (a - b).abs() >= f64::EPSILON);
        series_scalar_cmp!($linker, $suffix, $native, $wasm, "lt", |a: f64, b: f64| a < b);
        series_scalar_cmp!($linker, $suffix, $native, $wasm, "le", |a: f64, b: f64| a <= b);
        series_scalar_cmp!($linker, $suffix, $native, $wasm, "gt", |a: f64, b: f64| a > b);
        series_scalar_cmp!($linker, $suffix, $native, $wasm, "ge", |a: f64, b: f64| a >= b);
        $linker.func_wrap(
            "env",
            concat!("series_state_load_", stringify!($suffix)),
            |caller: Caller<'_, Bindings>, var_id: u32, init: u32| -> u32 {
                let Some(node) = caller.data().node.clone() else {
                    return 0;
                };
                node.load_var_series(var_id, SeriesHandle(init)).0
            },
        )?;
        $linker.func_wrap(
            "env",
            concat!("series_state_store_", stringify!($suffix)),
            |caller: Caller<'_, Bindings>, var_id: u32, handle: u32| {
                let Some(node) = caller.data().node.clone() else {
                    return;
                };
                node.store_var_series(var_id, SeriesHandle(handle));
            },
        )?;
    };
}

fn register_series_ops(linker: &mut Linker<Bindings>) -> wasmtime::Result<()> {
    for_each_numeric!(series_ops_binding, linker);
    Ok(())
}

// ---------------------------------------------------------------------
// Family 4: series unary ops.
// ---------------------------------------------------------------------

macro_rules! series_negate_binding {
    ($linker:expr, $suffix:ident) => {
        $linker.func_wrap(
            "env",
            concat!("series_negate_", stringify!($suffix)),
            |caller: Caller<'_, Bindings>, h: u32| -> u32 {
                let Some(node) = caller.data().node.clone() else {
                    return 0;
                };
                if h == 0 {
                    return 0;
                }
                node.series_get(SeriesHandle(h))
                    .map_or(0, |s| node.series_store(negate(&s)).0)
            },
        )?;
    };
}

fn register_series_unary(linker: &mut Linker<Bindings>) -> wasmtime::Result<()> {
    series_negate_binding!(linker, i8);
    series_negate_binding!(linker, i16);
    series_negate_binding!(linker, i32);
    series_negate_binding!(linker, i64);
    series_negate_binding!(linker, f32);
    series_negate_binding!(linker, f64);
    linker.func_wrap(
        "env",
        "series_not_u8",
        |caller: Caller<'_, Bindings>, h: u32| -> u32 {
            let Some(node) = caller.data().node.clone() else {
                return 0;
            };
            if h == 0 {
                return 0;
            }
            node.series_get(SeriesHandle(h)).map_or(0, |s| node.series_store(not_u8(&s)).0)
        },
    )?;
    Ok(())
}

// ---------------------------------------------------------------------
// Family 5: state scalar load/store (plus the string variant).
// ---------------------------------------------------------------------

macro_rules! state_scalar_binding {
    ($linker:expr, $suffix:ident, $native:ty, $wasm:ty, $variant:ident) => {
        $linker.func_wrap(
            "env",
            concat!("state_load_", stringify!($suffix)),
            |caller: Caller<'_, Bindings>, var_id: u32, init: $wasm| -> $wasm {
                let Some(node) = caller.data().node.clone() else {
                    return 0 as $wasm;
                };
                match node.load_var(var_id, Sample::$variant(init as $native)) {
                    Sample::$variant(v) => v as $wasm,
                    _ => 0 as $wasm,
                }
            },
        )?;
        $linker.func_wrap(
            "env",
            concat!("state_store_", stringify!($suffix)),
            |caller: Caller<'_, Bindings>, var_id: u32, value: $wasm| {
                let Some(node) = caller.data().node.clone() else {
                    return;
                };
                node.store_var(var_id, Sample::$variant(value as $native));
            },
        )?;
    };
}

fn register_state_scalar(linker: &mut Linker<Bindings>) -> wasmtime::Result<()> {
    for_each_numeric!(state_scalar_binding, linker);
    linker.func_wrap(
        "env",
        "state_load_string",
        |caller: Caller<'_, Bindings>, var_id: u32, init: u32| -> u32 {
            let Some(node) = caller.data().node.clone() else {
                return 0;
            };
            node.load_var_string(var_id, StringHandle(init)).0
        },
    )?;
    linker.func_wrap(
        "env",
        "state_store_string",
        |caller: Caller<'_, Bindings>, var_id: u32, handle: u32| {
            let Some(node) = caller.data().node.clone() else {
                return;
            };
            node.store_var_string(var_id, StringHandle(handle));
        },
    )?;
    Ok(())
}

// ---------------------------------------------------------------------
// Family 6: series length and slicing.
// ---------------------------------------------------------------------

fn register_series_len_slice(linker: &mut Linker<Bindings>) -> wasmtime::Result<()> {
    linker.func_wrap("env", "series_len", |caller: Caller<'_, Bindings>, h: u32| -> u64 {
        let Some(node) = caller.data().node.clone() else {
            return 0;
        };
        if h == 0 {
            return 0;
        }
        node.series_get(SeriesHandle(h)).map_or(0, |s| s.len() as u64)
    })?;
    linker.func_wrap(
        "env",
        "series_slice",
        |caller: Caller<'_, Bindings>, h: u32, start: u32, end: u32| -> u32 {
            let Some(node) = caller.data().node.clone() else {
                return 0;
            };
            if h == 0 {
                return 0;
            }
            let Some(series) = node.series_get(SeriesHandle(h)) else {
                return 0;
            };
            series
                .slice(start as usize, end as usize)
                .map_or(0, |sliced| node.series_store(sliced).0)
        },
    )?;
    Ok(())
}

// ---------------------------------------------------------------------
// Family 7: string ops.
// ---------------------------------------------------------------------

fn register_string_ops(linker: &mut Linker<Bindings>) -> wasmtime::Result<()> {
    linker.func_wrap(
        "env",
        "string_from_literal",
        |mut caller: Caller<'_, Bindings>, ptr: u32, len: u32| -> u32 {
            let Some(node) = caller.data().node.clone() else {
                return 0;
            };
            let Some(memory) = caller.data().memory else {
                return 0;
            };
            let start = ptr as usize;
            let Some(end) = start.checked_add(len as usize) else {
                return 0;
            };
            let bytes = memory.data(&mut caller);
            if end > bytes.len() {
                return 0;
            }
            node.string_from_memory(&bytes[start..end]).0
        },
    )?;
    linker.func_wrap(
        "env",
        "string_concat",
        |caller: Caller<'_, Bindings>, h1: u32, h2: u32| -> u32 {
            let Some(node) = caller.data().node.clone() else {
                return 0;
            };
            let a = node.string_get(StringHandle(h1)).unwrap_or_default();
            let b = node.string_get(StringHandle(h2)).unwrap_or_default();
            node.string_create(format!("{a}{b}")).0
        },
    )?;
    linker.func_wrap(
        "env",
        "string_equal",
        |caller: Caller<'_, Bindings>, h1: u32, h2: u32| -> u32 {
            let Some(node) = caller.data().node.clone() else {
                return 0;
            };
            let a = node.string_get(StringHandle(h1));
            let b = node.string_get(StringHandle(h2));
            u32::from(a == b)
        },
    )?;
    linker.func_wrap("env", "string_len", |caller: Caller<'_, Bindings>, h: u32| -> u32 {
        let Some(node) = caller.data().node.clone() else {
            return 0;
        };
        node.string_get(StringHandle(h)).map_or(0, |s| s.len() as u32)
    })?;
    linker.func_wrap("env", "len", |caller: Caller<'_, Bindings>, h: u32| -> u64 {
        let Some(node) = caller.data().node.clone() else {
            return 0;
        };
        u64::from(node.string_get(StringHandle(h)).map_or(0, |s| s.len() as u32))
    })?;
    Ok(())
}

// ---------------------------------------------------------------------
// Family 8: misc (now, math_pow, panic).
// ---------------------------------------------------------------------

macro_rules! math_pow_float {
    ($linker:expr, $suffix:ident, $native:ty) => {
        $linker.func_wrap(
            "env",
            concat!("math_pow_", stringify!($suffix)),
            |base: $native, exp: $native| -> $native { base.powf(exp) },
        )?;
    };
}

macro_rules! math_pow_int {
    ($linker:expr, $suffix:ident, $native:ty, $wasm:ty) => {
        $linker.func_wrap(
            "env",
            concat!("math_pow_", stringify!($suffix)),
            |base: $wasm, exp: $wasm| -> $wasm {
                if exp == 0 {
                    return 1 as $wasm;
                }
                let mut acc: $native = 1 as $native;
                let b = base as $native;
                for _ in 0..(exp as u32) {
                    acc = acc.wrapping_mul(b);
                }
                acc as $wasm
            },
        )?;
    };
}

fn register_misc(linker: &mut Linker<Bindings>) -> wasmtime::Result<()> {
    linker.func_wrap("env", "now", |caller: Caller<'_, Bindings>| -> u64 {
        caller.data().clock.now().max(0) as u64
    })?;

    math_pow_float!(linker, f32, f32);
    math_pow_float!(linker, f64, f64);
    math_pow_int!(linker, u8, u8, i32);
    math_pow_int!(linker, u16, u16, i32);
    math_pow_int!(linker, u32, u32, i32);
    math_pow_int!(linker, u64, u64, i64);
    math_pow_int!(linker, i8, i8, i32);
    math_pow_int!(linker, i16, i16, i32);
    math_pow_int!(linker, i32, i32, i32);
    math_pow_int!(linker, i64, i64, i64);

    linker.func_wrap(
        "env",
        "panic",
        |mut caller: Caller<'_, Bindings>, ptr: u32, len: u32| -> wasmtime::Result<()> {
            let memory = caller.data().memory;
            let message = memory
                .and_then(|m| {
                    let start = ptr as usize;
                    let end = start.checked_add(len as usize)?;
                    let bytes = m.data(&mut caller);
                    (end <= bytes.len()).then(|| String::from_utf8_lossy(&bytes[start..end]).into_owned())
                })
                .unwrap_or_else(|| "<unreadable panic message>".to_string());
            // Trap rather than `report` here: `panic()` is the one binding
            // that does throw across the WASM boundary (the call traps),
            // and the caller of `call_function` converts that into the
            // fatal `wasm_panic` it dispatches to its own handler. Reporting
            // here too would double-dispatch the same condition.
            Err(wasmtime::Error::msg(message))
        },
    )?;
    Ok(())
}
