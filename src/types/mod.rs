//! Scalar kinds, dimensioned units, time-tagged series, and the wire IR schema.
//!
//! - [`kind`]: the `Kind` scalar-type tag
//! - [`dimensions`]: `Dimensions` and `Unit`, for dimensional analysis over numeric channels
//! - [`ty`]: `Type`, the recursive `{kind, elem, unit}` type descriptor
//! - [`handle`]: `Handle`, `ChannelKey`, and the 32-bit handle-table identifier
//! - [`series`]: `Series` and `MultiSeries`, the sample buffers moved through the runtime
//! - [`ir`]: the wire intermediate-representation schema produced by the Arc compiler

pub mod dimensions;
pub mod handle;
pub mod ir;
pub mod kind;
pub mod series;
pub mod ty;

pub use dimensions::{Dimensions, Unit};
pub use handle::{ChannelKey, Handle, SeriesHandle, StringHandle};
pub use ir::{Edge, Function, IrModule, Node as IrNode, Param};
pub use kind::Kind;
pub use series::{MultiSeries, Sample, Series};
pub use ty::Type;
