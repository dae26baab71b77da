//! Arc runtime core: a soft real-time dataflow runtime for compiled Arc stages.
//!
//! # Overview
//!
//! Given an intermediate representation (IR) describing a dataflow graph and an
//! AOT-compiled WebAssembly module implementing its stages, this crate executes
//! the graph at a bounded tick rate: it moves telemetry samples between external
//! channels and graph nodes, and upholds the per-sample ordering and timing
//! contracts expected of control-loop software.
//!
//! The Arc source-language compiler, the network client that delivers frames and
//! accepts writes, rack/task orchestration, and CLI/persistence layers are all
//! treated as external collaborators and are out of scope here.
//!
//! # Module structure
//!
//! - [`types`]: scalar kinds, dimensioned units, `Series`, and the wire IR schema
//! - [`queue`]: SPSC rings paired with a platform notifier
//! - [`state`]: the state container (values, handle table, per-node variables)
//! - [`node`]: the node adapter and its temporal alignment algorithm
//! - [`wasm`]: the AOT WASM runtime and the host binding table
//! - [`exec`]: the execution loop (mode selection, wait/wake/watch)
//! - [`task`]: tick orchestration tying the above together
//! - [`errors`]: the hierarchical error taxonomy
//! - [`observability`]: log severity levels
//! - [`time`]: the clock abstraction used by `now()` and the execution loop
//!
//! # API stability
//!
//! This crate is pre-1.0. Public items should be treated as unstable.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_inception)]
#![allow(clippy::doc_markdown)]

pub mod errors;
pub mod exec;
pub mod node;
pub mod observability;
pub mod queue;
pub mod state;
pub mod task;
pub mod time;
pub mod types;
pub mod wasm;

#[cfg(any(test, feature = "test-internals"))]
pub mod test_utils;

pub use errors::{ErrorCode, Handler, RuntimeError};
pub use exec::{Breaker, Config as LoopConfig, ExecutionLoop, Mode, WakeReason};
pub use node::Node;
pub use queue::{Notifier, Spsc};
pub use state::State;
pub use task::Task;
pub use types::{ChannelKey, Dimensions, Handle, Kind, Series, Type, Unit};
