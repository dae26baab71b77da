//! Lock-free SPSC rings paired with a platform wake primitive.
//!
//! A ring moves `FrameUpdate`s into the runtime and `ChannelWrite`s back out,
//! without ever blocking the producer: `push`/`try_push` fail fast on a full
//! ring and the caller decides how to react (see [`crate::errors`]'s
//! `queue_full` codes). The consumer side may block efficiently between
//! items via the paired [`Notifier`].

pub mod notifier;
pub mod ring;

pub use notifier::Notifier;
pub use ring::Spsc;
