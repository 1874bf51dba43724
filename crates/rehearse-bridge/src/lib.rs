//! Rehearse Bridge - marker propagation across execution units
//!
//! The marker in `rehearse-context` is thread-local, so it does not
//! survive a hop onto a worker pool or a spawned task by itself. This
//! crate carries it across:
//! - [`RehearsalBridge`] wraps a deferred job, capturing the flag at
//!   submission time and replaying it around execution
//! - [`CompositeBridge`] chains several bridges over one pool without any
//!   of them clobbering another
//! - [`WorkerPool`] is a thread-backed job pool with a task-wrapping hook
//! - [`PoolRegistrar`] installs the bridge into pools idempotently,
//!   composing with hooks the caller already set
//! - [`RehearseExt::propagate_rehearsal`] does the same for futures,
//!   bracketing every poll so tokio tasks see the flag on whichever
//!   worker thread runs them

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod bridge;
pub mod composite;
pub mod error;
pub mod future;
pub mod pool;
pub mod registrar;

pub use bridge::{Job, RehearsalBridge, TaskBridge};
pub use composite::CompositeBridge;
pub use error::PoolError;
pub use future::{Rehearsed, RehearseExt};
pub use pool::WorkerPool;
pub use registrar::PoolRegistrar;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
