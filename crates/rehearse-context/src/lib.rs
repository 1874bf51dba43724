//! Rehearsal Context - per-thread dry-run marker
//!
//! Holds the rehearsal flag for the current execution unit as a nesting
//! depth counter:
//! - `enter`/`exit` pairs adjust the depth like a non-negative semaphore
//! - `is_active` is true iff depth > 0
//! - the backing counter is discarded when depth returns to 0, so a pooled
//!   worker thread carries no residual state into its next job
//!
//! The counter is strictly thread-local. Crossing an execution-unit
//! boundary always goes through a value copy ([`snapshot`] on the parent,
//! a fresh `enter` on the child), never a shared reference. Sharing one
//! counter between two units reintroduces the cross-unit leakage this
//! crate exists to prevent.
//!
//! # Example
//!
//! ```rust
//! use rehearse_context as context;
//!
//! assert!(!context::is_active());
//! context::enter();
//! assert!(context::is_active());
//! context::exit();
//! assert!(!context::is_active());
//! ```

#![warn(unreachable_pub)]

pub mod spawn;

pub use spawn::spawn_inheriting;

use std::cell::Cell;
use std::num::NonZeroUsize;

thread_local! {
    /// Depth counter for the current thread.
    ///
    /// `None` means no counter is allocated (depth 0). The counter only
    /// exists while depth > 0, which keeps `exit` clamping and reuse
    /// hygiene in one representation: reaching 0 *is* the release.
    static DEPTH: Cell<Option<NonZeroUsize>> = const { Cell::new(None) };
}

/// Enter rehearsal on the calling thread, incrementing the nesting depth.
///
/// Lazily allocates the backing counter on the first enter since depth
/// was last 0. Always succeeds.
pub fn enter() {
    DEPTH.with(|depth| {
        let next = match depth.get() {
            Some(d) => d.saturating_add(1),
            None => NonZeroUsize::MIN,
        };
        depth.set(Some(next));
    });
}

/// Exit one rehearsal nesting level on the calling thread.
///
/// Decrements the depth; when it reaches 0 the backing counter is
/// released. Calling `exit` without a matching `enter` clamps: it
/// releases as if depth were already 0 and never panics, so failure-path
/// cleanup may call it unconditionally.
pub fn exit() {
    DEPTH.with(|depth| {
        let next = depth
            .get()
            .and_then(|d| NonZeroUsize::new(d.get() - 1));
        depth.set(next);
    });
}

/// Whether the calling thread is currently in rehearsal.
///
/// Pure read: never allocates counter state on a thread that never
/// called [`enter`].
#[inline]
#[must_use]
pub fn is_active() -> bool {
    DEPTH.with(|depth| depth.get().is_some())
}

/// Current nesting depth of the calling thread. 0 when not in rehearsal.
#[inline]
#[must_use]
pub fn depth() -> usize {
    DEPTH.with(|depth| depth.get().map_or(0, NonZeroUsize::get))
}

/// Snapshot of the rehearsal flag, taken when work is about to cross an
/// execution-unit boundary.
///
/// Alias for [`is_active`]; the name documents intent at call sites that
/// hand the value to another thread or task.
#[inline]
#[must_use]
pub fn snapshot() -> bool {
    is_active()
}

/// Unconditionally discard the calling thread's counter regardless of
/// depth.
///
/// Safety net for the propagation bridge's cleanup path only. Ordinary
/// nested callers must use [`exit`]: force-clearing inside a nested
/// section breaks the invariant an outer caller on the same thread is
/// relying on.
pub fn force_clear() {
    DEPTH.with(|depth| depth.set(None));
}

/// Initialize the calling thread's counter to an explicit depth.
///
/// Used by [`spawn::spawn_inheriting`] to replay a parent snapshot onto a
/// freshly spawned thread. A depth of 0 releases the counter.
pub(crate) fn seed(value: usize) {
    DEPTH.with(|depth| depth.set(NonZeroUsize::new(value)));
}

/// Compatibility shim for callers migrating from a boolean flag API.
///
/// `set(true)` maps to [`enter`], `set(false)` to [`exit`]. Mixing this
/// with explicit `enter`/`exit` pairs on the same nesting level can
/// decrement the counter below the number of outstanding enters; new code
/// uses the paired API directly.
#[deprecated(note = "use enter()/exit() pairs")]
pub fn set(active: bool) {
    if active {
        enter();
    } else {
        exit();
    }
}
