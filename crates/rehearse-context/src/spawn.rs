//! Copy-on-spawn thread helper
//!
//! Raw `std::thread::spawn` starts the child with an empty marker, so work
//! spawned from inside a rehearsal would silently run for real. This
//! module is the single code path for marker inheritance on raw spawns:
//! the child receives a *new* counter seeded with the parent's depth at
//! spawn time. A value copy, never a shared reference — two threads
//! decrementing one counter is exactly the race the marker design forbids.

use std::thread::{self, JoinHandle};

/// Releases the seeded counter when the child closure unwinds or returns.
struct SeedGuard;

impl Drop for SeedGuard {
    fn drop(&mut self) {
        crate::force_clear();
    }
}

/// Spawn a thread whose rehearsal marker starts at the parent's current
/// depth.
///
/// The snapshot is taken on the calling thread before the child starts,
/// so the child's state is fixed at spawn time: if the parent exits
/// rehearsal afterwards, the child still runs in rehearsal. The child's
/// counter is discarded when the closure finishes on any path.
pub fn spawn_inheriting<F, T>(f: F) -> JoinHandle<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let inherited = crate::depth();
    thread::spawn(move || {
        crate::seed(inherited);
        let _guard = SeedGuard;
        f()
    })
}
