//! Rehearsal propagation for futures
//!
//! Async tasks migrate between runtime worker threads at await points, so
//! a thread-local marker set once at spawn would be lost on the first
//! migration. [`Rehearsed`] captures the flag when the future is wrapped
//! and brackets every `poll` with an enter/exit pair, so the body
//! observes `is_active()` on whichever thread happens to be polling, and
//! no worker thread keeps the flag between polls.

use rehearse_context as context;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Future wrapper carrying a rehearsal snapshot taken at wrap time.
#[derive(Debug)]
pub struct Rehearsed<F> {
    inner: Pin<Box<F>>,
    snapshot: bool,
}

/// Exits the marker when a poll returns or unwinds.
struct PollGuard;

impl Drop for PollGuard {
    fn drop(&mut self) {
        context::exit();
    }
}

impl<F: Future> Future for Rehearsed<F> {
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if !this.snapshot {
            return this.inner.as_mut().poll(cx);
        }
        context::enter();
        let _guard = PollGuard;
        this.inner.as_mut().poll(cx)
    }
}

/// Extension adding rehearsal propagation to any future.
pub trait RehearseExt: Future + Sized {
    /// Capture the current thread's rehearsal flag and replay it around
    /// every poll of this future.
    ///
    /// Call on the submitting thread, before handing the future to
    /// `spawn`; wrapping inside the spawned task is too late, the flag is
    /// gone by then.
    fn propagate_rehearsal(self) -> Rehearsed<Self> {
        Rehearsed {
            snapshot: context::snapshot(),
            inner: Box::pin(self),
        }
    }
}

impl<F: Future + Sized> RehearseExt for F {}

#[cfg(test)]
mod tests {
    use super::*;

    async fn observe_across_yield() -> (bool, bool) {
        let before = context::is_active();
        tokio::task::yield_now().await;
        let after = context::is_active();
        (before, after)
    }

    #[tokio::test]
    async fn active_snapshot_covers_every_poll() {
        context::enter();
        let fut = observe_across_yield().propagate_rehearsal();
        context::exit();

        let (before, after) = tokio::spawn(fut).await.unwrap();
        assert!(before);
        assert!(after);
    }

    #[tokio::test]
    async fn inactive_snapshot_stays_inactive() {
        let (before, after) = tokio::spawn(observe_across_yield().propagate_rehearsal())
            .await
            .unwrap();
        assert!(!before);
        assert!(!after);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn runtime_threads_are_clean_between_polls() {
        context::enter();
        let fut = async {
            tokio::task::yield_now().await;
            context::is_active()
        }
        .propagate_rehearsal();
        context::exit();

        assert!(tokio::spawn(fut).await.unwrap());

        // A plain task on the same runtime must not see the flag.
        let stray = tokio::spawn(async { context::is_active() }).await.unwrap();
        assert!(!stray);
    }
}
