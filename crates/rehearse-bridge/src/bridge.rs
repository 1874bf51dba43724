//! Task bridge contract and the rehearsal implementation
//!
//! A bridge rewrites a deferred job so state travels from the submitting
//! thread to whichever thread eventually runs it. [`RehearsalBridge`]
//! moves exactly one bit: whether the submitter was in rehearsal when the
//! job was handed over.

use rehearse_context as context;

/// A deferred unit of work: zero arguments, side effects only.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Rewrites a job at submission time so context travels with it.
///
/// Bridges are shared as `Arc<dyn TaskBridge>`; identity comparisons
/// (deduplication in [`crate::CompositeBridge`], the registrar's no-op
/// checks) use `Arc::ptr_eq`, so a bridge that must be recognized later
/// has to be the same allocation, not a clone.
pub trait TaskBridge: Send + Sync + std::fmt::Debug {
    /// Wrap `job`, returning the replacement to hand to the executor.
    fn wrap(&self, job: Job) -> Job;

    /// Downcast hook used by the registrar to recognize composite chains.
    fn as_composite(&self) -> Option<&crate::CompositeBridge> {
        None
    }
}

/// Bridge that carries the rehearsal flag across the submission boundary.
///
/// The flag is read once, on the submitting thread, at wrap time. The
/// decision then travels with the job: if the submitter leaves rehearsal
/// before a queued job runs, the job still runs in rehearsal.
#[derive(Debug, Default)]
pub struct RehearsalBridge;

impl RehearsalBridge {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Restores the executing thread's marker when the job body returns or
/// unwinds.
struct ExitGuard;

impl Drop for ExitGuard {
    fn drop(&mut self) {
        context::exit();
        if context::is_active() {
            // The job body leaked an enter. Discard the counter so the
            // pooled thread starts its next job clean.
            tracing::warn!("rehearsal marker leaked by job body, force-clearing");
            context::force_clear();
        }
    }
}

impl TaskBridge for RehearsalBridge {
    fn wrap(&self, job: Job) -> Job {
        let snapshot = context::snapshot();
        if !snapshot {
            return job;
        }
        tracing::debug!("captured rehearsal flag for deferred job");
        Box::new(move || {
            context::enter();
            tracing::debug!("restored rehearsal flag on worker");
            let _guard = ExitGuard;
            job();
        })
    }
}
