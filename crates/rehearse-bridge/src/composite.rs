//! Ordered, identity-deduplicated bridge chain
//!
//! When both a framework bridge and a caller-supplied bridge must apply to
//! the same pool, neither may silently replace the other. The composite
//! keeps an ordered list and folds it over each job: first-added bridge
//! outermost, last-added innermost around the raw job.

use crate::bridge::{Job, TaskBridge};
use parking_lot::RwLock;
use std::sync::Arc;

/// Chain of bridges applied to every job submitted through one hook.
///
/// Registration is idempotent by identity: adding an `Arc` that is
/// already in the chain (same allocation) is a no-op, so a registrar
/// running twice against the same pool never double-wraps jobs.
#[derive(Debug, Default)]
pub struct CompositeBridge {
    bridges: RwLock<Vec<Arc<dyn TaskBridge>>>,
}

impl CompositeBridge {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `bridge` unless it is already present by identity.
    ///
    /// Returns whether the bridge was added.
    pub fn add(&self, bridge: Arc<dyn TaskBridge>) -> bool {
        let mut bridges = self.bridges.write();
        if bridges.iter().any(|b| Arc::ptr_eq(b, &bridge)) {
            return false;
        }
        bridges.push(bridge);
        true
    }

    /// Whether `bridge` is already in the chain (by identity).
    #[must_use]
    pub fn contains(&self, bridge: &Arc<dyn TaskBridge>) -> bool {
        self.bridges.read().iter().any(|b| Arc::ptr_eq(b, bridge))
    }

    /// Number of bridges in the chain.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bridges.read().len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bridges.read().is_empty()
    }
}

impl TaskBridge for CompositeBridge {
    /// Fold the chain from the end toward the start, each step wrapping
    /// the previous result: the last-added bridge ends up innermost
    /// around the raw job, the first-added outermost.
    fn wrap(&self, job: Job) -> Job {
        let bridges = self.bridges.read();
        bridges.iter().rev().fold(job, |wrapped, bridge| bridge.wrap(wrapped))
    }

    fn as_composite(&self) -> Option<&CompositeBridge> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records the order in which its pre-hook fires.
    #[derive(Debug)]
    struct ProbeBridge {
        tag: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
        applications: AtomicUsize,
    }

    impl ProbeBridge {
        fn new(tag: &'static str, log: Arc<Mutex<Vec<&'static str>>>) -> Arc<Self> {
            Arc::new(Self {
                tag,
                log,
                applications: AtomicUsize::new(0),
            })
        }
    }

    impl TaskBridge for ProbeBridge {
        fn wrap(&self, job: Job) -> Job {
            self.applications.fetch_add(1, Ordering::SeqCst);
            let tag = self.tag;
            let log = Arc::clone(&self.log);
            Box::new(move || {
                log.lock().unwrap().push(tag);
                job();
            })
        }
    }

    #[test]
    fn add_is_idempotent_by_identity() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let probe = ProbeBridge::new("a", Arc::clone(&log));
        let probe_dyn: Arc<dyn TaskBridge> = probe.clone();

        let composite = CompositeBridge::new();
        assert!(composite.add(Arc::clone(&probe_dyn)));
        assert!(!composite.add(Arc::clone(&probe_dyn)));
        assert_eq!(composite.len(), 1);
        assert!(composite.contains(&probe_dyn));

        // One application per wrapped job, despite the repeated add.
        composite.wrap(Box::new(|| {}))();
        assert_eq!(probe.applications.load(Ordering::SeqCst), 1);
        assert_eq!(log.lock().unwrap().as_slice(), ["a"]);
    }

    #[test]
    fn first_added_runs_outermost() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let outer = ProbeBridge::new("outer", Arc::clone(&log));
        let inner = ProbeBridge::new("inner", Arc::clone(&log));

        let composite = CompositeBridge::new();
        composite.add(outer);
        composite.add(inner);

        let run_log = Arc::clone(&log);
        composite.wrap(Box::new(move || run_log.lock().unwrap().push("job")))();

        assert_eq!(log.lock().unwrap().as_slice(), ["outer", "inner", "job"]);
    }

    #[test]
    fn empty_composite_passes_job_through() {
        let ran = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&ran);

        let composite = CompositeBridge::new();
        assert!(composite.is_empty());
        composite.wrap(Box::new(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        }))();
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn separate_allocation_is_not_contained() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let probe = ProbeBridge::new("a", log);
        let other: Arc<dyn TaskBridge> = Arc::new(crate::RehearsalBridge::new());

        let composite = CompositeBridge::new();
        composite.add(probe);
        assert!(!composite.contains(&other));
    }
}
