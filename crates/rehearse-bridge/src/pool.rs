//! Thread-backed worker pool with a task-wrapping hook
//!
//! Minimal fixed-size pool: jobs go through a crossbeam channel to a set
//! of worker threads. The part the rest of the crate cares about is the
//! hook: an optional [`TaskBridge`] applied to every job at submission
//! time, on the submitting thread, which is what lets a bridge capture
//! submitter-local state before the job crosses to a worker.

use crate::bridge::{Job, TaskBridge};
use crate::error::PoolError;
use crate::RehearsalBridge;
use crossbeam::channel::{self, Sender};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::thread::JoinHandle;

/// Fixed-size job pool with an optional task-wrapping hook.
pub struct WorkerPool {
    label: String,
    sender: Mutex<Option<Sender<Job>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    bridge: RwLock<Option<Arc<dyn TaskBridge>>>,
}

impl WorkerPool {
    /// Create a pool with `threads` workers and no hook.
    #[must_use]
    pub fn new(label: impl Into<String>, threads: usize) -> Self {
        let label = label.into();
        let (tx, rx) = channel::unbounded::<Job>();

        let workers = (0..threads.max(1))
            .map(|i| {
                let rx = rx.clone();
                let name = format!("{label}-worker-{i}");
                std::thread::Builder::new()
                    .name(name.clone())
                    .spawn(move || {
                        while let Ok(job) = rx.recv() {
                            // A panicking job must not take the worker down
                            // with it; report it and keep draining the queue.
                            let result =
                                std::panic::catch_unwind(std::panic::AssertUnwindSafe(job));
                            if result.is_err() {
                                tracing::error!(worker = %name, "job panicked");
                            }
                        }
                    })
                    .unwrap_or_else(|e| panic!("failed to spawn pool worker: {e}"))
            })
            .collect();

        Self {
            label,
            sender: Mutex::new(Some(tx)),
            workers: Mutex::new(workers),
            bridge: RwLock::new(None),
        }
    }

    /// Create a pool that arrives pre-wired with a [`RehearsalBridge`],
    /// for embedders that do not run a [`crate::PoolRegistrar`].
    #[must_use]
    pub fn with_rehearsal(label: impl Into<String>, threads: usize) -> Self {
        let pool = Self::new(label, threads);
        pool.set_task_bridge(Arc::new(RehearsalBridge::new()));
        pool
    }

    /// Pool label used in logs and errors.
    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Currently installed task-wrapping hook, if any.
    #[must_use]
    pub fn task_bridge(&self) -> Option<Arc<dyn TaskBridge>> {
        self.bridge.read().clone()
    }

    /// Replace the task-wrapping hook.
    pub fn set_task_bridge(&self, bridge: Arc<dyn TaskBridge>) {
        *self.bridge.write() = Some(bridge);
    }

    /// Submit a job.
    ///
    /// The hook, when present, rewrites the job here on the submitting
    /// thread; the rewritten job is what reaches a worker.
    pub fn execute(&self, job: impl FnOnce() + Send + 'static) -> Result<(), PoolError> {
        let job: Job = Box::new(job);
        let job = match self.task_bridge() {
            Some(bridge) => bridge.wrap(job),
            None => job,
        };

        let sender = self.sender.lock();
        let Some(tx) = sender.as_ref() else {
            return Err(PoolError::Shutdown(self.label.clone()));
        };
        tx.send(job)
            .map_err(|_| PoolError::QueueClosed(self.label.clone()))
    }

    /// Stop accepting work and wait for queued jobs to finish.
    pub fn shutdown(&self) {
        // Dropping the sender lets workers drain the queue and exit.
        self.sender.lock().take();
        let workers = std::mem::take(&mut *self.workers.lock());
        for worker in workers {
            if worker.join().is_err() {
                tracing::error!(pool = %self.label, "worker exited by panic");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("label", &self.label)
            .field("hooked", &self.bridge.read().is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rehearse_context as context;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::mpsc;

    #[test]
    fn runs_submitted_jobs() {
        let pool = WorkerPool::new("test", 2);
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..8 {
            let counter = Arc::clone(&counter);
            pool.execute(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }

        pool.shutdown();
        assert_eq!(counter.load(Ordering::SeqCst), 8);
    }

    #[test]
    fn execute_after_shutdown_fails() {
        let pool = WorkerPool::new("test", 1);
        pool.shutdown();
        let result = pool.execute(|| {});
        assert!(matches!(result, Err(PoolError::Shutdown(_))));
    }

    #[test]
    fn panicking_job_does_not_kill_the_pool() {
        let pool = WorkerPool::new("test", 1);
        let ran = Arc::new(AtomicBool::new(false));
        let seen = Arc::clone(&ran);

        pool.execute(|| panic!("boom")).unwrap();
        pool.execute(move || seen.store(true, Ordering::SeqCst)).unwrap();

        pool.shutdown();
        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn rehearsal_pool_propagates_marker_to_workers() {
        let pool = Arc::new(WorkerPool::with_rehearsal("test", 1));
        let (tx, rx) = mpsc::channel();

        let submit_pool = Arc::clone(&pool);
        std::thread::spawn(move || {
            context::enter();
            submit_pool
                .execute(move || {
                    tx.send(context::is_active()).unwrap();
                })
                .unwrap();
            context::exit();
        })
        .join()
        .unwrap();

        assert!(rx.recv().unwrap());
        pool.shutdown();
    }

    #[test]
    fn worker_is_clean_after_rehearsal_job() {
        let pool = Arc::new(WorkerPool::with_rehearsal("test", 1));
        let (tx, rx) = mpsc::channel();

        // First job runs in rehearsal, second (from a plain thread) must not
        // observe leftovers on the reused worker.
        let submit_pool = Arc::clone(&pool);
        std::thread::spawn(move || {
            context::enter();
            submit_pool.execute(|| {}).unwrap();
            context::exit();
        })
        .join()
        .unwrap();

        pool.execute(move || {
            tx.send(context::is_active()).unwrap();
        })
        .unwrap();

        assert!(!rx.recv().unwrap());
        pool.shutdown();
    }
}
