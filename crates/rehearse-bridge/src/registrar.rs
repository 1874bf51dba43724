//! Idempotent bridge installation for worker pools
//!
//! An embedder building its own pools can forget to wire the rehearsal
//! bridge, and work submitted there would escape the dry-run. The
//! registrar closes that hole: point it at every pool as it is
//! constructed, and it ensures the pool's hook is, or is composed with,
//! the bridge, without ever discarding a hook the caller installed
//! themselves and without stacking duplicate layers on repeated runs.

use crate::bridge::TaskBridge;
use crate::composite::CompositeBridge;
use crate::pool::WorkerPool;
use crate::RehearsalBridge;
use std::sync::Arc;

/// Installs one bridge instance into pools, composing with existing hooks.
#[derive(Debug)]
pub struct PoolRegistrar {
    bridge: Arc<dyn TaskBridge>,
}

impl PoolRegistrar {
    /// Registrar for a caller-supplied bridge.
    #[must_use]
    pub fn new(bridge: Arc<dyn TaskBridge>) -> Self {
        Self { bridge }
    }

    /// Registrar for a fresh [`RehearsalBridge`].
    #[must_use]
    pub fn with_default() -> Self {
        Self::new(Arc::new(RehearsalBridge::new()))
    }

    /// The bridge this registrar installs.
    #[must_use]
    pub fn bridge(&self) -> Arc<dyn TaskBridge> {
        Arc::clone(&self.bridge)
    }

    /// Ensure `pool`'s hook includes this registrar's bridge.
    ///
    /// Safe to call any number of times against the same pool: already
    /// present (directly or inside a composite) means no-op. A foreign
    /// hook is preserved by composing `[existing, bridge]`, existing
    /// outermost, so the caller's own wrapping still runs.
    pub fn register(&self, pool: &WorkerPool) {
        match pool.task_bridge() {
            None => {
                pool.set_task_bridge(Arc::clone(&self.bridge));
                tracing::info!(pool = %pool.label(), "installed rehearsal bridge");
            }
            Some(existing) if Arc::ptr_eq(&existing, &self.bridge) => {
                tracing::debug!(pool = %pool.label(), "bridge already installed");
            }
            Some(existing) => match existing.as_composite() {
                Some(composite) if composite.contains(&self.bridge) => {
                    tracing::debug!(pool = %pool.label(), "composite already contains bridge");
                }
                Some(composite) => {
                    composite.add(Arc::clone(&self.bridge));
                    tracing::info!(pool = %pool.label(), "appended bridge to existing composite");
                }
                None => {
                    let composite = CompositeBridge::new();
                    composite.add(Arc::clone(&existing));
                    composite.add(Arc::clone(&self.bridge));
                    pool.set_task_bridge(Arc::new(composite));
                    tracing::info!(
                        pool = %pool.label(),
                        "composed bridge with existing hook"
                    );
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::Job;

    #[derive(Debug)]
    struct UserBridge;

    impl TaskBridge for UserBridge {
        fn wrap(&self, job: Job) -> Job {
            job
        }
    }

    fn composite_of(pool: &WorkerPool) -> Arc<dyn TaskBridge> {
        pool.task_bridge().unwrap()
    }

    #[test]
    fn installs_into_bare_pool() {
        let pool = WorkerPool::new("bare", 1);
        let registrar = PoolRegistrar::with_default();

        registrar.register(&pool);

        let hook = composite_of(&pool);
        assert!(Arc::ptr_eq(&hook, &registrar.bridge()));
        pool.shutdown();
    }

    #[test]
    fn repeated_registration_is_a_noop() {
        let pool = WorkerPool::new("repeat", 1);
        let registrar = PoolRegistrar::with_default();

        registrar.register(&pool);
        registrar.register(&pool);

        // Still the bare bridge, not a composite of two copies.
        let hook = composite_of(&pool);
        assert!(Arc::ptr_eq(&hook, &registrar.bridge()));
        pool.shutdown();
    }

    #[test]
    fn preserves_user_hook_by_composing() {
        let pool = WorkerPool::new("user", 1);
        let user: Arc<dyn TaskBridge> = Arc::new(UserBridge);
        pool.set_task_bridge(Arc::clone(&user));

        let registrar = PoolRegistrar::with_default();
        registrar.register(&pool);

        let hook = composite_of(&pool);
        let composite = hook.as_composite().expect("hook should be a composite");
        assert_eq!(composite.len(), 2);
        assert!(composite.contains(&user));
        assert!(composite.contains(&registrar.bridge()));
        pool.shutdown();
    }

    #[test]
    fn registration_after_composing_is_a_noop() {
        let pool = WorkerPool::new("composed", 1);
        pool.set_task_bridge(Arc::new(UserBridge));

        let registrar = PoolRegistrar::with_default();
        registrar.register(&pool);
        registrar.register(&pool);
        registrar.register(&pool);

        let hook = composite_of(&pool);
        assert_eq!(hook.as_composite().unwrap().len(), 2);
        pool.shutdown();
    }

    #[test]
    fn appends_to_foreign_composite() {
        let pool = WorkerPool::new("foreign", 1);
        let foreign = CompositeBridge::new();
        foreign.add(Arc::new(UserBridge));
        pool.set_task_bridge(Arc::new(foreign));

        let registrar = PoolRegistrar::with_default();
        registrar.register(&pool);

        let hook = composite_of(&pool);
        let composite = hook.as_composite().unwrap();
        assert_eq!(composite.len(), 2);
        assert!(composite.contains(&registrar.bridge()));
        pool.shutdown();
    }
}
