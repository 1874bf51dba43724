//! The around-interceptor for marked operations
//!
//! Wrap a call site with [`RehearsalInterceptor::intercept`] and the
//! operation either proceeds untouched (switch off, no activation) or
//! runs inside an isolated transaction that is forced back on every exit
//! path. The caller observes the same result or failure either way; the
//! only difference under rehearsal is that data mutations are undone.

use crate::config::{OperationOptions, RehearsalConfig};
use crate::signal::{is_truthy, SignalSource};
use crate::transaction::{
    ManagerRegistry, TransactionDefinition, TransactionManager, TransactionStatus,
};
use rehearse_context as context;
use std::sync::Arc;

/// Around-advice applying the rehearsal bracket to marked operations.
#[derive(Debug)]
pub struct RehearsalInterceptor {
    config: RehearsalConfig,
    registry: Arc<ManagerRegistry>,
}

/// Owns the rollback-and-exit obligation for one interception.
///
/// Dropping the guard runs the cleanup exactly once, whether the
/// operation returned, failed or unwound: the handle is taken out of the
/// guard, rolled back unless the resource already finalized it, and the
/// marker level entered by the interceptor is released.
struct RollbackGuard {
    manager: Arc<dyn TransactionManager>,
    status: Option<Box<dyn TransactionStatus>>,
    label: String,
    verbose: bool,
}

impl Drop for RollbackGuard {
    fn drop(&mut self) {
        if let Some(status) = self.status.take() {
            if status.is_completed() {
                tracing::debug!(transaction = %self.label, "already finalized, skipping rollback");
            } else {
                match self.manager.rollback(status) {
                    Ok(()) => {
                        if self.verbose {
                            tracing::info!(transaction = %self.label, "transaction rolled back");
                        }
                    }
                    // Never surfaced: the operation's own outcome stays
                    // the caller-visible one.
                    Err(e) => {
                        tracing::error!(transaction = %self.label, error = %e, "rollback failed");
                    }
                }
            }
        }
        context::exit();
    }
}

impl RehearsalInterceptor {
    /// Create an interceptor over a manager registry.
    #[must_use]
    pub fn new(config: RehearsalConfig, registry: Arc<ManagerRegistry>) -> Self {
        Self { config, registry }
    }

    /// Active configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &RehearsalConfig {
        &self.config
    }

    /// Run `op`, applying the rehearsal bracket when rehearsal is active.
    ///
    /// `signal` is the raw inbound value for the configured header, if
    /// the caller has one in scope; activation also comes from the thread
    /// marker, which covers work continuing on a propagated unit. The
    /// operation's result or error is returned unchanged in every branch.
    pub fn intercept<T, E, F>(
        &self,
        operation: &str,
        options: &OperationOptions,
        signal: Option<&str>,
        op: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if !self.config.enabled {
            return op();
        }

        if !self.rehearsal_requested(signal) {
            return op();
        }

        // Best effort: without a resolvable resource the call runs for
        // real rather than failing.
        let manager = match self.registry.resolve(&options.resource_name) {
            Ok(manager) => manager,
            Err(e) => {
                tracing::warn!(
                    operation,
                    error = %e,
                    "no transactional resource, downgrading to direct execution"
                );
                return op();
            }
        };

        if !options.propagate_to_children {
            tracing::debug!(operation, "child propagation disabled by operation options");
        }

        self.run_bracketed(operation, manager, op)
    }

    /// Like [`intercept`](Self::intercept), reading the signal from a
    /// request boundary keyed by the configured header name.
    pub fn intercept_with_source<T, E, F>(
        &self,
        operation: &str,
        options: &OperationOptions,
        source: &dyn SignalSource,
        op: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let signal = source.value(&self.config.header_name);
        self.intercept(operation, options, signal.as_deref(), op)
    }

    /// Marker first (propagated-unit case), inbound signal second.
    fn rehearsal_requested(&self, signal: Option<&str>) -> bool {
        if context::is_active() {
            if self.config.verbose_logging {
                tracing::info!("rehearsal marker already set, likely propagated from a parent");
            }
            return true;
        }
        match signal {
            Some(value) if is_truthy(value) => {
                if self.config.verbose_logging {
                    tracing::info!(header = %self.config.header_name, value, "rehearsal signal received");
                }
                true
            }
            _ => false,
        }
    }

    fn run_bracketed<T, E, F>(
        &self,
        operation: &str,
        manager: Arc<dyn TransactionManager>,
        op: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let label = format!("rehearsal-{operation}");

        // Own this nesting level for the duration of the bracket.
        context::enter();

        let status = match manager.begin(&TransactionDefinition::isolated(label.clone())) {
            Ok(status) => status,
            Err(e) => {
                context::exit();
                tracing::error!(
                    transaction = %label,
                    error = %e,
                    "begin failed, downgrading to direct execution"
                );
                return op();
            }
        };

        if self.config.verbose_logging {
            tracing::info!(transaction = %label, "transaction started");
        }

        let _guard = RollbackGuard {
            manager,
            status: Some(status),
            label,
            verbose: self.config.verbose_logging,
        };

        let result = op();
        if result.is_err() && self.config.verbose_logging {
            tracing::warn!(operation, "operation failed during rehearsal");
        }
        result
        // guard drops here: force rollback, then exit the marker
    }
}
