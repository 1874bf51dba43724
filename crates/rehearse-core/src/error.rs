//! Error types for the interception layer
//!
//! Two families with different recovery policies:
//! - resolution errors downgrade the call to direct execution
//! - transaction errors are logged at the rollback site and never surface
//!   over the operation's own result

/// Transactional resource failures reported by a manager.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// The resource could not start an isolated transaction
    #[error("begin failed: {0}")]
    BeginFailed(String),

    /// The resource failed to roll the transaction back
    #[error("rollback failed: {0}")]
    RollbackFailed(String),
}

/// Failure to resolve a transactional resource from the registry.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    /// An explicitly named manager is missing; distinct from the registry
    /// being empty so misconfiguration fails loudly
    #[error("no transaction manager named '{0}' is registered")]
    ManagerNotFound(String),

    /// Nothing is registered at all
    #[error("no transaction manager is registered")]
    NoManagerRegistered,

    /// Several managers, none carrying the default name
    #[error("{0} transaction managers registered and none is the default; name one explicitly")]
    AmbiguousManager(usize),
}
