//! Error types for pool submission

/// Worker pool errors
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// Pool has been shut down; job was not accepted
    #[error("pool '{0}' is shut down")]
    Shutdown(String),

    /// Job queue is no longer accepting work
    #[error("pool '{0}' queue is closed")]
    QueueClosed(String),
}
