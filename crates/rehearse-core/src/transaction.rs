//! Transactional resource boundary and name registry
//!
//! The interceptor only needs begin, rollback and a completion check; any
//! begin/rollback-capable resource (a database transaction, a unit of
//! work) plugs in behind [`TransactionManager`]. Managers are registered
//! under names in a [`ManagerRegistry`], and resolution follows a fixed
//! order: explicit name, then the conventional default name, then the
//! single registered instance.

use crate::error::{ResolutionError, TransactionError};
use dashmap::DashMap;
use std::sync::Arc;

/// Conventional registry name tried when an operation names no resource.
pub const DEFAULT_MANAGER_NAME: &str = "default";

/// Parameters for starting a rehearsal transaction.
#[derive(Debug, Clone)]
pub struct TransactionDefinition {
    /// Human-readable label, surfaced in resource diagnostics.
    pub name: String,
    /// Start an independent transaction rather than joining an ambient
    /// one. The interceptor always sets this: a rehearsal rollback must
    /// never undo or be committed by surrounding work.
    pub isolated: bool,
}

impl TransactionDefinition {
    /// Isolated definition with the given label.
    #[must_use]
    pub fn isolated(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            isolated: true,
        }
    }
}

/// Live transaction handle returned by [`TransactionManager::begin`].
pub trait TransactionStatus: Send {
    /// Whether the transaction has already been finalized (committed or
    /// rolled back) by the resource itself.
    fn is_completed(&self) -> bool;
}

/// A begin/rollback-capable transactional resource.
pub trait TransactionManager: Send + Sync {
    /// Start a transaction per `definition`.
    fn begin(
        &self,
        definition: &TransactionDefinition,
    ) -> Result<Box<dyn TransactionStatus>, TransactionError>;

    /// Roll `status` back, consuming the handle.
    fn rollback(&self, status: Box<dyn TransactionStatus>) -> Result<(), TransactionError>;
}

/// Named registry of transaction managers.
#[derive(Default)]
pub struct ManagerRegistry {
    managers: DashMap<String, Arc<dyn TransactionManager>>,
}

impl ManagerRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a manager under `name`, replacing any previous entry.
    pub fn insert(&self, name: impl Into<String>, manager: Arc<dyn TransactionManager>) {
        self.managers.insert(name.into(), manager);
    }

    /// Look a manager up by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn TransactionManager>> {
        self.managers.get(name).map(|entry| Arc::clone(&entry))
    }

    /// Number of registered managers.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.managers.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }

    /// Resolve the manager for an operation.
    ///
    /// Order: an explicit non-empty `name` must match exactly (a miss is
    /// an error, not a fallthrough); otherwise the
    /// [`DEFAULT_MANAGER_NAME`] entry wins if present; otherwise a single
    /// registered manager is unambiguous and used. Empty and
    /// multiple-candidate registries fail with distinct errors.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn TransactionManager>, ResolutionError> {
        if !name.is_empty() {
            return self
                .get(name)
                .ok_or_else(|| ResolutionError::ManagerNotFound(name.to_string()));
        }

        if let Some(manager) = self.get(DEFAULT_MANAGER_NAME) {
            return Ok(manager);
        }

        match self.managers.len() {
            0 => Err(ResolutionError::NoManagerRegistered),
            1 => {
                let entry = self
                    .managers
                    .iter()
                    .next()
                    .ok_or(ResolutionError::NoManagerRegistered)?;
                Ok(Arc::clone(entry.value()))
            }
            n => Err(ResolutionError::AmbiguousManager(n)),
        }
    }
}

impl std::fmt::Debug for ManagerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.managers.iter().map(|e| e.key().clone()).collect();
        f.debug_struct("ManagerRegistry").field("names", &names).finish()
    }
}
