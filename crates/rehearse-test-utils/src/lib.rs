//! Testing utilities for the rehearse workspace
//!
//! Shared fixtures: a recording transaction manager with injectable
//! failure modes, and a static signal source.

#![allow(missing_docs)]

use parking_lot::Mutex;
use rehearse_core::{
    SignalSource, TransactionDefinition, TransactionError, TransactionManager, TransactionStatus,
};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Transaction manager that records every begin and rollback.
///
/// Failure modes are injected at construction time with the
/// `failing_*`/`completing_*` builders; a failed rollback is not counted
/// as a rollback.
#[derive(Debug, Default)]
pub struct RecordingManager {
    begun: AtomicUsize,
    rolled_back: AtomicUsize,
    fail_begin: bool,
    fail_rollback: bool,
    complete_on_begin: bool,
    last_definition: Mutex<Option<TransactionDefinition>>,
}

#[derive(Debug)]
struct RecordingStatus {
    completed: bool,
}

impl TransactionStatus for RecordingStatus {
    fn is_completed(&self) -> bool {
        self.completed
    }
}

impl RecordingManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `begin` call fails.
    #[must_use]
    pub fn failing_begin(mut self) -> Self {
        self.fail_begin = true;
        self
    }

    /// Every `rollback` call fails.
    #[must_use]
    pub fn failing_rollback(mut self) -> Self {
        self.fail_rollback = true;
        self
    }

    /// Handles come back already finalized, as if the resource completed
    /// the transaction itself.
    #[must_use]
    pub fn completing_on_begin(mut self) -> Self {
        self.complete_on_begin = true;
        self
    }

    pub fn begun(&self) -> usize {
        self.begun.load(Ordering::SeqCst)
    }

    pub fn rolled_back(&self) -> usize {
        self.rolled_back.load(Ordering::SeqCst)
    }

    /// Definition passed to the most recent `begin`.
    pub fn last_definition(&self) -> Option<TransactionDefinition> {
        self.last_definition.lock().clone()
    }
}

impl TransactionManager for RecordingManager {
    fn begin(
        &self,
        definition: &TransactionDefinition,
    ) -> Result<Box<dyn TransactionStatus>, TransactionError> {
        if self.fail_begin {
            return Err(TransactionError::BeginFailed("injected".to_string()));
        }
        *self.last_definition.lock() = Some(definition.clone());
        self.begun.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(RecordingStatus {
            completed: self.complete_on_begin,
        }))
    }

    fn rollback(&self, _status: Box<dyn TransactionStatus>) -> Result<(), TransactionError> {
        if self.fail_rollback {
            return Err(TransactionError::RollbackFailed("injected".to_string()));
        }
        self.rolled_back.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Signal source holding one fixed key/value pair.
#[derive(Debug, Clone)]
pub struct StaticSignal {
    key: String,
    value: String,
}

impl StaticSignal {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl SignalSource for StaticSignal {
    fn value(&self, key: &str) -> Option<String> {
        (key == self.key).then(|| self.value.clone())
    }
}

/// Signal source modeling a call with no request in scope.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSignal;

impl SignalSource for NoSignal {
    fn value(&self, _key: &str) -> Option<String> {
        None
    }
}
