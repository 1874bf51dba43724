//! Rehearse Core - the interception layer
//!
//! Decides per call whether rehearsal is in effect and, when it is, runs
//! the marked operation inside a begin/force-rollback transaction bracket:
//! - activation comes from the thread marker (work continuing on a
//!   propagated unit) or from an inbound request signal
//! - the transactional resource is resolved by name, then by the
//!   conventional default name, then by unique instance
//! - rollback runs exactly once on every exit path; rollback failures are
//!   logged, never surfaced over the operation's own outcome
//!
//! # Example
//!
//! ```rust,ignore
//! use rehearse_core::{ManagerRegistry, OperationOptions, RehearsalConfig, RehearsalInterceptor};
//! use std::sync::Arc;
//!
//! let registry = Arc::new(ManagerRegistry::new());
//! registry.insert("default", my_transaction_manager);
//!
//! let interceptor = RehearsalInterceptor::new(RehearsalConfig::new(), registry);
//! let outcome = interceptor.intercept(
//!     "place-order",
//!     &OperationOptions::new(),
//!     Some("true"),
//!     || place_order(&request),
//! );
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod interceptor;
pub mod signal;
pub mod transaction;

pub use config::{OperationOptions, RehearsalConfig};
pub use error::{ResolutionError, TransactionError};
pub use interceptor::RehearsalInterceptor;
pub use signal::{is_truthy, SignalSource};
pub use transaction::{
    ManagerRegistry, TransactionDefinition, TransactionManager, TransactionStatus,
    DEFAULT_MANAGER_NAME,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Rehearse
    pub use crate::{
        ManagerRegistry, OperationOptions, RehearsalConfig, RehearsalInterceptor, SignalSource,
        TransactionDefinition, TransactionManager, TransactionStatus,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
