//! Persistence boundary for machine state.
//!
//! The engine reads the current state of an entity before every
//! orchestration call and writes the new state after a successful
//! transition. Storage itself lives behind [`PersistenceAdapter`]; the core
//! performs no locking, so an adapter that must prevent lost updates between
//! concurrent callers for one identifier has to serialize them itself.
//!
//! Two adapters are provided:
//!
//! - [`MemoryAdapter`]: process-local map, with snapshots via
//!   [`checkpoint`](crate::checkpoint)
//! - [`KeyValueAdapter`]: stores state and history in an injected
//!   [`KeyValueStore`] handle

mod kv;
mod memory;

pub use kv::{KeyValueAdapter, KeyValueStore, MemoryStore};
pub use memory::{MemoryAdapter, StoredEntity};

use crate::core::{Identifier, StateHistory, TransitionRecord};
use thiserror::Error;

/// Errors raised by persistence adapters.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage lock poisoned")]
    Poisoned,

    #[error("failed to encode or decode stored data: {0}")]
    Serialization(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Storage contract for machine state, keyed by [`Identifier`].
///
/// Calls are synchronous and not retried by the engine.
pub trait PersistenceAdapter: Send + Sync {
    /// The stored state, or `None` if nothing has been recorded.
    fn load_state(&self, identifier: &Identifier) -> Result<Option<String>, PersistenceError>;

    /// Record `state` as current after `record` was performed.
    ///
    /// Adapters may also append `record` to a history log.
    fn write_current_state(
        &self,
        identifier: &Identifier,
        state: &str,
        record: &TransitionRecord,
    ) -> Result<(), PersistenceError>;

    fn is_persisted(&self, identifier: &Identifier) -> Result<bool, PersistenceError>;

    /// Register a new entity in `initial_state`.
    ///
    /// Returns `false` without changing anything if it is already persisted.
    fn add(&self, identifier: &Identifier, initial_state: &str) -> Result<bool, PersistenceError>;

    /// The current state, falling back to `initial_state` when nothing has
    /// been recorded.
    fn read_current_state(
        &self,
        identifier: &Identifier,
        initial_state: &str,
    ) -> Result<String, PersistenceError> {
        Ok(self
            .load_state(identifier)?
            .unwrap_or_else(|| initial_state.to_string()))
    }

    /// Transitions performed so far. Adapters without a log return an empty
    /// history.
    fn history(&self, _identifier: &Identifier) -> Result<StateHistory, PersistenceError> {
        Ok(StateHistory::new())
    }
}

impl<A: PersistenceAdapter + ?Sized> PersistenceAdapter for std::sync::Arc<A> {
    fn load_state(&self, identifier: &Identifier) -> Result<Option<String>, PersistenceError> {
        (**self).load_state(identifier)
    }

    fn write_current_state(
        &self,
        identifier: &Identifier,
        state: &str,
        record: &TransitionRecord,
    ) -> Result<(), PersistenceError> {
        (**self).write_current_state(identifier, state, record)
    }

    fn is_persisted(&self, identifier: &Identifier) -> Result<bool, PersistenceError> {
        (**self).is_persisted(identifier)
    }

    fn add(&self, identifier: &Identifier, initial_state: &str) -> Result<bool, PersistenceError> {
        (**self).add(identifier, initial_state)
    }

    fn read_current_state(
        &self,
        identifier: &Identifier,
        initial_state: &str,
    ) -> Result<String, PersistenceError> {
        (**self).read_current_state(identifier, initial_state)
    }

    fn history(&self, identifier: &Identifier) -> Result<StateHistory, PersistenceError> {
        (**self).history(identifier)
    }
}
