//! Process-local persistence.

use super::{PersistenceAdapter, PersistenceError};
use crate::core::{Identifier, StateHistory, TransitionRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Stored state and history of one identifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredEntity {
    pub state: String,
    pub history: StateHistory,
}

/// Keeps state in a map guarded by a mutex.
///
/// Each call holds the lock only for its own duration; a read followed by a
/// write from two callers can still interleave.
///
/// # Example
///
/// ```rust
/// use switchyard::core::Identifier;
/// use switchyard::persistence::{MemoryAdapter, PersistenceAdapter};
///
/// let adapter = MemoryAdapter::new();
/// let id = Identifier::new("1", "light");
///
/// assert_eq!(adapter.read_current_state(&id, "green").unwrap(), "green");
/// assert!(adapter.add(&id, "green").unwrap());
/// assert!(!adapter.add(&id, "red").unwrap());
/// assert!(adapter.is_persisted(&id).unwrap());
/// ```
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    entities: Mutex<HashMap<Identifier, StoredEntity>>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_entries(entries: Vec<(Identifier, StoredEntity)>) -> Self {
        Self {
            entities: Mutex::new(entries.into_iter().collect()),
        }
    }

    /// Copy of every stored entry, ordered by identifier.
    pub(crate) fn entries(&self) -> Result<Vec<(Identifier, StoredEntity)>, PersistenceError> {
        let mut entries: Vec<_> = self
            .lock()?
            .iter()
            .map(|(id, entity)| (id.clone(), entity.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }

    /// Entity ids stored for `machine`, optionally only those in `state`.
    pub fn entity_ids(
        &self,
        machine: &str,
        state: Option<&str>,
    ) -> Result<Vec<String>, PersistenceError> {
        let mut ids: Vec<String> = self
            .lock()?
            .iter()
            .filter(|(id, entity)| {
                id.machine() == machine && state.is_none_or(|s| entity.state == s)
            })
            .map(|(id, _)| id.entity_id().to_string())
            .collect();
        ids.sort();
        Ok(ids)
    }

    pub fn len(&self) -> Result<usize, PersistenceError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, PersistenceError> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Identifier, StoredEntity>>, PersistenceError> {
        self.entities.lock().map_err(|_| PersistenceError::Poisoned)
    }
}

impl PersistenceAdapter for MemoryAdapter {
    fn load_state(&self, identifier: &Identifier) -> Result<Option<String>, PersistenceError> {
        Ok(self.lock()?.get(identifier).map(|e| e.state.clone()))
    }

    fn write_current_state(
        &self,
        identifier: &Identifier,
        state: &str,
        record: &TransitionRecord,
    ) -> Result<(), PersistenceError> {
        let mut entities = self.lock()?;
        let history = entities
            .get(identifier)
            .map(|e| e.history.record(record.clone()))
            .unwrap_or_else(|| StateHistory::new().record(record.clone()));
        entities.insert(
            identifier.clone(),
            StoredEntity {
                state: state.to_string(),
                history,
            },
        );
        Ok(())
    }

    fn is_persisted(&self, identifier: &Identifier) -> Result<bool, PersistenceError> {
        Ok(self.lock()?.contains_key(identifier))
    }

    fn add(&self, identifier: &Identifier, initial_state: &str) -> Result<bool, PersistenceError> {
        let mut entities = self.lock()?;
        if entities.contains_key(identifier) {
            return Ok(false);
        }
        entities.insert(
            identifier.clone(),
            StoredEntity {
                state: initial_state.to_string(),
                history: StateHistory::new(),
            },
        );
        Ok(true)
    }

    fn history(&self, identifier: &Identifier) -> Result<StateHistory, PersistenceError> {
        Ok(self
            .lock()?
            .get(identifier)
            .map(|e| e.history.clone())
            .unwrap_or_default())
    }
}
