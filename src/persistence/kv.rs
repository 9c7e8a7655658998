//! Persistence over an injected key-value store.

use super::{PersistenceAdapter, PersistenceError};
use crate::core::{Identifier, StateHistory, TransitionRecord};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Minimal string key-value store, e.g. a session or cache handle.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set(&self, key: &str, value: String) -> Result<(), PersistenceError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: String) -> Result<(), PersistenceError> {
        (**self).set(key, value)
    }
}

/// In-process [`KeyValueStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Result<Vec<String>, PersistenceError> {
        let values = self.values.lock().map_err(|_| PersistenceError::Poisoned)?;
        let mut keys: Vec<String> = values.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let values = self.values.lock().map_err(|_| PersistenceError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), PersistenceError> {
        let mut values = self.values.lock().map_err(|_| PersistenceError::Poisoned)?;
        values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Stores the current state and a JSON-encoded history under keys derived
/// from the identifier.
///
/// The store handle is passed in explicitly; the adapter never reaches for
/// shared global state.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use switchyard::core::Identifier;
/// use switchyard::persistence::{KeyValueAdapter, MemoryStore, PersistenceAdapter};
///
/// let session = Arc::new(MemoryStore::new());
/// let adapter = KeyValueAdapter::new(Arc::clone(&session)).with_prefix("fsm.");
///
/// adapter.add(&Identifier::new("7", "wizard"), "step1").unwrap();
/// assert_eq!(session.keys().unwrap(), vec!["fsm.wizard.7.state"]);
/// ```
pub struct KeyValueAdapter<S> {
    store: S,
    prefix: String,
}

impl<S: KeyValueStore> KeyValueAdapter<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            prefix: String::new(),
        }
    }

    /// Namespace every key, e.g. to share a store with other data.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn key(&self, identifier: &Identifier, suffix: &str) -> String {
        format!(
            "{}{}.{}.{}",
            self.prefix,
            identifier.machine(),
            identifier.entity_id(),
            suffix
        )
    }
}

impl<S: KeyValueStore> PersistenceAdapter for KeyValueAdapter<S> {
    fn load_state(&self, identifier: &Identifier) -> Result<Option<String>, PersistenceError> {
        self.store.get(&self.key(identifier, "state"))
    }

    fn write_current_state(
        &self,
        identifier: &Identifier,
        state: &str,
        record: &TransitionRecord,
    ) -> Result<(), PersistenceError> {
        let history = self.history(identifier)?.record(record.clone());
        let encoded = serde_json::to_string(&history)?;
        // state first: a failed state write must not leave a record behind
        self.store.set(&self.key(identifier, "state"), state.to_string())?;
        self.store.set(&self.key(identifier, "history"), encoded)
    }

    fn is_persisted(&self, identifier: &Identifier) -> Result<bool, PersistenceError> {
        Ok(self.load_state(identifier)?.is_some())
    }

    fn add(&self, identifier: &Identifier, initial_state: &str) -> Result<bool, PersistenceError> {
        if self.is_persisted(identifier)? {
            return Ok(false);
        }
        self.store
            .set(&self.key(identifier, "state"), initial_state.to_string())?;
        Ok(true)
    }

    fn history(&self, identifier: &Identifier) -> Result<StateHistory, PersistenceError> {
        match self.store.get(&self.key(identifier, "history"))? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(StateHistory::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_and_history_live_in_the_store() {
        let store = Arc::new(MemoryStore::new());
        let adapter = KeyValueAdapter::new(Arc::clone(&store));
        let id = Identifier::new("7", "wizard");

        let record = TransitionRecord::new("step1", "step2", "step1_to_step2", Some("next"));
        adapter.write_current_state(&id, "step2", &record).unwrap();

        assert_eq!(store.get("wizard.7.state").unwrap().as_deref(), Some("step2"));
        let history = adapter.history(&id).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.last().unwrap().event.as_deref(), Some("next"));
    }

    struct ReadOnlyState(MemoryStore);

    impl KeyValueStore for ReadOnlyState {
        fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
            self.0.get(key)
        }

        fn set(&self, key: &str, value: String) -> Result<(), PersistenceError> {
            if key.ends_with(".state") {
                return Err(PersistenceError::Backend("state is read-only".to_string()));
            }
            self.0.set(key, value)
        }
    }

    #[test]
    fn failed_state_write_records_no_history() {
        let adapter = KeyValueAdapter::new(ReadOnlyState(MemoryStore::new()));
        let id = Identifier::new("7", "wizard");

        let record = TransitionRecord::new("step1", "step2", "step1_to_step2", Some("next"));
        let result = adapter.write_current_state(&id, "step2", &record);

        assert!(matches!(result, Err(PersistenceError::Backend(_))));
        assert!(adapter.history(&id).unwrap().is_empty());
        assert_eq!(adapter.load_state(&id).unwrap(), None);
    }

    #[test]
    fn unknown_identifier_reads_initial_state() {
        let adapter = KeyValueAdapter::new(MemoryStore::new());
        let id = Identifier::new("1", "wizard");

        assert!(!adapter.is_persisted(&id).unwrap());
        assert_eq!(adapter.read_current_state(&id, "step1").unwrap(), "step1");
    }

    #[test]
    fn corrupt_history_is_a_serialization_error() {
        let store = MemoryStore::new();
        store.set("wizard.1.history", "not json".to_string()).unwrap();
        let adapter = KeyValueAdapter::new(store);

        let result = adapter.history(&Identifier::new("1", "wizard"));
        assert!(matches!(result, Err(PersistenceError::Serialization(_))));
    }

    #[test]
    fn adapters_sharing_a_store_see_each_other() {
        let store = Arc::new(MemoryStore::new());
        let writer = KeyValueAdapter::new(Arc::clone(&store));
        let reader = KeyValueAdapter::new(Arc::clone(&store));
        let id = Identifier::new("1", "wizard");

        writer.add(&id, "step1").unwrap();
        assert!(reader.is_persisted(&id).unwrap());
        assert!(!reader.add(&id, "step1").unwrap());
    }
}
