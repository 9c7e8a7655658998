//! Symbolic guard and action references.
//!
//! Bulk graph definitions name guards and actions by key. A [`Registry`]
//! maps each key to a factory producing a fresh instance, so every loaded
//! transition owns its own guard and action. Keys are checked when the graph
//! is loaded, never while a transition runs.

use crate::builder::error::ConfigError;
use crate::effects::{Action, AlwaysFalse, AlwaysTrue, Guard, NoOp};
use std::collections::HashMap;
use std::sync::Arc;

/// Key of the always-true guard.
pub const ALWAYS_TRUE: &str = "true";
/// Key of the always-false guard.
pub const ALWAYS_FALSE: &str = "false";
/// Key of the no-op action.
pub const NO_OP: &str = "noop";

type GuardFactory<E> = Arc<dyn Fn() -> Arc<dyn Guard<E>> + Send + Sync>;
type ActionFactory<E> = Arc<dyn Fn() -> Arc<dyn Action<E>> + Send + Sync>;

/// Maps symbolic keys to guard and action factories.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use switchyard::builder::Registry;
/// use switchyard::effects::guard_fn;
///
/// struct Order { paid: bool }
///
/// let registry = Registry::<Order>::new()
///     .with_guard("IsPaid", || Arc::new(guard_fn(|o: &Order| o.paid)));
///
/// assert!(registry.has_guard("IsPaid"));
/// assert!(registry.has_guard("true"));
/// assert!(registry.guard("IsShipped").is_err());
/// ```
pub struct Registry<E> {
    guards: HashMap<String, GuardFactory<E>>,
    actions: HashMap<String, ActionFactory<E>>,
}

impl<E: 'static> Registry<E> {
    /// A registry holding only the sentinel keys.
    pub fn new() -> Self {
        let mut registry = Self {
            guards: HashMap::new(),
            actions: HashMap::new(),
        };
        registry.register_guard(ALWAYS_TRUE, || Arc::new(AlwaysTrue));
        registry.register_guard(ALWAYS_FALSE, || Arc::new(AlwaysFalse));
        registry.register_action(NO_OP, || Arc::new(NoOp));
        registry
    }

    /// Register a guard factory, replacing any previous one for this key.
    pub fn register_guard<F>(&mut self, key: impl Into<String>, factory: F)
    where
        F: Fn() -> Arc<dyn Guard<E>> + Send + Sync + 'static,
    {
        self.guards.insert(key.into(), Arc::new(factory));
    }

    /// Register an action factory, replacing any previous one for this key.
    pub fn register_action<F>(&mut self, key: impl Into<String>, factory: F)
    where
        F: Fn() -> Arc<dyn Action<E>> + Send + Sync + 'static,
    {
        self.actions.insert(key.into(), Arc::new(factory));
    }

    pub fn with_guard<F>(mut self, key: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Arc<dyn Guard<E>> + Send + Sync + 'static,
    {
        self.register_guard(key, factory);
        self
    }

    pub fn with_action<F>(mut self, key: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Arc<dyn Action<E>> + Send + Sync + 'static,
    {
        self.register_action(key, factory);
        self
    }

    pub fn has_guard(&self, key: &str) -> bool {
        self.guards.contains_key(key)
    }

    pub fn has_action(&self, key: &str) -> bool {
        self.actions.contains_key(key)
    }

    /// Instantiate the guard registered under `key`.
    pub fn guard(&self, key: &str) -> Result<Arc<dyn Guard<E>>, ConfigError> {
        self.guards
            .get(key)
            .map(|factory| factory())
            .ok_or_else(|| ConfigError::UnknownGuard {
                key: key.to_string(),
            })
    }

    /// Instantiate the action registered under `key`.
    pub fn action(&self, key: &str) -> Result<Arc<dyn Action<E>>, ConfigError> {
        self.actions
            .get(key)
            .map(|factory| factory())
            .ok_or_else(|| ConfigError::UnknownAction {
                key: key.to_string(),
            })
    }
}

impl<E: 'static> Default for Registry<E> {
    fn default() -> Self {
        Self::new()
    }
}
