//! Named states and their kinds.
//!
//! States are identified by their literal name. A graph holds exactly one
//! [`StateKind::Initial`] state; [`StateKind::Final`] states stop automatic
//! advancement in [`StateMachine::run`](crate::machine::StateMachine::run).

use super::history::TransitionRecord;
use super::identifier::Identifier;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Kind of a state within a graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateKind {
    /// Entry point of the graph. Exactly one per graph.
    Initial,
    /// Ordinary intermediate state.
    #[default]
    Normal,
    /// Terminal state. Well-formed graphs declare no outgoing transitions
    /// from it, but nothing enforces that.
    Final,
}

/// Callback invoked when a state is entered or exited.
pub type StateCallback = Arc<dyn Fn(&Identifier, &TransitionRecord) + Send + Sync>;

/// A named state with optional entry and exit callbacks.
///
/// # Example
///
/// ```rust
/// use switchyard::core::{State, StateKind};
///
/// let basket = State::new("basket", StateKind::Initial);
/// let complete = State::new("complete", StateKind::Final);
///
/// assert!(basket.is_initial());
/// assert!(complete.is_final());
/// assert_eq!(complete.name(), "complete");
/// ```
#[derive(Clone)]
pub struct State {
    name: String,
    kind: StateKind,
    on_entry: Option<StateCallback>,
    on_exit: Option<StateCallback>,
}

impl State {
    pub fn new(name: impl Into<String>, kind: StateKind) -> Self {
        Self {
            name: name.into(),
            kind,
            on_entry: None,
            on_exit: None,
        }
    }

    /// Shorthand for a [`StateKind::Normal`] state.
    pub fn normal(name: impl Into<String>) -> Self {
        Self::new(name, StateKind::Normal)
    }

    /// Attach a callback run after the state has been entered and persisted.
    pub fn on_entry<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Identifier, &TransitionRecord) + Send + Sync + 'static,
    {
        self.on_entry = Some(Arc::new(callback));
        self
    }

    /// Attach a callback run before a transition out of this state executes
    /// its action.
    pub fn on_exit<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Identifier, &TransitionRecord) + Send + Sync + 'static,
    {
        self.on_exit = Some(Arc::new(callback));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> StateKind {
        self.kind
    }

    pub fn is_initial(&self) -> bool {
        self.kind == StateKind::Initial
    }

    pub fn is_final(&self) -> bool {
        self.kind == StateKind::Final
    }

    pub(crate) fn set_kind(&mut self, kind: StateKind) {
        self.kind = kind;
    }

    pub(crate) fn enter(&self, identifier: &Identifier, record: &TransitionRecord) {
        if let Some(callback) = &self.on_entry {
            callback(identifier, record);
        }
    }

    pub(crate) fn exit(&self, identifier: &Identifier, record: &TransitionRecord) {
        if let Some(callback) = &self.on_exit {
            callback(identifier, record);
        }
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("on_entry", &self.on_entry.is_some())
            .field("on_exit", &self.on_exit.is_some())
            .finish()
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.kind == other.kind
    }
}
