//! Transitions between states.

use super::matcher::StateMatcher;
use crate::effects::{Action, AlwaysTrue, Guard, NoOp};
use std::fmt;
use std::sync::Arc;

/// Build the default name of a transition between two states.
///
/// ```rust
/// assert_eq!(switchyard::core::default_transition_name("new", "done"), "new_to_done");
/// ```
pub fn default_transition_name(from: &str, to: &str) -> String {
    format!("{from}_to_{to}")
}

/// A guarded, side-effecting move from one state to another.
///
/// A transition without an explicit guard uses [`AlwaysTrue`], which makes it
/// unconditional; without an explicit action it uses [`NoOp`]. Its position
/// in the [`Graph`](super::Graph) is its priority.
pub struct Transition<E> {
    from: StateMatcher,
    to: StateMatcher,
    event: Option<String>,
    name: String,
    guard: Arc<dyn Guard<E>>,
    action: Arc<dyn Action<E>>,
}

impl<E: 'static> Transition<E> {
    /// Unconditional no-op transition named `"<from>_to_<to>"`.
    pub fn new(from: StateMatcher, to: StateMatcher) -> Self {
        let name = default_transition_name(&from.to_string(), &to.to_string());
        Self {
            from,
            to,
            event: None,
            name,
            guard: Arc::new(AlwaysTrue),
            action: Arc::new(NoOp),
        }
    }
}

impl<E> Transition<E> {
    /// Trigger the transition with [`StateMachine::handle`](crate::machine::StateMachine::handle).
    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    /// Replace the default `"<from>_to_<to>"` name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_guard(mut self, guard: Arc<dyn Guard<E>>) -> Self {
        self.guard = guard;
        self
    }

    pub fn with_action(mut self, action: Arc<dyn Action<E>>) -> Self {
        self.action = action;
        self
    }

    pub fn from(&self) -> &StateMatcher {
        &self.from
    }

    pub fn to(&self) -> &StateMatcher {
        &self.to
    }

    pub fn event(&self) -> Option<&str> {
        self.event.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn guard(&self) -> &dyn Guard<E> {
        self.guard.as_ref()
    }

    pub fn action(&self) -> &dyn Action<E> {
        self.action.as_ref()
    }

    /// Whether the transition is guarded by the always-true sentinel.
    pub fn is_unconditional(&self) -> bool {
        self.guard.is_unconditional()
    }

    /// Whether the transition may leave the given literal state.
    pub fn is_possible_from(&self, state: &str) -> bool {
        self.from.matches(state)
    }
}

impl<E> Clone for Transition<E> {
    fn clone(&self) -> Self {
        Self {
            from: self.from.clone(),
            to: self.to.clone(),
            event: self.event.clone(),
            name: self.name.clone(),
            guard: Arc::clone(&self.guard),
            action: Arc::clone(&self.action),
        }
    }
}

impl<E> fmt::Debug for Transition<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("name", &self.name)
            .field("from", &self.from.to_string())
            .field("to", &self.to.to_string())
            .field("event", &self.event)
            .field("guard", &self.guard.name())
            .field("action", &self.action.name())
            .finish()
    }
}
