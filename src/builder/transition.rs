//! Builder for constructing transitions.

use crate::builder::error::ConfigError;
use crate::core::{StateMatcher, Transition};
use crate::effects::{guard_fn, Action, Guard};
use std::sync::Arc;

/// Builder for constructing transitions with a fluent API.
///
/// Endpoints are given in textual form (`"basket"`, `"regex:/.*/"`,
/// `"not-regex:/a|b/"`) and parsed by [`TransitionBuilder::build`].
///
/// # Example
///
/// ```rust
/// use switchyard::builder::TransitionBuilder;
///
/// struct Order { paid: bool }
///
/// let transition = TransitionBuilder::<Order>::new()
///     .from("payment")
///     .to("complete")
///     .on("ready")
///     .when(|o: &Order| o.paid)
///     .build()
///     .unwrap();
///
/// assert_eq!(transition.name(), "payment_to_complete");
/// assert!(!transition.is_unconditional());
/// ```
pub struct TransitionBuilder<E> {
    from: Option<String>,
    to: Option<String>,
    event: Option<String>,
    name: Option<String>,
    guard: Option<Arc<dyn Guard<E>>>,
    action: Option<Arc<dyn Action<E>>>,
}

impl<E: 'static> TransitionBuilder<E> {
    pub fn new() -> Self {
        Self {
            from: None,
            to: None,
            event: None,
            name: None,
            guard: None,
            action: None,
        }
    }

    /// Set the source state or wildcard (required).
    pub fn from(mut self, state: impl Into<String>) -> Self {
        self.from = Some(state.into());
        self
    }

    /// Set the target state (required).
    pub fn to(mut self, state: impl Into<String>) -> Self {
        self.to = Some(state.into());
        self
    }

    /// Set the event that triggers the transition.
    pub fn on(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    /// Override the default `"<from>_to_<to>"` name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn guard(mut self, guard: Arc<dyn Guard<E>>) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Add a guard using a closure.
    pub fn when<F>(self, predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.guard(Arc::new(guard_fn(predicate)))
    }

    pub fn action(mut self, action: Arc<dyn Action<E>>) -> Self {
        self.action = Some(action);
        self
    }

    /// Build the transition.
    pub fn build(self) -> Result<Transition<E>, ConfigError> {
        let from = self.from.ok_or(ConfigError::MissingFromState)?;
        let to = self.to.ok_or(ConfigError::MissingToState)?;

        let mut transition =
            Transition::new(StateMatcher::parse(&from)?, StateMatcher::parse(&to)?);
        if let Some(event) = self.event {
            transition = transition.with_event(event);
        }
        if let Some(name) = self.name {
            transition = transition.with_name(name);
        }
        if let Some(guard) = self.guard {
            transition = transition.with_guard(guard);
        }
        if let Some(action) = self.action {
            transition = transition.with_action(action);
        }
        Ok(transition)
    }
}

impl<E: 'static> Default for TransitionBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}
