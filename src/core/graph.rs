//! The state/transition graph of a machine.

use super::matcher::StateMatcher;
use super::state::{State, StateKind};
use super::transition::Transition;
use crate::error::{EngineError, Result};

/// States and transitions of one machine definition.
///
/// Transitions keep their registration order, which is the precedence used
/// when several of them apply to the same state. States named by exact
/// endpoints are registered automatically; wildcard endpoints are kept as
/// matchers and never expanded into the graph.
///
/// A graph is built once and shared, typically behind an `Arc`, by every
/// machine instance driving an entity through it.
pub struct Graph<E> {
    states: Vec<State>,
    transitions: Vec<Transition<E>>,
}

impl<E> Default for Graph<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Graph<E> {
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            transitions: Vec::new(),
        }
    }

    /// Register a state.
    ///
    /// Re-adding a known name keeps the first definition, except that a
    /// `Normal` state is promoted to the more specific `Initial` or `Final`
    /// kind.
    pub fn add_state(&mut self, state: State) {
        match self.states.iter_mut().find(|s| s.name() == state.name()) {
            Some(existing) => {
                if existing.kind() == StateKind::Normal && state.kind() != StateKind::Normal {
                    existing.set_kind(state.kind());
                }
            }
            None => self.states.push(state),
        }
    }

    /// Append a transition, registering its exact endpoints as `Normal`
    /// states if they are not known yet.
    pub fn add_transition(&mut self, transition: Transition<E>) {
        for matcher in [transition.from(), transition.to()] {
            if let Some(name) = matcher.exact_name() {
                if self.state(name).is_none() {
                    self.states.push(State::normal(name));
                }
            }
        }
        self.transitions.push(transition);
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn transitions(&self) -> &[Transition<E>] {
        &self.transitions
    }

    pub fn state(&self, name: &str) -> Option<&State> {
        self.states.iter().find(|s| s.name() == name)
    }

    /// Kind of a literal state; unknown names count as `Normal`.
    pub fn kind_of(&self, name: &str) -> StateKind {
        self.state(name).map(State::kind).unwrap_or_default()
    }

    /// The single initial state.
    pub fn initial_state(&self) -> Result<&State> {
        let mut initials = self.states.iter().filter(|s| s.is_initial());
        let first = initials.next().ok_or(EngineError::NoInitialState)?;
        if initials.next().is_some() {
            return Err(EngineError::MultipleInitialStates {
                states: self
                    .states
                    .iter()
                    .filter(|s| s.is_initial())
                    .map(|s| s.name().to_string())
                    .collect(),
            });
        }
        Ok(first)
    }

    pub fn final_states(&self) -> impl Iterator<Item = &State> {
        self.states.iter().filter(|s| s.is_final())
    }

    pub fn has_event(&self, event: &str) -> bool {
        self.transitions.iter().any(|t| t.event() == Some(event))
    }

    pub fn events(&self) -> Vec<&str> {
        let mut events: Vec<&str> = Vec::new();
        for event in self.transitions.iter().filter_map(Transition::event) {
            if !events.contains(&event) {
                events.push(event);
            }
        }
        events
    }

    pub fn transition(&self, name: &str) -> Option<&Transition<E>> {
        self.transitions.iter().find(|t| t.name() == name)
    }

    /// Resolve the literal target of a transition's "to" side.
    ///
    /// Exact matchers name their target directly. Patterns are matched
    /// against the known states and must select exactly one of them.
    pub fn resolve_target(&self, to: &StateMatcher) -> Result<String> {
        if let Some(name) = to.exact_name() {
            return Ok(name.to_string());
        }
        let matches: Vec<String> = self
            .states
            .iter()
            .filter(|s| to.matches(s.name()))
            .map(|s| s.name().to_string())
            .collect();
        match matches.as_slice() {
            [single] => Ok(single.clone()),
            _ => Err(EngineError::AmbiguousTarget {
                pattern: to.to_string(),
                matches,
            }),
        }
    }

    /// Whether `name` names a transition, either by its declared name or as
    /// the concrete `"<from>_to_<to>"` name of a wildcard transition.
    pub fn knows_transition_name(&self, name: &str) -> bool {
        if self.transition(name).is_some() {
            return true;
        }
        name.match_indices("_to_").any(|(at, sep)| {
            let (from, to) = (&name[..at], &name[at + sep.len()..]);
            self.transitions.iter().any(|t| {
                t.is_possible_from(from)
                    && self
                        .resolve_target(t.to())
                        .map(|target| target == to)
                        .unwrap_or(false)
            })
        })
    }
}
