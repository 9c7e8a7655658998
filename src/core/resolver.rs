//! Transition resolution.
//!
//! Given the literal current state and a selector, the resolver lists the
//! candidate transitions in registration order. Guards are not evaluated
//! here; the order returned is the order the guard stage tries them in.

use super::graph::Graph;
use super::transition::{default_transition_name, Transition};
use crate::error::{EngineError, Result};
use std::fmt;

/// What a caller asks the machine to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selector<'a> {
    /// Transitions triggered by this event.
    Event(&'a str),
    /// The transition with this declared or concrete name.
    Name(&'a str),
    /// Event-less transitions guarded by the always-true sentinel.
    Unconditional,
}

impl fmt::Display for Selector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Event(event) => write!(f, "event '{event}'"),
            Self::Name(name) => write!(f, "transition '{name}'"),
            Self::Unconditional => f.write_str("unconditional transition"),
        }
    }
}

/// A transition that applies to the current state.
///
/// The target is resolved on demand with [`Candidate::to`], so a pattern
/// target that cannot be resolved only fails once this candidate is chosen.
pub struct Candidate<'g, E> {
    pub transition: &'g Transition<E>,
    /// Registration index within the graph.
    pub index: usize,
    pub from: String,
    graph: &'g Graph<E>,
}

impl<E> Candidate<'_, E> {
    /// Literal target state.
    pub fn to(&self) -> Result<String> {
        self.graph.resolve_target(self.transition.to())
    }

    /// `"<from>_to_<to>"` with literal state names.
    pub fn concrete_name(&self) -> Result<String> {
        Ok(default_transition_name(&self.from, &self.to()?))
    }
}

impl<E> fmt::Debug for Candidate<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("transition", &self.transition.name())
            .field("index", &self.index)
            .field("from", &self.from)
            .field("to", &self.transition.to().to_string())
            .finish()
    }
}

/// List the candidates for `selector` from the literal state `current`.
///
/// An empty list means the selector is valid for this graph but nothing
/// applies from `current`. A selector the graph has never heard of fails
/// with [`EngineError::TransitionNotFound`]. Targets are not resolved here.
pub fn resolve<'g, E>(
    graph: &'g Graph<E>,
    current: &str,
    selector: Selector<'_>,
) -> Result<Vec<Candidate<'g, E>>> {
    let mut candidates = Vec::new();

    for (index, transition) in graph.transitions().iter().enumerate() {
        if !transition.is_possible_from(current) {
            continue;
        }
        let selected = match selector {
            Selector::Event(event) => transition.event() == Some(event),
            Selector::Unconditional => {
                transition.is_unconditional() && transition.event().is_none()
            }
            Selector::Name(name) => {
                if transition.name() == name {
                    true
                } else {
                    // a target that cannot be resolved cannot have a concrete name
                    match graph.resolve_target(transition.to()) {
                        Ok(target) => default_transition_name(current, &target) == name,
                        Err(_) => false,
                    }
                }
            }
        };
        if !selected {
            continue;
        }

        candidates.push(Candidate {
            transition,
            index,
            from: current.to_string(),
            graph,
        });
    }

    if candidates.is_empty() && !is_known(graph, selector) {
        return Err(EngineError::TransitionNotFound {
            state: current.to_string(),
            selector: selector.to_string(),
        });
    }

    Ok(candidates)
}

fn is_known<E>(graph: &Graph<E>, selector: Selector<'_>) -> bool {
    match selector {
        Selector::Event(event) => graph.has_event(event),
        Selector::Name(name) => graph.knows_transition_name(name),
        Selector::Unconditional => true,
    }
}
