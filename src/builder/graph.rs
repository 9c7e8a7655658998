//! Builder for constructing graphs.

use crate::builder::error::ConfigError;
use crate::builder::transition::TransitionBuilder;
use crate::core::{Graph, State, StateKind, Transition};

/// Builder for constructing graphs with a fluent API.
///
/// The initial state is not checked here: wildcard transitions make the set
/// of states open-ended, so the single-initial-state rule is enforced when a
/// machine first needs it.
///
/// # Example
///
/// ```rust
/// use switchyard::builder::{GraphBuilder, TransitionBuilder};
///
/// let graph = GraphBuilder::<()>::new()
///     .initial("new")
///     .final_state("done")
///     .transition(TransitionBuilder::new().from("new").to("done"))
///     .unwrap()
///     .build()
///     .unwrap();
///
/// assert_eq!(graph.initial_state().unwrap().name(), "new");
/// ```
pub struct GraphBuilder<E> {
    states: Vec<State>,
    transitions: Vec<Transition<E>>,
}

impl<E: 'static> GraphBuilder<E> {
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            transitions: Vec::new(),
        }
    }

    /// Declare the initial state.
    pub fn initial(self, name: impl Into<String>) -> Self {
        self.state(State::new(name, StateKind::Initial))
    }

    /// Declare a final state.
    pub fn final_state(self, name: impl Into<String>) -> Self {
        self.state(State::new(name, StateKind::Final))
    }

    /// Declare a state, e.g. to attach entry or exit callbacks.
    pub fn state(mut self, state: State) -> Self {
        self.states.push(state);
        self
    }

    /// Add a transition using a builder.
    /// Returns an error if the builder fails validation.
    pub fn transition(mut self, builder: TransitionBuilder<E>) -> Result<Self, ConfigError> {
        let transition = builder.build()?;
        self.transitions.push(transition);
        Ok(self)
    }

    /// Add a pre-built transition.
    pub fn add_transition(mut self, transition: Transition<E>) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Add multiple transitions at once.
    pub fn transitions(mut self, transitions: Vec<Transition<E>>) -> Self {
        self.transitions.extend(transitions);
        self
    }

    /// Build the graph.
    ///
    /// Declared states are registered before transitions so their kinds and
    /// callbacks win over the `Normal` placeholders transitions create.
    pub fn build(self) -> Result<Graph<E>, ConfigError> {
        if self.transitions.is_empty() {
            return Err(ConfigError::NoTransitions);
        }

        let mut graph = Graph::new();
        for state in self.states {
            graph.add_state(state);
        }
        for transition in self.transitions {
            graph.add_transition(transition);
        }
        Ok(graph)
    }
}

impl<E: 'static> Default for GraphBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}
