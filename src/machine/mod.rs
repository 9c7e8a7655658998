//! Orchestration of the resolver, the guard/action pipeline and persistence.
//!
//! A [`StateMachine`] drives one entity, named by its [`Identifier`], through
//! a shared [`Graph`]. It holds no current state of its own: every call reads
//! the state from the persistence adapter and writes it back after a
//! successful transition.
//!
//! One orchestration call moves through
//! `Idle -> Resolving -> GuardEvaluating`, then either back to `Idle` when
//! every candidate is rejected, or on to `ActionExecuting` and `Persisting`.
//! A fault in a guard or action ends the call with an error and nothing is
//! written.

mod config;
mod hooks;

pub use config::{MachineConfig, DEFAULT_MAX_RUN_STEPS};
pub use hooks::{MachineHooks, NoHooks};

use crate::context::Context;
use crate::core::{
    default_transition_name, resolve, Candidate, Graph, Identifier, Selector, StateHistory,
    StateKind, TransitionRecord,
};
use crate::effects::check;
use crate::error::{EngineError, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Event-driven state machine bound to a single entity.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use switchyard::builder::{GraphBuilder, TransitionBuilder};
/// use switchyard::context::{Context, IdentityBuilder};
/// use switchyard::core::Identifier;
/// use switchyard::machine::StateMachine;
/// use switchyard::persistence::MemoryAdapter;
///
/// let graph = GraphBuilder::new()
///     .initial("basket")
///     .final_state("complete")
///     .transition(TransitionBuilder::new().from("basket").to("complete").on("Checkout"))
///     .unwrap()
///     .build()
///     .unwrap();
///
/// let context = Context::new(
///     Identifier::new("42", "order"),
///     IdentityBuilder,
///     Arc::new(MemoryAdapter::new()),
/// );
/// let mut machine = StateMachine::new(Arc::new(graph), context);
///
/// assert!(machine.handle("Checkout").unwrap());
/// assert_eq!(machine.current_state().unwrap(), "complete");
/// assert!(machine.is_final().unwrap());
/// ```
pub struct StateMachine<E> {
    graph: Arc<Graph<E>>,
    context: Context<E>,
    hooks: Box<dyn MachineHooks<E>>,
    config: MachineConfig,
}

impl<E> StateMachine<E> {
    pub fn new(graph: Arc<Graph<E>>, context: Context<E>) -> Self {
        Self {
            graph,
            context,
            hooks: Box::new(NoHooks),
            config: MachineConfig::default(),
        }
    }

    pub fn with_hooks(mut self, hooks: impl MachineHooks<E> + 'static) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    pub fn with_config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn identifier(&self) -> &Identifier {
        self.context.identifier()
    }

    pub fn graph(&self) -> &Arc<Graph<E>> {
        &self.graph
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn context(&self) -> &Context<E> {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut Context<E> {
        &mut self.context
    }

    /// The persisted state, or the graph's initial state if nothing has been
    /// recorded for this identifier yet.
    pub fn current_state(&self) -> Result<String> {
        let initial = self.graph.initial_state()?;
        Ok(self
            .context
            .adapter()
            .read_current_state(self.context.identifier(), initial.name())?)
    }

    /// Register the entity with the adapter in the initial state.
    ///
    /// Returns `false` if it was already persisted.
    pub fn add_to_backend(&self) -> Result<bool> {
        let identifier = self.context.identifier();
        let adapter = self.context.adapter();
        if adapter.is_persisted(identifier)? {
            return Ok(false);
        }
        let initial = self.graph.initial_state()?;
        let added = adapter.add(identifier, initial.name())?;
        if added {
            info!(identifier = %identifier, state = initial.name(), "entity added");
        }
        Ok(added)
    }

    /// Perform the first transition triggered by `event` whose guard passes.
    pub fn handle(&mut self, event: &str) -> Result<bool> {
        let current = self.current_state()?;
        self.perform(&current, Selector::Event(event))
    }

    /// Perform the transition called `name`.
    ///
    /// Accepts a declared name as well as the `"<current>_to_<target>"` name
    /// of a wildcard transition.
    pub fn transition(&mut self, name: &str) -> Result<bool> {
        let current = self.current_state()?;
        self.perform(&current, Selector::Name(name))
    }

    /// Keep taking unconditional transitions until a final state is reached or
    /// none applies.
    ///
    /// Returns whether at least one transition was performed.
    pub fn run(&mut self) -> Result<bool> {
        let limit = self.config.max_run_steps;
        let mut steps = 0;

        loop {
            let current = self.current_state()?;
            if self.graph.kind_of(&current) == StateKind::Final {
                debug!(
                    identifier = %self.identifier(),
                    state = %current,
                    "run reached final state"
                );
                break;
            }
            if steps >= limit {
                warn!(
                    identifier = %self.identifier(),
                    state = %current,
                    limit,
                    "run limit exceeded"
                );
                return Err(EngineError::RunLimitExceeded { limit });
            }
            if !self.perform(&current, Selector::Unconditional)? {
                break;
            }
            steps += 1;
        }

        Ok(steps > 0)
    }

    /// Whether `handle(event)` would find a transition whose guard passes.
    ///
    /// Hooks are not consulted. An unknown event yields `false`.
    pub fn can_handle(&mut self, event: &str) -> Result<bool> {
        let current = self.current_state()?;
        self.any_guard_passes(&current, Selector::Event(event))
    }

    /// Whether `transition(name)` would find a transition whose guard passes.
    pub fn can_transition(&mut self, name: &str) -> Result<bool> {
        let current = self.current_state()?;
        self.any_guard_passes(&current, Selector::Name(name))
    }

    pub fn is_final(&self) -> Result<bool> {
        let current = self.current_state()?;
        Ok(self.graph.kind_of(&current) == StateKind::Final)
    }

    /// Transitions the adapter has recorded for this entity.
    pub fn history(&self) -> Result<StateHistory> {
        Ok(self.context.adapter().history(self.context.identifier())?)
    }

    /// The entity bound to this machine, built on first use.
    pub fn entity(&mut self) -> Result<&mut E> {
        Ok(self.context.get_entity(false)?)
    }

    fn any_guard_passes(&mut self, current: &str, selector: Selector<'_>) -> Result<bool> {
        let graph = Arc::clone(&self.graph);
        let candidates = match resolve(&graph, current, selector) {
            Ok(candidates) => candidates,
            Err(EngineError::TransitionNotFound { .. }) => return Ok(false),
            Err(err) => return Err(err),
        };
        if candidates.is_empty() {
            return Ok(false);
        }

        let entity = self.context.get_entity(false)?;
        for candidate in &candidates {
            if check(candidate.transition.guard(), entity)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn perform(&mut self, current: &str, selector: Selector<'_>) -> Result<bool> {
        let graph = Arc::clone(&self.graph);
        let identifier = self.context.identifier().clone();
        let candidates = resolve(&graph, current, selector)?;

        debug!(
            identifier = %identifier,
            state = current,
            selector = %selector,
            candidates = candidates.len(),
            "resolved candidates"
        );
        if candidates.is_empty() {
            return Ok(false);
        }

        let adapter = Arc::clone(self.context.adapter());
        let entity = self.context.get_entity(false)?;

        for candidate in &candidates {
            let transition = candidate.transition;
            let passed = check(transition.guard(), entity).inspect_err(|err| {
                warn!(identifier = %identifier, state = current, error = %err, "guard fault");
            })?;
            if !passed {
                debug!(
                    identifier = %identifier,
                    transition = transition.name(),
                    guard = transition.guard().name(),
                    "guard rejected"
                );
                continue;
            }

            let to = candidate.to()?;
            let event = match selector {
                Selector::Event(event) => Some(event),
                _ => transition.event(),
            };
            let record = TransitionRecord::new(
                candidate.from.as_str(),
                to.as_str(),
                record_name(candidate, &to),
                event,
            );

            if !self.hooks.on_check_can_transition(&identifier, entity, &record) {
                warn!(
                    identifier = %identifier,
                    transition = %record.transition,
                    "transition vetoed"
                );
                continue;
            }

            if let Some(state) = graph.state(&candidate.from) {
                state.exit(&identifier, &record);
            }
            self.hooks.on_exit_state(&identifier, entity, &record);

            transition.action().execute(entity).inspect_err(|err| {
                warn!(
                    identifier = %identifier,
                    transition = %record.transition,
                    error = %err,
                    "action fault"
                );
            })?;
            self.hooks.on_transition(&identifier, entity, &record);

            adapter.write_current_state(&identifier, &to, &record)?;

            if let Some(state) = graph.state(&to) {
                state.enter(&identifier, &record);
            }
            self.hooks.on_enter_state(&identifier, entity, &record);

            info!(
                identifier = %identifier,
                from = %record.from,
                to = %record.to,
                transition = %record.transition,
                "transition performed"
            );
            return Ok(true);
        }

        Ok(false)
    }
}

/// Explicit names are kept; generated names of wildcard transitions are made
/// concrete.
fn record_name<E>(candidate: &Candidate<'_, E>, to: &str) -> String {
    let transition = candidate.transition;
    let generated =
        default_transition_name(&transition.from().to_string(), &transition.to().to_string());
    if transition.name() == generated {
        default_transition_name(&candidate.from, to)
    } else {
        transition.name().to_string()
    }
}
