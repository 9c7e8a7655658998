//! Lifecycle hooks around a transition.

use crate::core::{Identifier, TransitionRecord};

/// Observation points invoked by the machine around each transition.
///
/// A domain type plugs into the lifecycle by implementing this trait instead
/// of being a machine itself. Every method has an empty default.
///
/// Order for an accepted transition: `on_check_can_transition`,
/// `on_exit_state`, the action, `on_transition`, the state write,
/// `on_enter_state`.
pub trait MachineHooks<E>: Send {
    /// Veto a transition whose guard passed. Returning `false` makes the
    /// machine treat it as rejected and try the next candidate.
    fn on_check_can_transition(
        &mut self,
        _identifier: &Identifier,
        _entity: &E,
        _record: &TransitionRecord,
    ) -> bool {
        true
    }

    fn on_exit_state(
        &mut self,
        _identifier: &Identifier,
        _entity: &mut E,
        _record: &TransitionRecord,
    ) {
    }

    /// Called after the action succeeded, before the new state is written.
    fn on_transition(
        &mut self,
        _identifier: &Identifier,
        _entity: &mut E,
        _record: &TransitionRecord,
    ) {
    }

    fn on_enter_state(
        &mut self,
        _identifier: &Identifier,
        _entity: &mut E,
        _record: &TransitionRecord,
    ) {
    }
}

/// Hooks that do nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHooks;

impl<E> MachineHooks<E> for NoHooks {}
