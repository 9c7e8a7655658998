//! Guards and actions: the side-effect boundary of a transition.
//!
//! # Key Concepts
//!
//! - **Guards**: predicates over the domain entity deciding whether a
//!   candidate transition may fire. They must not mutate observable state.
//! - **Actions**: the side effect of a transition. [`Action::execute`] is a
//!   template method that normalizes faults into [`ActionError`].
//! - **Composite actions**: fail-fast sequences of actions.
//!
//! Guard and action faults are propagated to the caller wrapped in
//! [`GuardError`] and [`ActionError`]; a faulting guard is never read as
//! "rejected".

mod action;
mod composite;
mod guard;

pub use action::{action_fn, Action, ActionError, FnAction, NoOp};
pub use composite::CompositeAction;
pub use guard::{
    and, check, guard_fn, not, or, try_guard_fn, AlwaysFalse, AlwaysTrue, And, BoxError,
    FnGuard, Guard, GuardError, Not, Or,
};
