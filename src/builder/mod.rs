//! Builder API for graph construction.
//!
//! Graphs can be assembled by hand with [`GraphBuilder`] and
//! [`TransitionBuilder`], or loaded in bulk from [`LoaderRow`]s whose guard
//! and action references are resolved through a [`Registry`].

pub mod error;
pub mod graph;
pub mod loader;
pub mod registry;
pub mod transition;

pub use error::ConfigError;
pub use graph::GraphBuilder;
pub use loader::{load, validate, GraphDefinition, LoaderRow};
pub use registry::{Registry, ALWAYS_FALSE, ALWAYS_TRUE, NO_OP};
pub use transition::TransitionBuilder;

use crate::core::Transition;

/// Create an unconditional, event-less transition with no action.
///
/// # Example
///
/// ```
/// use switchyard::builder::simple_transition;
///
/// let transition = simple_transition::<()>("start", "normal").unwrap();
/// assert!(transition.is_unconditional());
/// ```
pub fn simple_transition<E: 'static>(from: &str, to: &str) -> Result<Transition<E>, ConfigError> {
    TransitionBuilder::new().from(from).to(to).build()
}

/// Create a transition triggered by `event` and gated by a predicate.
///
/// # Example
///
/// ```
/// use switchyard::builder::guarded_transition;
///
/// struct Light { seconds_green: u64 }
///
/// let transition =
///     guarded_transition("green", "orange", "switch", |l: &Light| l.seconds_green >= 5)
///         .unwrap();
/// assert_eq!(transition.event(), Some("switch"));
/// ```
pub fn guarded_transition<E, F>(
    from: &str,
    to: &str,
    event: &str,
    guard: F,
) -> Result<Transition<E>, ConfigError>
where
    E: 'static,
    F: Fn(&E) -> bool + Send + Sync + 'static,
{
    TransitionBuilder::new()
        .from(from)
        .to(to)
        .on(event)
        .when(guard)
        .build()
}
