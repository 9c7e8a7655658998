//! Guard predicates gating transitions.
//!
//! A guard decides whether a candidate transition may fire. It reads the
//! domain entity and must not mutate observable state. A guard that cannot
//! reach a decision reports a fault instead of answering `false`; the
//! pipeline wraps that fault into [`GuardError`].

use std::error::Error as StdError;
use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;

/// Boxed fault raised by user-supplied guards, actions and entity builders.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Fault raised while evaluating a guard.
#[derive(Debug, Error)]
#[error("guard '{guard}' failed: {source}")]
pub struct GuardError {
    pub guard: String,
    #[source]
    pub source: BoxError,
}

/// Side-effect-free predicate over the domain entity.
///
/// # Example
///
/// ```rust
/// use switchyard::effects::{guard_fn, Guard};
///
/// struct Basket { items: usize }
///
/// let not_empty = guard_fn(|b: &Basket| b.items > 0);
/// assert!(not_empty.applies(&Basket { items: 2 }).unwrap());
/// assert!(!not_empty.applies(&Basket { items: 0 }).unwrap());
/// ```
pub trait Guard<E>: Send + Sync {
    /// Decide whether the transition may fire.
    fn applies(&self, entity: &E) -> Result<bool, BoxError>;

    /// Name used in logs and errors.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Whether this guard always passes. Only [`AlwaysTrue`] answers `true`;
    /// transitions guarded by it are the ones `run()` advances through.
    fn is_unconditional(&self) -> bool {
        false
    }
}

/// Evaluate a guard, normalizing a fault into [`GuardError`].
pub fn check<E>(guard: &dyn Guard<E>, entity: &E) -> Result<bool, GuardError> {
    guard.applies(entity).map_err(|source| GuardError {
        guard: guard.name().to_string(),
        source,
    })
}

/// Sentinel guard that always passes.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysTrue;

impl<E> Guard<E> for AlwaysTrue {
    fn applies(&self, _entity: &E) -> Result<bool, BoxError> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "true"
    }

    fn is_unconditional(&self) -> bool {
        true
    }
}

/// Sentinel guard that never passes.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysFalse;

impl<E> Guard<E> for AlwaysFalse {
    fn applies(&self, _entity: &E) -> Result<bool, BoxError> {
        Ok(false)
    }

    fn name(&self) -> &str {
        "false"
    }
}

/// Guard built from a closure returning `Result<bool, BoxError>`.
pub struct FnGuard<E, F> {
    predicate: F,
    name: String,
    _phantom: PhantomData<fn(&E)>,
}

impl<E, F> FnGuard<E, F> {
    /// Rename the guard for logs and errors.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<E, F> Guard<E> for FnGuard<E, F>
where
    F: Fn(&E) -> Result<bool, BoxError> + Send + Sync,
{
    fn applies(&self, entity: &E) -> Result<bool, BoxError> {
        (self.predicate)(entity)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Create an infallible guard from a pure predicate.
pub fn guard_fn<E, P>(
    predicate: P,
) -> FnGuard<E, impl Fn(&E) -> Result<bool, BoxError> + Send + Sync>
where
    P: Fn(&E) -> bool + Send + Sync,
{
    try_guard_fn(move |entity: &E| Ok(predicate(entity)))
}

/// Create a guard from a predicate that may fault.
pub fn try_guard_fn<E, F>(predicate: F) -> FnGuard<E, F>
where
    F: Fn(&E) -> Result<bool, BoxError> + Send + Sync,
{
    FnGuard {
        predicate,
        name: "closure".to_string(),
        _phantom: PhantomData,
    }
}

/// Passes when both guards pass. The right guard is skipped when the left
/// one rejects.
pub struct And<E> {
    left: Arc<dyn Guard<E>>,
    right: Arc<dyn Guard<E>>,
    name: String,
}

/// Passes when either guard passes. The right guard is skipped when the left
/// one accepts.
pub struct Or<E> {
    left: Arc<dyn Guard<E>>,
    right: Arc<dyn Guard<E>>,
    name: String,
}

/// Inverts a guard.
pub struct Not<E> {
    inner: Arc<dyn Guard<E>>,
    name: String,
}

pub fn and<E>(left: Arc<dyn Guard<E>>, right: Arc<dyn Guard<E>>) -> And<E> {
    let name = format!("({} and {})", left.name(), right.name());
    And { left, right, name }
}

pub fn or<E>(left: Arc<dyn Guard<E>>, right: Arc<dyn Guard<E>>) -> Or<E> {
    let name = format!("({} or {})", left.name(), right.name());
    Or { left, right, name }
}

pub fn not<E>(inner: Arc<dyn Guard<E>>) -> Not<E> {
    let name = format!("not {}", inner.name());
    Not { inner, name }
}

impl<E> Guard<E> for And<E> {
    fn applies(&self, entity: &E) -> Result<bool, BoxError> {
        Ok(self.left.applies(entity)? && self.right.applies(entity)?)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<E> Guard<E> for Or<E> {
    fn applies(&self, entity: &E) -> Result<bool, BoxError> {
        Ok(self.left.applies(entity)? || self.right.applies(entity)?)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<E> Guard<E> for Not<E> {
    fn applies(&self, entity: &E) -> Result<bool, BoxError> {
        Ok(!self.inner.applies(entity)?)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
