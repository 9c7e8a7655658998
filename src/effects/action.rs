//! Side-effecting actions run when a transition fires.

use super::guard::BoxError;
use std::marker::PhantomData;
use thiserror::Error;

/// Fault raised while executing an action.
///
/// The original fault is kept as the error source.
#[derive(Debug, Error)]
#[error("action '{action}' failed: {source}")]
pub struct ActionError {
    pub action: String,
    #[source]
    pub source: BoxError,
}

/// Side effect performed on the domain entity when a transition fires.
///
/// Implementors provide [`Action::effect`]. Callers use [`Action::execute`],
/// which wraps any fault into [`ActionError`], hands it to
/// [`Action::on_fault`] and returns it. Faults are never swallowed.
///
/// # Example
///
/// ```rust
/// use switchyard::effects::{Action, BoxError};
///
/// struct Light { color: &'static str }
///
/// struct SwitchToRed;
///
/// impl Action<Light> for SwitchToRed {
///     fn effect(&self, light: &mut Light) -> Result<(), BoxError> {
///         light.color = "red";
///         Ok(())
///     }
/// }
///
/// let mut light = Light { color: "orange" };
/// SwitchToRed.execute(&mut light).unwrap();
/// assert_eq!(light.color, "red");
/// ```
pub trait Action<E>: Send + Sync {
    /// The side effect itself.
    fn effect(&self, entity: &mut E) -> Result<(), BoxError>;

    /// Name used in logs and errors.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Observe a fault before it is returned. Does nothing by default.
    fn on_fault(&self, _error: &ActionError) {}

    /// Run [`Action::effect`], normalizing its fault.
    fn execute(&self, entity: &mut E) -> Result<(), ActionError> {
        self.effect(entity).map_err(|source| {
            let error = ActionError {
                action: self.name().to_string(),
                source,
            };
            self.on_fault(&error);
            error
        })
    }
}

/// Sentinel action with no side effect.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOp;

impl<E> Action<E> for NoOp {
    fn effect(&self, _entity: &mut E) -> Result<(), BoxError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "noop"
    }
}

/// Action built from a closure.
pub struct FnAction<E, F> {
    effect: F,
    name: String,
    _phantom: PhantomData<fn(&mut E)>,
}

impl<E, F> FnAction<E, F> {
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<E, F> Action<E> for FnAction<E, F>
where
    F: Fn(&mut E) -> Result<(), BoxError> + Send + Sync,
{
    fn effect(&self, entity: &mut E) -> Result<(), BoxError> {
        (self.effect)(entity)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Create an action from a closure.
pub fn action_fn<E, F>(effect: F) -> FnAction<E, F>
where
    F: Fn(&mut E) -> Result<(), BoxError> + Send + Sync,
{
    FnAction {
        effect,
        name: "closure".to_string(),
        _phantom: PhantomData,
    }
}
