//! Ordered sequence of actions executed as one.

use super::action::{Action, ActionError};
use super::guard::BoxError;
use std::sync::Arc;

/// Runs its children in insertion order and stops at the first fault.
///
/// Children that already ran are not compensated when a later one fails, so
/// the entity may be left partially updated. The failing child's error is
/// passed to [`Action::on_fault`] of the composite and then returned as is.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use switchyard::effects::{action_fn, Action, CompositeAction};
///
/// let mut composite: CompositeAction<Vec<&'static str>> = CompositeAction::new("checkout");
/// composite.add(Arc::new(action_fn(|log: &mut Vec<&'static str>| {
///     log.push("reserve");
///     Ok(())
/// })));
/// composite.add(Arc::new(action_fn(|log: &mut Vec<&'static str>| {
///     log.push("charge");
///     Ok(())
/// })));
///
/// let mut log = Vec::new();
/// composite.execute(&mut log).unwrap();
/// assert_eq!(log, vec!["reserve", "charge"]);
/// ```
pub struct CompositeAction<E> {
    name: String,
    children: Vec<Arc<dyn Action<E>>>,
    fault_observer: Option<FaultObserver>,
}

type FaultObserver = Box<dyn Fn(&ActionError) + Send + Sync>;

impl<E> CompositeAction<E> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            fault_observer: None,
        }
    }

    /// Call `observer` with the first child fault of each execution.
    pub fn on_child_fault<F>(mut self, observer: F) -> Self
    where
        F: Fn(&ActionError) + Send + Sync + 'static,
    {
        self.fault_observer = Some(Box::new(observer));
        self
    }

    pub fn with(mut self, action: Arc<dyn Action<E>>) -> Self {
        self.add(action);
        self
    }

    pub fn add(&mut self, action: Arc<dyn Action<E>>) {
        self.children.push(action);
    }

    /// Remove every occurrence of this exact action instance.
    ///
    /// Returns whether anything was removed.
    pub fn remove(&mut self, action: &Arc<dyn Action<E>>) -> bool {
        let before = self.children.len();
        self.children.retain(|child| !same_instance(child, action));
        self.children.len() != before
    }

    /// Whether this exact action instance is a child.
    pub fn contains(&self, action: &Arc<dyn Action<E>>) -> bool {
        self.children.iter().any(|child| same_instance(child, action))
    }

    pub fn count(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

fn same_instance<E>(a: &Arc<dyn Action<E>>, b: &Arc<dyn Action<E>>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

impl<E> Action<E> for CompositeAction<E> {
    fn effect(&self, entity: &mut E) -> Result<(), BoxError> {
        self.execute(entity).map_err(BoxError::from)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn on_fault(&self, error: &ActionError) {
        if let Some(observer) = &self.fault_observer {
            observer(error);
        }
    }

    // Children already normalize their own faults; the first one is
    // returned as is.
    fn execute(&self, entity: &mut E) -> Result<(), ActionError> {
        for child in &self.children {
            child.execute(entity).inspect_err(|err| self.on_fault(err))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::action::action_fn;
    use std::sync::Mutex;

    fn push(tag: &'static str) -> Arc<dyn Action<Vec<&'static str>>> {
        Arc::new(action_fn(move |log: &mut Vec<&'static str>| {
            log.push(tag);
            Ok(())
        }))
    }

    fn fail(tag: &'static str) -> Arc<dyn Action<Vec<&'static str>>> {
        Arc::new(
            action_fn(move |log: &mut Vec<&'static str>| {
                log.push(tag);
                Err(format!("{tag} failed").into())
            })
            .named(tag),
        )
    }

    #[test]
    fn children_run_in_insertion_order() {
        let composite = CompositeAction::new("seq")
            .with(push("a"))
            .with(push("b"))
            .with(push("c"));

        let mut log = Vec::new();
        composite.execute(&mut log).unwrap();

        assert_eq!(log, vec!["a", "b", "c"]);
    }

    #[test]
    fn first_fault_aborts_the_rest() {
        let composite = CompositeAction::new("seq")
            .with(push("a"))
            .with(fail("b"))
            .with(push("c"));

        let mut log = Vec::new();
        let err = composite.execute(&mut log).unwrap_err();

        assert_eq!(log, vec!["a", "b"]);
        assert_eq!(err.action, "b");
        assert_eq!(err.source.to_string(), "b failed");
    }

    #[test]
    fn composite_observes_child_fault() {
        let seen: Arc<Mutex<Vec<String>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let composite = CompositeAction::new("seq")
            .with(push("a"))
            .with(fail("b"))
            .with(fail("c"))
            .on_child_fault(move |err| sink.lock().unwrap().push(err.action.clone()));

        let mut log = Vec::new();
        let err = composite.execute(&mut log).unwrap_err();

        assert_eq!(err.action, "b");
        assert_eq!(*seen.lock().unwrap(), vec!["b"]);

        // nothing is observed when every child succeeds
        let quiet = Arc::clone(&seen);
        let composite = CompositeAction::new("ok")
            .with(push("a"))
            .on_child_fault(move |err| quiet.lock().unwrap().push(err.action.clone()));
        composite.execute(&mut log).unwrap();
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn membership_is_by_identity() {
        let a = push("a");
        let a_twin = push("a");
        let mut composite = CompositeAction::new("seq");
        composite.add(Arc::clone(&a));

        assert!(composite.contains(&a));
        assert!(!composite.contains(&a_twin));
        assert_eq!(composite.count(), 1);

        assert!(!composite.remove(&a_twin));
        assert!(composite.remove(&a));
        assert!(composite.is_empty());
    }

    #[test]
    fn composites_nest() {
        let inner: Arc<dyn Action<Vec<&'static str>>> =
            Arc::new(CompositeAction::new("inner").with(push("x")).with(push("y")));
        let outer = CompositeAction::new("outer").with(push("w")).with(inner);

        let mut log = Vec::new();
        outer.execute(&mut log).unwrap();

        assert_eq!(log, vec!["w", "x", "y"]);
        assert_eq!(outer.count(), 2);
    }
}
