//! Transition history tracking.
//!
//! Persistence adapters that keep a log of performed transitions store it as
//! a [`StateHistory`]. History values are immutable: recording returns a new
//! history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single performed transition.
///
/// # Example
///
/// ```rust
/// use switchyard::core::TransitionRecord;
///
/// let record = TransitionRecord::new(
///     "basket",
///     "customerdata",
///     "basket_to_customerdata",
///     Some("Checkout"),
/// );
/// assert_eq!(record.event.as_deref(), Some("Checkout"));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Literal state the machine left
    pub from: String,
    /// Literal state the machine entered
    pub to: String,
    /// Name of the transition that fired
    pub transition: String,
    /// Event that triggered it, if any
    pub event: Option<String>,
    /// When the transition was accepted
    pub timestamp: DateTime<Utc>,
}

impl TransitionRecord {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        transition: impl Into<String>,
        event: Option<&str>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            transition: transition.into(),
            event: event.map(str::to_string),
            timestamp: Utc::now(),
        }
    }
}

/// Ordered history of performed transitions.
///
/// # Example
///
/// ```rust
/// use switchyard::core::{StateHistory, TransitionRecord};
///
/// let history = StateHistory::new()
///     .record(TransitionRecord::new("a", "b", "a_to_b", None))
///     .record(TransitionRecord::new("b", "c", "b_to_c", None));
///
/// assert_eq!(history.get_path(), vec!["a", "b", "c"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateHistory {
    transitions: Vec<TransitionRecord>,
}

impl StateHistory {
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    ///
    /// The existing history is left untouched.
    pub fn record(&self, transition: TransitionRecord) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// Get the path of states traversed.
    ///
    /// Returns the `from` state of the first record followed by the `to`
    /// state of every record.
    pub fn get_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(first.from.as_str());
        }
        for transition in &self.transitions {
            path.push(transition.to.as_str());
        }
        path
    }

    /// Time between the first and the last record, `None` when empty.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    pub fn last(&self) -> Option<&TransitionRecord> {
        self.transitions.last()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
