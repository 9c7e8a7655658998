//! Error taxonomy of the engine.
//!
//! Errors fall into two groups. Configuration and usage errors
//! ([`EngineError::is_configuration`]) mean the graph or the call is wrong and
//! retrying will not help. Faults ([`EngineError::is_fault`]) come from a
//! guard, action, entity builder or persistence adapter; the persisted state
//! is unchanged, but an action may already have partially mutated the entity.
//!
//! A guard rejecting a transition is not an error: orchestration calls return
//! `Ok(false)`.

use crate::builder::ConfigError;
use crate::context::EntityError;
use crate::effects::{ActionError, GuardError};
use crate::persistence::PersistenceError;
use thiserror::Error;

/// Errors raised by machine orchestration.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no {selector} known from state '{state}'")]
    TransitionNotFound { state: String, selector: String },

    #[error("graph declares no initial state")]
    NoInitialState,

    #[error("graph declares more than one initial state: {states:?}")]
    MultipleInitialStates { states: Vec<String> },

    #[error("target pattern '{pattern}' must match exactly one state, matched {matches:?}")]
    AmbiguousTarget {
        pattern: String,
        matches: Vec<String>,
    },

    #[error("invalid configuration: {}", join(.0))]
    InvalidConfiguration(Vec<ConfigError>),

    #[error("run stopped after {limit} unconditional transitions without settling")]
    RunLimitExceeded { limit: usize },

    #[error(transparent)]
    Guard(#[from] GuardError),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error(transparent)]
    Entity(#[from] EntityError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Result type alias using [`EngineError`].
pub type Result<T> = std::result::Result<T, EngineError>;

impl EngineError {
    /// Whether the graph definition or the call itself is at fault.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::TransitionNotFound { .. }
                | Self::NoInitialState
                | Self::MultipleInitialStates { .. }
                | Self::AmbiguousTarget { .. }
                | Self::InvalidConfiguration(_)
                | Self::RunLimitExceeded { .. }
        )
    }

    /// Whether a collaborator failed while the call was running.
    pub fn is_fault(&self) -> bool {
        !self.is_configuration()
    }
}

impl From<ConfigError> for EngineError {
    fn from(err: ConfigError) -> Self {
        Self::InvalidConfiguration(vec![err])
    }
}

fn join(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
