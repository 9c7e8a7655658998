//! Configuration errors for graph construction and loading.

use thiserror::Error;

/// Problems found while building or loading a graph.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("state name must not be empty")]
    EmptyStateName,

    #[error("wildcard '{0}' must wrap its pattern in slashes, e.g. regex:/.*/")]
    MalformedWildcard(String),

    #[error("wildcard '{raw}' is not a valid regular expression: {message}")]
    InvalidPattern { raw: String, message: String },

    #[error("unknown guard '{key}'")]
    UnknownGuard { key: String },

    #[error("unknown action '{key}'")]
    UnknownAction { key: String },

    #[error("transition source state not specified. Call .from(state)")]
    MissingFromState,

    #[error("transition target state not specified. Call .to(state)")]
    MissingToState,

    #[error("no transitions defined. Add at least one transition")]
    NoTransitions,

    #[error("row {row}: {error}")]
    Row { row: usize, error: Box<ConfigError> },

    #[error("failed to read graph definition: {0}")]
    Io(String),

    #[error("failed to parse definition: {0}")]
    Parse(String),
}

impl ConfigError {
    /// Attach the index of the loader row that caused this error.
    pub fn at_row(self, row: usize) -> Self {
        Self::Row {
            row,
            error: Box::new(self),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
