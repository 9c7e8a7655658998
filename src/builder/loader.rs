//! Bulk graph loading from tabular definitions.
//!
//! Each [`LoaderRow`] describes one transition by symbolic references. Rows
//! are validated as a whole before anything is built: every malformed
//! wildcard and unknown guard or action key is reported in one
//! [`EngineError::InvalidConfiguration`], not just the first.

use crate::builder::error::ConfigError;
use crate::builder::registry::{Registry, ALWAYS_TRUE, NO_OP};
use crate::core::{Graph, State, StateKind, StateMatcher, Transition};
use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use tracing::{debug, warn};

type Check = Validation<(), NonEmptyVec<ConfigError>>;

/// One transition in a bulk definition.
///
/// # Example
///
/// ```rust
/// use switchyard::builder::LoaderRow;
/// use switchyard::core::StateKind;
///
/// let row = LoaderRow::new("payment", "complete", "IsPaid", "noop")
///     .with_kinds(None, Some(StateKind::Final))
///     .with_event("ready");
///
/// assert_eq!(row.to_kind, Some(StateKind::Final));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoaderRow {
    pub from: String,
    pub to: String,
    #[serde(default = "default_guard")]
    pub guard: String,
    #[serde(default = "default_action")]
    pub action: String,
    #[serde(default)]
    pub from_kind: Option<StateKind>,
    #[serde(default)]
    pub to_kind: Option<StateKind>,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

fn default_guard() -> String {
    ALWAYS_TRUE.to_string()
}

fn default_action() -> String {
    NO_OP.to_string()
}

impl LoaderRow {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        guard: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            guard: guard.into(),
            action: action.into(),
            from_kind: None,
            to_kind: None,
            event: None,
            name: None,
        }
    }

    /// Unconditional no-op row.
    pub fn unconditional(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(from, to, ALWAYS_TRUE, NO_OP)
    }

    pub fn with_kinds(mut self, from_kind: Option<StateKind>, to_kind: Option<StateKind>) -> Self {
        self.from_kind = from_kind;
        self.to_kind = to_kind;
        self
    }

    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    fn checks<E: 'static>(&self, index: usize, registry: &Registry<E>) -> Vec<Check> {
        let matcher = |raw: &str| match StateMatcher::parse(raw) {
            Ok(_) => Validation::success(()),
            Err(err) => Validation::fail(err.at_row(index)),
        };
        let guard = if registry.has_guard(&self.guard) {
            Validation::success(())
        } else {
            Validation::fail(
                ConfigError::UnknownGuard {
                    key: self.guard.clone(),
                }
                .at_row(index),
            )
        };
        let action = if registry.has_action(&self.action) {
            Validation::success(())
        } else {
            Validation::fail(
                ConfigError::UnknownAction {
                    key: self.action.clone(),
                }
                .at_row(index),
            )
        };
        vec![matcher(&self.from), matcher(&self.to), guard, action]
    }

    fn build<E: 'static>(&self, registry: &Registry<E>) -> Result<Transition<E>> {
        let mut transition = Transition::new(
            StateMatcher::parse(&self.from)?,
            StateMatcher::parse(&self.to)?,
        )
        .with_guard(registry.guard(&self.guard)?)
        .with_action(registry.action(&self.action)?);
        if let Some(event) = &self.event {
            transition = transition.with_event(event.clone());
        }
        if let Some(name) = &self.name {
            transition = transition.with_name(name.clone());
        }
        Ok(transition)
    }
}

/// A serialized graph definition.
///
/// ```rust
/// use switchyard::builder::GraphDefinition;
///
/// let definition = GraphDefinition::from_json_str(r#"{
///     "transitions": [
///         { "from": "new", "to": "done", "from_kind": "initial", "to_kind": "final" }
///     ]
/// }"#).unwrap();
///
/// assert_eq!(definition.transitions[0].guard, "true");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDefinition {
    #[serde(default)]
    pub machine: Option<String>,
    pub transitions: Vec<LoaderRow>,
}

impl GraphDefinition {
    pub fn from_json_str(json: &str) -> std::result::Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> std::result::Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn load<E: 'static>(&self, registry: &Registry<E>) -> Result<Graph<E>> {
        load(&self.transitions, registry)
    }
}

/// Validate every row, then build the graph in row order.
///
/// Kinds given on a row are applied to exact endpoints only; a kind on a
/// wildcard endpoint is ignored.
pub fn load<E: 'static>(rows: &[LoaderRow], registry: &Registry<E>) -> Result<Graph<E>> {
    validate(rows, registry)?;

    let mut graph = Graph::new();
    for row in rows {
        for (raw, kind) in [(&row.from, row.from_kind), (&row.to, row.to_kind)] {
            if let (Some(kind), Ok(StateMatcher::Exact(name))) = (kind, StateMatcher::parse(raw)) {
                graph.add_state(State::new(name, kind));
            }
        }
        graph.add_transition(row.build(registry)?);
    }
    debug!(
        transitions = graph.transitions().len(),
        states = graph.states().len(),
        "loaded graph definition"
    );
    Ok(graph)
}

/// Check all rows, accumulating every problem.
pub fn validate<E: 'static>(rows: &[LoaderRow], registry: &Registry<E>) -> Result<()> {
    if rows.is_empty() {
        return Err(ConfigError::NoTransitions.into());
    }

    let checks: Vec<Check> = rows
        .iter()
        .enumerate()
        .flat_map(|(index, row)| row.checks(index, registry))
        .collect();

    match Validation::all_vec(checks) {
        Validation::Success(_) => Ok(()),
        Validation::Failure(errors) => {
            let errors: Vec<ConfigError> = errors.iter().cloned().collect();
            warn!(count = errors.len(), "rejected graph definition");
            Err(EngineError::InvalidConfiguration(errors))
        }
    }
}
