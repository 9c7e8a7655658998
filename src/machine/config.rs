//! Runtime settings of a machine.

use crate::builder::ConfigError;
use serde::{Deserialize, Serialize};

/// Default cap on unconditional transitions taken by one `run()` call.
pub const DEFAULT_MAX_RUN_STEPS: usize = 1024;

/// Settings for [`StateMachine`](super::StateMachine).
///
/// ```rust
/// use switchyard::machine::MachineConfig;
///
/// let config = MachineConfig::from_json_str(r#"{ "max_run_steps": 16 }"#).unwrap();
/// assert_eq!(config.max_run_steps, 16);
///
/// let defaults = MachineConfig::from_json_str("{}").unwrap();
/// assert_eq!(defaults, MachineConfig::default());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// `run()` fails once it has taken this many transitions in one call,
    /// which stops cycles of unconditional transitions.
    pub max_run_steps: usize,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            max_run_steps: DEFAULT_MAX_RUN_STEPS,
        }
    }
}

impl MachineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_max_run_steps(mut self, max_run_steps: usize) -> Self {
        self.max_run_steps = max_run_steps;
        self
    }
}
