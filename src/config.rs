//! Machine configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of transition records kept when no capacity is configured.
pub const DEFAULT_HISTORY_CAPACITY: usize = 32;

/// Errors that can occur when loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Input was not a valid JSON configuration
    #[error("Failed to parse machine config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunables for a [`Machine`](crate::Machine).
///
/// Missing fields fall back to their defaults, so `{}` is a valid
/// configuration.
///
/// # Example
///
/// ```rust
/// use tinyfsm::MachineConfig;
///
/// let config = MachineConfig::from_json(r#"{ "history_capacity": 4 }"#).unwrap();
/// assert_eq!(config.history_capacity, 4);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Maximum number of transitions remembered; 0 disables the history
    pub history_capacity: usize,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl MachineConfig {
    /// Parse a configuration from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Set the history capacity.
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }
}
