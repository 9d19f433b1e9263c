//! Errors raised by machine operations.

use crate::core::HookError;
use thiserror::Error;

/// Errors that can occur when registering states or changing state.
#[derive(Debug, Error)]
pub enum MachineError {
    /// The state's key is empty
    #[error("'{key}' is not a valid state key")]
    InvalidState { key: String },

    /// A state with the same key is already registered
    #[error("State key '{key}' already exists")]
    DuplicateState { key: String },

    /// A second state flagged as initial was registered
    #[error("At most one initial state is allowed: '{existing}' is already initial, rejected '{rejected}'")]
    MultipleInitialStates { existing: String, rejected: String },

    /// No state is registered under the key
    #[error("No state was found with the key '{key}'")]
    StateNotFound { key: String },

    /// A state's enter/execute/exit hook failed
    #[error(transparent)]
    Hook(HookError),

    /// A shared machine's lock was poisoned by a panicking hook
    #[error("Machine lock poisoned by a panic in a previous operation")]
    LockPoisoned,
}

impl MachineError {
    /// Returns the hook failure, if this error came from a state's hook.
    pub fn into_hook_error(self) -> Option<HookError> {
        match self {
            Self::Hook(source) => Some(source),
            _ => None,
        }
    }
}
