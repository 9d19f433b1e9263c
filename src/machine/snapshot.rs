//! Read-only, serializable view of a machine.

use crate::core::TransitionRecord;
use serde::{Deserialize, Serialize};

/// Point-in-time view of a machine's registry and transition log.
///
/// Snapshots are meant for debugging and diagnostics. They carry state keys
/// only, never the states themselves, and cannot be turned back into a
/// machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MachineSnapshot {
    /// Key of the current state
    pub current: Option<String>,
    /// Key of the state that was current before the last transition
    pub previous: Option<String>,
    /// Key of the state registered as initial
    pub initial: Option<String>,
    /// Keys of all registered states, in registration order
    pub states: Vec<String>,
    /// Recorded transitions, oldest first
    pub history: Vec<TransitionRecord>,
}
