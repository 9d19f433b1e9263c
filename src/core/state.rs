//! Core State trait for machine states.
//!
//! A state is a named unit of behavior. The machine owns every registered
//! state and drives it through three lifecycle hooks, each handed the
//! machine's owner.

use std::fmt;

/// Error type returned by lifecycle hooks.
///
/// Hook failures are never inspected by the machine. They travel back to
/// whoever triggered the hook unchanged.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Trait for machine states.
///
/// `O` is the owner type the machine was built with. Every hook has a no-op
/// default, so a state only overrides what it needs. States must be `Send`
/// so a machine can move to, or be shared with, another thread.
///
/// # Lifecycle
///
/// - `enter`: called once when the state becomes current
/// - `execute`: called once per [`Machine::process`](crate::Machine::process)
///   while the state is current
/// - `exit`: called once when the state stops being current
///
/// # Example
///
/// ```rust
/// use tinyfsm::{HookError, State};
///
/// struct Miner {
///     gold: u32,
/// }
///
/// struct Digging;
///
/// impl State<Miner> for Digging {
///     fn key(&self) -> &str {
///         "digging"
///     }
///
///     fn is_initial_state(&self) -> bool {
///         true
///     }
///
///     fn execute(&mut self, owner: &mut Miner) -> Result<(), HookError> {
///         owner.gold += 1;
///         Ok(())
///     }
/// }
///
/// let mut miner = Miner { gold: 0 };
/// let mut state = Digging;
/// state.execute(&mut miner).unwrap();
/// assert_eq!(miner.gold, 1);
/// ```
pub trait State<O>: Send {
    /// Unique identifier of this state within a machine.
    ///
    /// Must be non-empty and must not change while the state is registered.
    fn key(&self) -> &str;

    /// Whether the machine should activate this state as soon as it is
    /// registered.
    ///
    /// Default implementation returns `false`.
    fn is_initial_state(&self) -> bool {
        false
    }

    /// Called when the state becomes current.
    fn enter(&mut self, _owner: &mut O) -> Result<(), HookError> {
        Ok(())
    }

    /// Called on every tick while the state is current.
    fn execute(&mut self, _owner: &mut O) -> Result<(), HookError> {
        Ok(())
    }

    /// Called when the state stops being current.
    fn exit(&mut self, _owner: &mut O) -> Result<(), HookError> {
        Ok(())
    }
}

impl<O> fmt::Debug for dyn State<O> + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("key", &self.key())
            .field("is_initial_state", &self.is_initial_state())
            .finish()
    }
}

/// A state with a key, an initial flag and no behavior.
///
/// Useful as a placeholder mode, or for owners that only care about which
/// key is current.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasicState {
    key: String,
    is_initial: bool,
}

impl BasicState {
    /// Create a non-initial state.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            is_initial: false,
        }
    }

    /// Create the state the machine activates on registration.
    pub fn initial(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            is_initial: true,
        }
    }
}

impl<O> State<O> for BasicState {
    fn key(&self) -> &str {
        &self.key
    }

    fn is_initial_state(&self) -> bool {
        self.is_initial
    }
}
