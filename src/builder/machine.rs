//! Builder for constructing machines.

use crate::config::MachineConfig;
use crate::core::State;
use crate::machine::{Machine, MachineError};

/// Builder for constructing machines with a fluent API.
///
/// States are registered in the order they were added when
/// [`build`](MachineBuilder::build) runs, so the initial state's `enter`
/// hook fires during `build`.
///
/// # Example
///
/// ```rust
/// use tinyfsm::{BasicState, MachineBuilder};
///
/// let machine = MachineBuilder::new(())
///     .history_capacity(8)
///     .state(BasicState::initial("idle"))
///     .state(BasicState::new("walking"))
///     .build()
///     .unwrap();
///
/// assert_eq!(machine.current_key(), Some("idle"));
/// assert_eq!(machine.history().capacity(), 8);
/// ```
pub struct MachineBuilder<O> {
    owner: O,
    config: MachineConfig,
    states: Vec<Box<dyn State<O>>>,
}

impl<O> MachineBuilder<O> {
    /// Create a builder for a machine bound to `owner`.
    pub fn new(owner: O) -> Self {
        Self {
            owner,
            config: MachineConfig::default(),
            states: Vec::new(),
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set how many transitions the machine remembers.
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.config.history_capacity = capacity;
        self
    }

    /// Add a state.
    pub fn state<S>(mut self, state: S) -> Self
    where
        S: State<O> + 'static,
    {
        self.states.push(Box::new(state));
        self
    }

    /// Add multiple boxed states at once.
    pub fn states<I>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn State<O>>>,
    {
        self.states.extend(states);
        self
    }

    /// Build the machine, registering every state.
    ///
    /// Fails with the first registration error, see
    /// [`Machine::add_state`].
    pub fn build(self) -> Result<Machine<O>, MachineError> {
        let mut machine = Machine::with_config(self.owner, self.config);
        for state in self.states {
            machine.add_boxed_state(state)?;
        }
        Ok(machine)
    }
}
