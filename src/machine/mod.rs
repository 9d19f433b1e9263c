//! The state machine: registry of states plus transition driver.
//!
//! States live in an arena owned by the machine. The current, previous and
//! initial states are tracked as indices into that arena, and a key index
//! maps state keys to arena slots.

mod error;
mod snapshot;

pub use error::MachineError;
pub use snapshot::MachineSnapshot;

use crate::config::MachineConfig;
use crate::core::{HookError, State, TransitionHistory, TransitionRecord};
use chrono::Utc;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, trace, warn};

/// Position of a registered state in the machine's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct StateId(usize);

#[derive(Clone, Copy, Debug)]
enum Hook {
    Enter,
    Execute,
    Exit,
}

impl Hook {
    fn as_str(self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Execute => "execute",
            Self::Exit => "exit",
        }
    }
}

/// Finite state machine with one active state at a time.
///
/// The machine is bound to an owner value of type `O` for its whole
/// lifetime. It never inspects the owner, it only hands it to the hooks of
/// the states it drives.
///
/// # Example
///
/// ```rust
/// use tinyfsm::{BasicState, Machine};
///
/// let mut machine = Machine::new(());
/// machine.add_state(BasicState::initial("idle")).unwrap();
/// machine.add_state(BasicState::new("walking")).unwrap();
/// assert_eq!(machine.current_key(), Some("idle"));
///
/// machine.change_state("walking").unwrap();
/// assert_eq!(machine.current_key(), Some("walking"));
/// assert_eq!(machine.previous_key(), Some("idle"));
///
/// machine.revert_to_previous_state().unwrap();
/// assert_eq!(machine.current_key(), Some("idle"));
/// assert_eq!(machine.previous_key(), Some("walking"));
/// ```
pub struct Machine<O> {
    owner: O,
    states: Vec<Box<dyn State<O>>>,
    index: HashMap<String, StateId>,
    current: Option<StateId>,
    previous: Option<StateId>,
    initial: Option<StateId>,
    history: TransitionHistory,
    config: MachineConfig,
}

impl<O> Machine<O> {
    /// Create an empty machine bound to `owner`, with default configuration.
    pub fn new(owner: O) -> Self {
        Self::with_config(owner, MachineConfig::default())
    }

    /// Create an empty machine bound to `owner`.
    pub fn with_config(owner: O, config: MachineConfig) -> Self {
        Self {
            owner,
            states: Vec::new(),
            index: HashMap::new(),
            current: None,
            previous: None,
            initial: None,
            history: TransitionHistory::with_capacity(config.history_capacity),
            config,
        }
    }

    /// Register a state.
    ///
    /// Registering the state flagged as initial immediately transitions to
    /// it, which runs its `enter` hook.
    ///
    /// # Errors
    ///
    /// - [`MachineError::InvalidState`] if the key is empty
    /// - [`MachineError::DuplicateState`] if the key is already registered
    /// - [`MachineError::MultipleInitialStates`] if the state is initial and
    ///   an initial state is already registered
    /// - [`MachineError::Hook`] if the initial state's activation fails
    ///
    /// The registry is left unchanged by the first three.
    pub fn add_state<S>(&mut self, state: S) -> Result<(), MachineError>
    where
        S: State<O> + 'static,
    {
        self.add_boxed_state(Box::new(state))
    }

    /// Register an already boxed state. See [`Machine::add_state`].
    pub fn add_boxed_state(&mut self, state: Box<dyn State<O>>) -> Result<(), MachineError> {
        let key = state.key();
        if key.is_empty() {
            return Err(MachineError::InvalidState {
                key: key.to_string(),
            });
        }
        if self.index.contains_key(key) {
            return Err(MachineError::DuplicateState {
                key: key.to_string(),
            });
        }
        let is_initial = state.is_initial_state();
        if is_initial {
            if let Some(existing) = self.initial {
                return Err(MachineError::MultipleInitialStates {
                    existing: self.key_of(existing).to_string(),
                    rejected: key.to_string(),
                });
            }
        }

        let id = StateId(self.states.len());
        let key = key.to_string();
        debug!(key = %key, initial = is_initial, "registered state");
        self.index.insert(key, id);
        self.states.push(state);

        if is_initial {
            self.initial = Some(id);
            self.transition_to(id)?;
        }
        Ok(())
    }

    /// Make the state registered under `key` the current state.
    ///
    /// The old current state's `exit` runs before the current state is
    /// reassigned, and the new state's `enter` runs after. Changing to the
    /// state that is already current exits and re-enters it.
    ///
    /// # Errors
    ///
    /// - [`MachineError::StateNotFound`] if no state has this key; nothing
    ///   is changed
    /// - [`MachineError::Hook`] if `exit` or `enter` fails. A failed `exit`
    ///   leaves the machine untouched, a failed `enter` leaves the new state
    ///   current.
    pub fn change_state(&mut self, key: &str) -> Result<(), MachineError> {
        let target = self.lookup(key)?;
        self.transition_to(target)
    }

    /// Transition back to the previous state.
    ///
    /// This is an ordinary transition, so afterwards the previous state is
    /// the one reverted from: reverting twice toggles between the two most
    /// recent states. Does nothing if there is no previous state.
    pub fn revert_to_previous_state(&mut self) -> Result<(), MachineError> {
        match self.previous {
            Some(previous) => self.transition_to(previous),
            None => {
                trace!("no previous state to revert to");
                Ok(())
            }
        }
    }

    /// Run the current state's `execute` hook once.
    ///
    /// Does nothing if no state is current.
    pub fn process(&mut self) -> Result<(), MachineError> {
        let Some(current) = self.current else {
            return Ok(());
        };
        trace!(key = %self.key_of(current), "executing state");
        let result = self.states[current.0].execute(&mut self.owner);
        self.check_hook(current, Hook::Execute, result)
    }

    /// Currently active state.
    pub fn current_state(&self) -> Option<&dyn State<O>> {
        self.current.map(|id| self.states[id.0].as_ref())
    }

    /// State that was current before the last transition.
    pub fn previous_state(&self) -> Option<&dyn State<O>> {
        self.previous.map(|id| self.states[id.0].as_ref())
    }

    /// The state registered as initial, if any.
    pub fn initial_state(&self) -> Option<&dyn State<O>> {
        self.initial.map(|id| self.states[id.0].as_ref())
    }

    /// Key of the current state.
    pub fn current_key(&self) -> Option<&str> {
        self.current.map(|id| self.key_of(id))
    }

    /// Key of the state that was current before the last transition.
    pub fn previous_key(&self) -> Option<&str> {
        self.previous.map(|id| self.key_of(id))
    }

    /// Check whether the state registered under `key` is current.
    pub fn is_in_state(&self, key: &str) -> bool {
        self.current_key() == Some(key)
    }

    /// Look up a registered state by key.
    pub fn state(&self, key: &str) -> Option<&dyn State<O>> {
        self.index.get(key).map(|id| self.states[id.0].as_ref())
    }

    /// Check whether a state is registered under `key`.
    pub fn contains_state(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Keys of all registered states, in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.states.iter().map(|state| state.key())
    }

    /// Number of registered states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Check whether no state is registered.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// The owner handed to every hook.
    pub fn owner(&self) -> &O {
        &self.owner
    }

    /// Mutable access to the owner, for the embedding application.
    pub fn owner_mut(&mut self) -> &mut O {
        &mut self.owner
    }

    /// Consume the machine, dropping its states and returning the owner.
    pub fn into_owner(self) -> O {
        self.owner
    }

    /// Transitions performed so far, bounded by the configured capacity.
    pub fn history(&self) -> &TransitionHistory {
        &self.history
    }

    /// Configuration the machine was created with.
    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Serializable view of the machine for debugging and diagnostics.
    pub fn snapshot(&self) -> MachineSnapshot {
        MachineSnapshot {
            current: self.current_key().map(str::to_string),
            previous: self.previous_key().map(str::to_string),
            initial: self.initial.map(|id| self.key_of(id).to_string()),
            states: self.keys().map(str::to_string).collect(),
            history: self.history.iter().cloned().collect(),
        }
    }

    fn lookup(&self, key: &str) -> Result<StateId, MachineError> {
        self.index
            .get(key)
            .copied()
            .ok_or_else(|| MachineError::StateNotFound {
                key: key.to_string(),
            })
    }

    fn key_of(&self, id: StateId) -> &str {
        self.states[id.0].key()
    }

    fn transition_to(&mut self, target: StateId) -> Result<(), MachineError> {
        if let Some(current) = self.current {
            let result = self.states[current.0].exit(&mut self.owner);
            self.check_hook(current, Hook::Exit, result)?;
        }

        let from = self.current.map(|id| self.key_of(id).to_string());
        let to = self.key_of(target).to_string();
        debug!(from = ?from, to = %to, "state transition");

        self.previous = self.current;
        self.current = Some(target);
        self.history.record(TransitionRecord {
            from,
            to,
            timestamp: Utc::now(),
        });

        let result = self.states[target.0].enter(&mut self.owner);
        self.check_hook(target, Hook::Enter, result)
    }

    fn check_hook(
        &self,
        id: StateId,
        hook: Hook,
        result: Result<(), HookError>,
    ) -> Result<(), MachineError> {
        result.map_err(|source| {
            warn!(
                key = %self.key_of(id),
                hook = hook.as_str(),
                error = %source,
                "state hook failed"
            );
            MachineError::Hook(source)
        })
    }
}

impl<O: fmt::Debug> fmt::Debug for Machine<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("owner", &self.owner)
            .field("states", &self.keys().collect::<Vec<_>>())
            .field("current", &self.current_key())
            .field("previous", &self.previous_key())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BasicState;

    /// Owner that logs every hook call as "<hook>:<key>".
    #[derive(Default, Debug)]
    struct Journal {
        events: Vec<String>,
    }

    struct Logged {
        key: &'static str,
        initial: bool,
        fail_on: Option<&'static str>,
    }

    impl Logged {
        fn new(key: &'static str) -> Self {
            Self {
                key,
                initial: false,
                fail_on: None,
            }
        }

        fn initial(key: &'static str) -> Self {
            Self {
                initial: true,
                ..Self::new(key)
            }
        }

        fn failing(mut self, hook: &'static str) -> Self {
            self.fail_on = Some(hook);
            self
        }

        fn log(&self, hook: &str, owner: &mut Journal) -> Result<(), HookError> {
            owner.events.push(format!("{}:{}", hook, self.key));
            if self.fail_on == Some(hook) {
                return Err(format!("{} failed in {}", hook, self.key).into());
            }
            Ok(())
        }
    }

    impl State<Journal> for Logged {
        fn key(&self) -> &str {
            self.key
        }

        fn is_initial_state(&self) -> bool {
            self.initial
        }

        fn enter(&mut self, owner: &mut Journal) -> Result<(), HookError> {
            self.log("enter", owner)
        }

        fn execute(&mut self, owner: &mut Journal) -> Result<(), HookError> {
            self.log("execute", owner)
        }

        fn exit(&mut self, owner: &mut Journal) -> Result<(), HookError> {
            self.log("exit", owner)
        }
    }

    fn two_state_machine() -> Machine<Journal> {
        let mut machine = Machine::new(Journal::default());
        machine.add_state(Logged::initial("s0")).unwrap();
        machine.add_state(Logged::new("s1")).unwrap();
        machine
    }

    #[test]
    fn new_machine_is_empty() {
        let machine: Machine<()> = Machine::new(());
        assert!(machine.is_empty());
        assert!(machine.current_state().is_none());
        assert!(machine.previous_state().is_none());
        assert!(machine.initial_state().is_none());
    }

    #[test]
    fn initial_state_is_activated_on_registration() {
        let machine = two_state_machine();

        assert_eq!(machine.current_key(), Some("s0"));
        assert!(machine.previous_state().is_none());
        assert_eq!(machine.initial_state().unwrap().key(), "s0");
        assert_eq!(machine.owner().events, vec!["enter:s0"]);
    }

    #[test]
    fn non_initial_registration_does_not_activate() {
        let mut machine = Machine::new(Journal::default());
        machine.add_state(Logged::new("s1")).unwrap();

        assert!(machine.current_state().is_none());
        assert!(machine.owner().events.is_empty());
    }

    #[test]
    fn empty_key_is_invalid() {
        let mut machine: Machine<()> = Machine::new(());
        let result = machine.add_state(BasicState::new(""));

        assert!(matches!(result, Err(MachineError::InvalidState { .. })));
        assert!(machine.is_empty());
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let mut machine = two_state_machine();
        let result = machine.add_state(Logged::new("s0"));

        assert!(matches!(
            result,
            Err(MachineError::DuplicateState { ref key }) if key == "s0"
        ));
        assert_eq!(machine.len(), 2);
    }

    #[test]
    fn second_initial_state_is_rejected() {
        let mut machine = two_state_machine();
        let result = machine.add_state(Logged::initial("s2"));

        match result {
            Err(MachineError::MultipleInitialStates { existing, rejected }) => {
                assert_eq!(existing, "s0");
                assert_eq!(rejected, "s2");
            }
            other => panic!("expected MultipleInitialStates, got {:?}", other),
        }
        assert!(!machine.contains_state("s2"));
        assert_eq!(machine.current_key(), Some("s0"));
    }

    #[test]
    fn change_state_runs_exit_then_enter() {
        let mut machine = two_state_machine();
        machine.change_state("s1").unwrap();

        assert_eq!(machine.current_key(), Some("s1"));
        assert_eq!(machine.previous_key(), Some("s0"));
        assert_eq!(
            machine.owner().events,
            vec!["enter:s0", "exit:s0", "enter:s1"]
        );
    }

    #[test]
    fn change_state_to_unknown_key_changes_nothing() {
        let mut machine = two_state_machine();
        machine.change_state("s1").unwrap();

        let result = machine.change_state("missing");

        assert!(matches!(
            result,
            Err(MachineError::StateNotFound { ref key }) if key == "missing"
        ));
        assert_eq!(machine.current_key(), Some("s1"));
        assert_eq!(machine.previous_key(), Some("s0"));
    }

    #[test]
    fn change_state_to_current_reenters() {
        let mut machine = two_state_machine();
        machine.change_state("s0").unwrap();

        assert_eq!(machine.current_key(), Some("s0"));
        assert_eq!(machine.previous_key(), Some("s0"));
        assert_eq!(
            machine.owner().events,
            vec!["enter:s0", "exit:s0", "enter:s0"]
        );
    }

    #[test]
    fn change_state_without_current_state() {
        let mut machine = Machine::new(Journal::default());
        machine.add_state(Logged::new("s1")).unwrap();

        machine.change_state("s1").unwrap();

        assert_eq!(machine.current_key(), Some("s1"));
        assert!(machine.previous_state().is_none());
        assert_eq!(machine.owner().events, vec!["enter:s1"]);
    }

    #[test]
    fn revert_toggles_between_last_two_states() {
        let mut machine = two_state_machine();
        machine.change_state("s1").unwrap();

        machine.revert_to_previous_state().unwrap();
        assert_eq!(machine.current_key(), Some("s0"));
        assert_eq!(machine.previous_key(), Some("s1"));

        machine.revert_to_previous_state().unwrap();
        assert_eq!(machine.current_key(), Some("s1"));
        assert_eq!(machine.previous_key(), Some("s0"));
    }

    #[test]
    fn revert_without_previous_is_a_no_op() {
        let mut machine = two_state_machine();
        machine.revert_to_previous_state().unwrap();

        assert_eq!(machine.current_key(), Some("s0"));
        assert!(machine.previous_state().is_none());
        assert_eq!(machine.owner().events, vec!["enter:s0"]);
    }

    #[test]
    fn process_executes_current_state() {
        let mut machine = two_state_machine();
        machine.process().unwrap();
        machine.change_state("s1").unwrap();
        machine.process().unwrap();

        assert_eq!(
            machine.owner().events,
            vec!["enter:s0", "execute:s0", "exit:s0", "enter:s1", "execute:s1"]
        );
    }

    #[test]
    fn process_without_current_state_is_a_no_op() {
        let mut machine = Machine::new(Journal::default());
        machine.add_state(Logged::new("s1")).unwrap();

        assert!(machine.process().is_ok());
        assert!(machine.owner().events.is_empty());
    }

    #[test]
    fn failing_exit_leaves_machine_untouched() {
        let mut machine = Machine::new(Journal::default());
        machine
            .add_state(Logged::initial("s0").failing("exit"))
            .unwrap();
        machine.add_state(Logged::new("s1")).unwrap();

        let result = machine.change_state("s1");

        assert!(matches!(result, Err(MachineError::Hook(_))));
        assert_eq!(machine.current_key(), Some("s0"));
        assert!(machine.previous_state().is_none());
        assert_eq!(machine.owner().events, vec!["enter:s0", "exit:s0"]);
    }

    #[test]
    fn failing_enter_leaves_new_state_current() {
        let mut machine = two_state_machine();
        machine
            .add_state(Logged::new("s2").failing("enter"))
            .unwrap();

        let err = machine.change_state("s2").unwrap_err();

        assert_eq!(err.to_string(), "enter failed in s2");
        assert_eq!(machine.current_key(), Some("s2"));
        assert_eq!(machine.previous_key(), Some("s0"));
    }

    #[test]
    fn failing_execute_propagates_unchanged() {
        let mut machine = Machine::new(Journal::default());
        machine
            .add_state(Logged::initial("s0").failing("execute"))
            .unwrap();

        let err = machine.process().unwrap_err();
        let source = err.into_hook_error().unwrap();

        assert_eq!(source.to_string(), "execute failed in s0");
        assert_eq!(machine.current_key(), Some("s0"));
    }

    #[test]
    fn failing_initial_enter_surfaces_from_add_state() {
        let mut machine = Machine::new(Journal::default());
        let result = machine.add_state(Logged::initial("s0").failing("enter"));

        assert!(matches!(result, Err(MachineError::Hook(_))));
        assert!(machine.contains_state("s0"));
        assert_eq!(machine.current_key(), Some("s0"));
    }

    #[test]
    fn late_initial_state_transitions_from_current() {
        let mut machine = Machine::new(Journal::default());
        machine.add_state(Logged::new("s1")).unwrap();
        machine.change_state("s1").unwrap();
        machine.add_state(Logged::initial("s0")).unwrap();

        assert_eq!(machine.current_key(), Some("s0"));
        assert_eq!(machine.previous_key(), Some("s1"));
    }

    #[test]
    fn history_records_transitions() {
        let mut machine = two_state_machine();
        machine.change_state("s1").unwrap();
        machine.revert_to_previous_state().unwrap();

        let history = machine.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history.iter().next().unwrap().from, None);
        assert_eq!(history.get_path(), vec!["s0", "s1", "s0"]);
    }

    #[test]
    fn zero_history_capacity_records_nothing() {
        let mut machine = Machine::with_config(
            Journal::default(),
            MachineConfig::default().history_capacity(0),
        );
        machine.add_state(Logged::initial("s0")).unwrap();

        assert!(machine.history().is_empty());
        assert_eq!(machine.config().history_capacity, 0);
    }

    #[test]
    fn keys_follow_registration_order() {
        let mut machine = two_state_machine();
        machine.add_state(Logged::new("a")).unwrap();

        let keys: Vec<_> = machine.keys().collect();
        assert_eq!(keys, vec!["s0", "s1", "a"]);
        assert!(machine.state("a").is_some());
        assert!(machine.state("b").is_none());
        assert!(machine.is_in_state("s0"));
        assert!(!machine.is_in_state("a"));
    }

    #[test]
    fn owner_is_returned_with_hook_effects() {
        let mut machine = two_state_machine();
        machine.owner_mut().events.clear();
        machine.process().unwrap();

        let journal = machine.into_owner();
        assert_eq!(journal.events, vec!["execute:s0"]);
    }

    #[test]
    fn debug_lists_keys() {
        let machine = two_state_machine();
        let debug = format!("{:?}", machine);
        assert!(debug.contains("\"s0\""));
        assert!(debug.contains("current: Some(\"s0\")"));
    }
}
