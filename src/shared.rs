//! Thread-safe handle to a machine.
//!
//! `Machine` does no locking of its own. `SharedMachine` puts the whole
//! machine behind one mutex, so every operation, hooks included, runs as a
//! single critical section.

use crate::core::State;
use crate::machine::{Machine, MachineError, MachineSnapshot};
use std::sync::{Arc, Mutex, MutexGuard};

/// Cloneable, mutex-guarded handle to a [`Machine`].
///
/// # Example
///
/// ```rust
/// use tinyfsm::{BasicState, Machine, SharedMachine};
/// use std::thread;
///
/// let shared = SharedMachine::new(Machine::new(()));
/// shared.add_state(BasicState::initial("idle")).unwrap();
/// shared.add_state(BasicState::new("busy")).unwrap();
///
/// let worker = shared.clone();
/// thread::spawn(move || worker.change_state("busy").unwrap())
///     .join()
///     .unwrap();
///
/// assert_eq!(shared.current_key().unwrap().as_deref(), Some("busy"));
/// ```
pub struct SharedMachine<O> {
    inner: Arc<Mutex<Machine<O>>>,
}

impl<O> Clone for SharedMachine<O> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<O> SharedMachine<O> {
    /// Wrap `machine` in a new shared handle.
    pub fn new(machine: Machine<O>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(machine)),
        }
    }

    /// Run `f` with exclusive access to the machine.
    pub fn with<R>(&self, f: impl FnOnce(&mut Machine<O>) -> R) -> Result<R, MachineError> {
        let mut machine = self.lock()?;
        Ok(f(&mut machine))
    }

    /// Register a state. See [`Machine::add_state`].
    pub fn add_state<S>(&self, state: S) -> Result<(), MachineError>
    where
        S: State<O> + 'static,
    {
        self.lock()?.add_state(state)
    }

    /// Make another state current. See [`Machine::change_state`].
    pub fn change_state(&self, key: &str) -> Result<(), MachineError> {
        self.lock()?.change_state(key)
    }

    /// Transition back to the previous state. See [`Machine::revert_to_previous_state`].
    pub fn revert_to_previous_state(&self) -> Result<(), MachineError> {
        self.lock()?.revert_to_previous_state()
    }

    /// Run the current state's `execute` hook once. See [`Machine::process`].
    pub fn process(&self) -> Result<(), MachineError> {
        self.lock()?.process()
    }

    /// Owned copy of the current state's key.
    pub fn current_key(&self) -> Result<Option<String>, MachineError> {
        Ok(self.lock()?.current_key().map(str::to_string))
    }

    /// Owned copy of the previous state's key.
    pub fn previous_key(&self) -> Result<Option<String>, MachineError> {
        Ok(self.lock()?.previous_key().map(str::to_string))
    }

    /// Serializable view of the machine. See [`Machine::snapshot`].
    pub fn snapshot(&self) -> Result<MachineSnapshot, MachineError> {
        Ok(self.lock()?.snapshot())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Machine<O>>, MachineError> {
        self.inner.lock().map_err(|_| MachineError::LockPoisoned)
    }
}
