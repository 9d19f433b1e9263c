//! Tinyfsm: a minimal finite state machine runtime
//!
//! A machine is a registry of named states with exactly one active state at
//! a time. It is meant to live inside an "owner" (a game entity, a workflow
//! actor) that drives it once per tick and asks it to move between states.
//!
//! # Core Concepts
//!
//! - **State**: named unit of behavior with `enter`/`execute`/`exit` hooks,
//!   via the `State` trait
//! - **Machine**: owns the states, tracks current and previous state and
//!   runs hooks in order on every transition
//! - **History**: bounded log of the transitions a machine performed
//!
//! Everything is synchronous. Transitions happen when the owner asks for
//! them, and hook failures propagate to the caller untouched.
//!
//! # Example
//!
//! ```rust
//! use tinyfsm::{HookError, Machine, State};
//!
//! #[derive(Default)]
//! struct Sentry {
//!     alerts: u32,
//! }
//!
//! struct Patrol;
//!
//! impl State<Sentry> for Patrol {
//!     fn key(&self) -> &str {
//!         "patrol"
//!     }
//!
//!     fn is_initial_state(&self) -> bool {
//!         true
//!     }
//! }
//!
//! struct Alert;
//!
//! impl State<Sentry> for Alert {
//!     fn key(&self) -> &str {
//!         "alert"
//!     }
//!
//!     fn enter(&mut self, owner: &mut Sentry) -> Result<(), HookError> {
//!         owner.alerts += 1;
//!         Ok(())
//!     }
//! }
//!
//! let mut machine = Machine::new(Sentry::default());
//! machine.add_state(Patrol)?;
//! machine.add_state(Alert)?;
//! assert_eq!(machine.current_key(), Some("patrol"));
//!
//! machine.change_state("alert")?;
//! machine.process()?;
//! machine.revert_to_previous_state()?;
//!
//! assert_eq!(machine.current_key(), Some("patrol"));
//! assert_eq!(machine.previous_key(), Some("alert"));
//! assert_eq!(machine.owner().alerts, 1);
//! # Ok::<(), tinyfsm::MachineError>(())
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod machine;
pub mod shared;

// Re-export commonly used types
pub use crate::builder::MachineBuilder;
pub use crate::config::{ConfigError, MachineConfig};
pub use crate::core::{BasicState, HookError, State, TransitionHistory, TransitionRecord};
pub use crate::machine::{Machine, MachineError, MachineSnapshot};
pub use crate::shared::SharedMachine;
