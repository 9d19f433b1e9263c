//! Core state types.
//!
//! This module contains the building blocks the machine works with:
//! - State definitions via the `State` trait
//! - Bounded transition history

mod history;
mod state;

pub use history::{TransitionHistory, TransitionRecord};
pub use state::{BasicState, HookError, State};
