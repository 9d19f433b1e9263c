//! Builder API for ergonomic machine construction.

pub mod machine;

pub use machine::MachineBuilder;
