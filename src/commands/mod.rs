//! Task Command Wrappers
//!
//! Frontend bindings to the optimistic coordinator, organized by domain.

mod task;

pub use task::*;
