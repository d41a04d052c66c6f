//! Command implementations for the CLI
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod duel;
mod inspect;

pub use duel::Duel;
pub use inspect::Inspect;
