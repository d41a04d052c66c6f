//! Worker tasks that back the runtime orchestration.
//!
//! The simulation worker executes skill and progression commands, while the
//! persistence worker writes progress changes off the simulation task.

mod persistence;
mod simulation;

pub use persistence::{PersistenceError, PersistenceWorker, ProgressUpdate};
pub use simulation::{Command, SimulationWorker};
