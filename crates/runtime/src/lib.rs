//! Runtime orchestration for the skill and progression core.
//!
//! This crate wires content, repositories and worker tasks into a cohesive
//! runtime API. Consumers embed [`Runtime`] to run skills and class paths on
//! a background task, subscribe to events, and drive actors through
//! [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based stream and the physics delegate
//! - [`repository`] stores class path progress between sessions
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod events;
pub mod repository;
pub mod runtime;

mod workers;

pub use api::{
    EventHandler, ProgressSnapshot, Result, RuntimeError, RuntimeHandle, SkillOutcome,
};
pub use events::{Event, EventStream, StreamDelegate, Topic};
pub use repository::{
    ClassPathRecord, ClassPathRepository, InMemoryClassPathRepository, ProgressPatch,
    RepositoryError,
};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use workers::{PersistenceError, ProgressUpdate};
