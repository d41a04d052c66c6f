//! Persistence contracts for class path progress.
//!
//! The core never persists anything; the runtime listens to level and
//! experience events and writes progress through these repositories.

mod error;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use memory::InMemoryClassPathRepository;
pub use traits::{ClassPathRecord, ClassPathRepository, ProgressPatch};
