//! Error types raised by repository implementations.

use rpg_core::EntityId;
use thiserror::Error;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("class path repository lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("no stored level for {owner} on class path {class_path}")]
    MissingLevel {
        owner: EntityId,
        class_path: String,
    },
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
