//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, repositories and progression so
//! clients can bubble them up with consistent context.

use rpg_core::{EntityId, LevelError};
use thiserror::Error;
use tokio::sync::oneshot;

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("runtime worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("actor {0} does not exist")]
    UnknownActor(EntityId),

    #[error("actor {0} already exists")]
    DuplicateActor(EntityId),

    #[error("class path {0} is not part of the loaded content")]
    UnknownClassPath(String),

    #[error("class path {class_path} is not assigned to {owner}")]
    ClassPathNotAssigned { owner: EntityId, class_path: String },

    #[error("class path {class_path} is already assigned to {owner}")]
    ClassPathAlreadyAssigned { owner: EntityId, class_path: String },

    #[error("skill {skill} is not available to {owner}")]
    UnknownSkill { owner: EntityId, skill: String },

    #[error(transparent)]
    Level(#[from] LevelError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
