//! Persistence worker for class path progress.
//!
//! Level-up and experience handlers registered on the core bus push
//! [`ProgressUpdate`]s into a bounded channel; this worker drains it and
//! writes through the [`ClassPathRepository`]. Handlers never block the
//! simulation: a full queue drops the update and counts as a handler failure.

use std::sync::Arc;

use rpg_core::{EntityId, EventBus, EventName, GameEvent, HookError, HookFlow};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::repository::{ClassPathRepository, ProgressPatch, RepositoryError};

/// Result type for persistence operations
pub type Result<T> = std::result::Result<T, PersistenceError>;

/// Errors that can occur during persistence operations
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("persistence queue is full")]
    QueueFull,

    #[error("persistence worker stopped")]
    QueueClosed,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// One progress change waiting to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub owner: EntityId,
    pub patch: ProgressPatch,
}

impl ProgressUpdate {
    /// Extracts the update carried by a level or experience event.
    ///
    /// Every progress event carries both the level and the (capped) total, so
    /// each patch is a complete record and never depends on what is stored.
    pub fn from_event(event: &GameEvent) -> Option<Self> {
        let (owner, track, level, experience) = match event {
            GameEvent::LevelUp {
                owner,
                track,
                level,
                experience,
            }
            | GameEvent::LevelDown {
                owner,
                track,
                level,
                experience,
            }
            | GameEvent::ExperienceAdded {
                owner,
                track,
                level,
                total: experience,
                ..
            } => (*owner, track, *level, *experience),
            _ => return None,
        };
        Some(Self {
            owner,
            patch: ProgressPatch::level(track.clone(), level, experience),
        })
    }
}

/// Registers the persistence handlers of `owner` on the core bus.
///
/// Every handler shares the `persistence:<owner>` removal key.
pub fn register_progress_hooks(
    bus: &mut EventBus,
    owner: EntityId,
    updates: &mpsc::Sender<ProgressUpdate>,
) {
    let remove_key = format!("persistence:{}", owner.0);
    for name in [
        EventName::LevelUp,
        EventName::LevelDown,
        EventName::ExperienceAdded,
    ] {
        let key = bus.event_key(owner, name);
        let updates = updates.clone();
        bus.subscribe_with_key(
            key,
            move |event| {
                let Some(update) = ProgressUpdate::from_event(event) else {
                    return Ok(HookFlow::Continue);
                };
                updates.try_send(update).map_err(|err| {
                    let err = match err {
                        mpsc::error::TrySendError::Full(_) => PersistenceError::QueueFull,
                        mpsc::error::TrySendError::Closed(_) => PersistenceError::QueueClosed,
                    };
                    HookError::new(err.to_string())
                })?;
                Ok(HookFlow::Continue)
            },
            remove_key.clone(),
        );
    }
}

/// Background worker that writes progress updates
pub struct PersistenceWorker {
    repository: Arc<dyn ClassPathRepository>,
    update_rx: mpsc::Receiver<ProgressUpdate>,
}

impl PersistenceWorker {
    pub fn new(
        repository: Arc<dyn ClassPathRepository>,
        update_rx: mpsc::Receiver<ProgressUpdate>,
    ) -> Self {
        Self {
            repository,
            update_rx,
        }
    }

    /// Main worker loop; ends once every sender is dropped.
    pub async fn run(mut self) {
        info!(target: "runtime::persistence", "PersistenceWorker started");

        while let Some(update) = self.update_rx.recv().await {
            if let Err(e) = self.apply(&update) {
                error!(
                    target: "runtime::persistence",
                    owner = %update.owner,
                    class_path = %update.patch.class_path,
                    error = %e,
                    "failed to persist progress"
                );
            }
        }

        info!(target: "runtime::persistence", "PersistenceWorker stopped");
    }

    fn apply(&self, update: &ProgressUpdate) -> Result<()> {
        self.repository
            .update_by_owner(update.owner, &update.patch)?;
        debug!(
            target: "runtime::persistence",
            owner = %update.owner,
            class_path = %update.patch.class_path,
            level = ?update.patch.level,
            experience = ?update.patch.experience,
            "progress persisted"
        );
        Ok(())
    }
}
