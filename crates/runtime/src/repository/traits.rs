//! Repository contracts for saving and loading class path progress.

use rpg_core::EntityId;
use serde::{Deserialize, Serialize};

use super::Result;

/// Stored progress of one owner along one class path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassPathRecord {
    pub owner: EntityId,
    pub class_path: String,
    pub level: i32,
    pub experience: f64,
}

/// Partial update of a [`ClassPathRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressPatch {
    pub class_path: String,
    pub level: Option<i32>,
    pub experience: Option<f64>,
}

impl ProgressPatch {
    pub fn level(class_path: impl Into<String>, level: i32, experience: f64) -> Self {
        Self {
            class_path: class_path.into(),
            level: Some(level),
            experience: Some(experience),
        }
    }

    pub fn experience(class_path: impl Into<String>, experience: f64) -> Self {
        Self {
            class_path: class_path.into(),
            level: None,
            experience: Some(experience),
        }
    }
}

/// Repository for class path progress
///
/// This is for DYNAMIC data that changes during gameplay. Definitions live
/// in content files; only level and experience are stored per owner.
pub trait ClassPathRepository: Send + Sync {
    /// Load the stored progress of `owner` along `class_path`
    fn load_owner_class_path(
        &self,
        owner: EntityId,
        class_path: &str,
    ) -> Result<Option<ClassPathRecord>>;

    /// Load every stored class path of `owner`
    fn load_owner_class_paths(&self, owner: EntityId) -> Result<Vec<ClassPathRecord>>;

    /// Merge `patch` into the owner's record, creating it when absent
    ///
    /// A new record starts at the patch level; a patch without a level can
    /// only update an existing record.
    fn update_by_owner(&self, owner: EntityId, patch: &ProgressPatch) -> Result<()>;
}
