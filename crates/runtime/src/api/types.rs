//! Values exchanged between the handle and the simulation worker.

use rpg_core::{EntityId, GameEvent, HookResult, SkillState};
use serde::{Deserialize, Serialize};

/// Handler registered on the simulation's core event bus.
pub type EventHandler = Box<dyn Fn(&GameEvent) -> HookResult + Send + Sync>;

/// Result of a skill execution or hit report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillOutcome {
    /// Value returned by the skill: `false` for deferred casts and launches.
    pub result: bool,
    pub state: Option<SkillState>,
}

/// Progress of one owner along one class path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub owner: EntityId,
    pub class_path: String,
    pub label: String,
    pub level: i32,
    pub experience: f64,
    pub next_level_experience: f64,
    pub skills: Vec<String>,
}
