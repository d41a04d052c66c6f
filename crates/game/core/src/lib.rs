//! Deterministic skill and progression rules shared by every host.
//!
//! `rpg-core` resolves skills (validation gates, cast timers, damage and
//! effects) and levels entities along progression tracks. It never owns host
//! entities: everything is addressed by [`EntityId`] through the [`World`]
//! trait, and every observable step is published on the [`EventBus`].
pub mod attributes;
pub mod config;
pub mod error;
pub mod events;
pub mod progression;
pub mod rng;
pub mod skill;
pub mod state;

pub use attributes::{
    AppliedModifier, AttributeAccess, AttributeError, AttributeValue, Attributes, Comparison,
    Condition, Modifier, ModifierOperation,
};
pub use config::SkillsConfig;
pub use error::{ErrorSeverity, GameError, HookError, LevelError};
pub use events::{
    Dispatch, EventBus, EventName, GameEvent, HookFlow, HookResult, SkillRef, SubscriptionId,
};
pub use progression::{
    ClassPath, ClassPathDefinition, Level, LevelDefinition, LevelTrack, LevelsSet,
    LevelsSetDefinition, LevelsSetOptions,
};
pub use rng::{Dice, PcgRng, RngOracle};
pub use skill::{
    Attack, CriticalHit, Effect, Physics, Skill, SkillContext, SkillDefinition, SkillKind,
    SkillPhase, SkillState, SkillType,
};
pub use state::{
    Actor, Entity, EntityId, PhysicalDelegate, PhysicalLaunch, Position, Roster, Tick, World,
};
