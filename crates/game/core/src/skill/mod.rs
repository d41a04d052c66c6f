//! Skills: validation gates, timers and type-specific resolution.
//!
//! A [`Skill`] is instantiated from a [`SkillDefinition`] for one owner. Its
//! [`SkillKind`] selects what running the logic does:
//!
//! - `Base`: nothing beyond owner effects
//! - `Attack`: damage against an attribute of the target
//! - `Effect`: modifiers applied to the target
//! - `PhysicalAttack` / `PhysicalEffect`: launch through the owner's physical
//!   delegate, resolved later by [`Skill::execute_on_hit`]
mod attack;
mod critical;
mod definition;
mod effect;
mod instance;
mod lifecycle;
mod physical;
mod range;
mod state;

pub use attack::{
    Attack, CombatTotals, PropertyOperator, PropertyTerm, combine_properties, dodge_aim_diff,
    proportion_damage,
};
pub use critical::CriticalHit;
pub use definition::{SkillDefinition, SkillKind, SkillType};
pub use effect::Effect;
pub use instance::Skill;
pub use physical::Physics;
pub use state::{SkillPhase, SkillState};

use crate::events::EventBus;
use crate::rng::Dice;
use crate::state::Tick;

/// Collaborators lent to every skill operation.
pub struct SkillContext<'a> {
    /// Current logical time; deadlines are compared against it.
    pub now: Tick,
    pub bus: &'a EventBus,
    pub dice: &'a mut Dice,
}

impl<'a> SkillContext<'a> {
    pub fn new(now: Tick, bus: &'a EventBus, dice: &'a mut Dice) -> Self {
        Self { now, bus, dice }
    }
}
