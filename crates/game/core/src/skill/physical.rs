//! Physical variants: collision detection happens in the host.
//!
//! Running the logic of a physical skill hands a [`PhysicalLaunch`] to the
//! owner's delegate and returns `false`; the real outcome arrives later
//! through [`Skill::execute_on_hit`].

use tracing::{debug, error};

use crate::events::{EventBus, GameEvent};
use crate::state::{EntityId, PhysicalLaunch, World};

use super::state::SkillState;
use super::{Skill, SkillContext, SkillKind};

/// Projectile parameters of a physical skill.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Physics {
    /// Required; a physical skill without magnitude is not usable.
    pub magnitude: Option<f64>,
    pub object_width: f64,
    pub object_height: f64,
    /// Rejects hits on anything but the target bound at execution.
    pub validate_target_on_hit: bool,
}

impl Physics {
    pub fn new(magnitude: f64, object_width: f64, object_height: f64) -> Self {
        Self {
            magnitude: Some(magnitude),
            object_width,
            object_height,
            validate_target_on_hit: false,
        }
    }

    pub fn validating_target(mut self) -> Self {
        self.validate_target_on_hit = true;
        self
    }
}

impl Skill {
    pub(super) fn launch_physical(
        &mut self,
        world: &mut dyn World,
        target: EntityId,
        bus: &EventBus,
    ) -> bool {
        if !self.is_in_range(&*world, target, bus) {
            return self.fail(SkillState::OutOfRange);
        }
        let Some(physics) = self.kind.physics() else {
            return false;
        };
        let launch = PhysicalLaunch {
            skill: self.skill_ref(),
            owner: self.owner,
            target,
            magnitude: physics.magnitude.unwrap_or_default(),
            object_width: physics.object_width,
            object_height: physics.object_height,
        };

        let Some(owner) = world.entity(self.owner) else {
            return self.fail(SkillState::TargetNotAvailable);
        };
        let Some(delegate) = owner.physical_delegate() else {
            error!(
                target: "rpg::skill",
                skill = %self.key,
                owner = %self.owner,
                "owner cannot launch physical skills"
            );
            return self.fail(SkillState::MissingPhysicalDelegate);
        };

        delegate.execute_physical_skill(launch);
        self.last_state = Some(SkillState::PhysicalLaunched);
        false
    }

    /// Resolves a physical skill once its projectile hit `hit_target`.
    ///
    /// No range check happens here: the projectile already travelled.
    pub fn execute_on_hit(
        &mut self,
        world: &mut dyn World,
        hit_target: EntityId,
        ctx: &mut SkillContext<'_>,
    ) -> bool {
        if !self.is_ready {
            return false;
        }
        let skill = self.skill_ref();
        let (event, validate_target) = match &self.kind {
            SkillKind::PhysicalAttack { physics, .. } => (
                GameEvent::PhysicalAttackHit {
                    skill,
                    target: hit_target,
                },
                physics.validate_target_on_hit,
            ),
            SkillKind::PhysicalEffect { physics, .. } => (
                GameEvent::PhysicalEffectHit {
                    skill,
                    target: hit_target,
                },
                physics.validate_target_on_hit,
            ),
            _ => {
                debug!(target: "rpg::skill", skill = %self.key, "hit reported for a non-physical skill");
                return false;
            }
        };
        ctx.bus.emit(&event);

        if validate_target && self.bound_target != Some(hit_target) {
            return self.fail(SkillState::HitTargetMismatch);
        }
        self.resolve_on(world, hit_target, false, ctx)
    }
}
