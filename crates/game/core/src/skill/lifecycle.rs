//! Validation, execution and timer resolution.
//!
//! ```text
//! Idle -> Validating -> (Casting) -> Resolving -> Idle
//! ```
//!
//! Every gate failure returns `false` and records a [`SkillState`]; none of
//! them is an error.

use tracing::{debug, warn};

use crate::events::GameEvent;
use crate::state::{EntityId, World};

use super::instance::PendingCast;
use super::state::{SkillPhase, SkillState};
use super::{Skill, SkillContext, SkillKind, SkillType};

impl Skill {
    /// Runs the activation gates against the owner.
    ///
    /// Gates, in order: activation cooldown and owner casting, owner
    /// conditions, uses limit. On success a positive `skill_delay` blocks
    /// activation until `now + skill_delay`. Handlers of the validate-success
    /// event may veto the result.
    pub fn validate(&mut self, world: &dyn World, ctx: &mut SkillContext<'_>) -> bool {
        if !self.is_ready {
            return false;
        }
        self.poll_activation(ctx);
        self.phase = SkillPhase::Validating;
        self.is_valid = true;

        let skill = self.skill_ref();
        ctx.bus.emit(&GameEvent::ValidateBefore {
            skill: skill.clone(),
        });

        let Some(owner) = world.entity(self.owner) else {
            return self.reject(SkillState::TargetNotAvailable);
        };
        if !self.can_activate || owner.is_casting() {
            return self.reject(SkillState::CanNotActivate);
        }

        let failed_condition = self
            .owner_conditions
            .iter()
            .find(|condition| !condition.is_valid_on(owner))
            .map(|condition| condition.key.clone());
        if let Some(condition) = failed_condition {
            ctx.bus.emit(&GameEvent::ValidateFail { skill, condition });
            return self.reject(SkillState::OwnerConditionsFailed);
        }

        if self.uses_limit > 0 && self.uses >= self.uses_limit {
            return self.reject(SkillState::UsesLimitReached);
        }

        if self.skill_delay > 0 {
            self.can_activate = false;
            self.activation_ready_at = Some(ctx.now + self.skill_delay);
        }

        if ctx.bus.emit(&GameEvent::ValidateSuccess { skill }).vetoed {
            self.is_valid = false;
        }
        self.phase = SkillPhase::Idle;
        self.last_state = Some(if self.is_valid {
            SkillState::Validated
        } else {
            SkillState::ValidationVetoed
        });
        self.is_valid
    }

    /// Executes the skill against `target`, or the fixed target when `None`.
    ///
    /// Returns the type-specific result. With a cast time the logic is
    /// deferred to [`Skill::update`] and this call returns `false`; the
    /// deferred result is published with the after-cast event.
    pub fn execute(
        &mut self,
        world: &mut dyn World,
        target: Option<EntityId>,
        ctx: &mut SkillContext<'_>,
    ) -> bool {
        if !self.is_ready {
            return false;
        }
        let skill = self.skill_ref();
        ctx.bus.emit(&GameEvent::BeforeExecute {
            skill: skill.clone(),
            target,
        });

        let Some(target) = target.or(self.target) else {
            return self.fail(SkillState::TargetNotAvailable);
        };
        if world.entity(self.owner).is_none() || world.entity(target).is_none() {
            return self.fail(SkillState::TargetNotAvailable);
        }
        self.bound_target = Some(target);

        let gate = ctx.bus.emit(&GameEvent::ExecuteGate {
            skill: skill.clone(),
            target,
        });
        if gate.vetoed {
            return self.fail(SkillState::ExecuteBlocked);
        }
        if self.range_automatic_validation && !self.is_in_range(&*world, target, ctx.bus) {
            return self.fail(SkillState::OutOfRange);
        }
        if self.auto_validation && !self.validate(&*world, ctx) {
            return false;
        }

        self.phase = SkillPhase::Resolving;
        self.apply_owner_effects(world, ctx);

        let result = if self.cast_time > 0 {
            self.begin_cast(world, target, ctx);
            false
        } else {
            self.run_logic(world, target, ctx)
        };

        self.uses += 1;
        ctx.bus.emit(&GameEvent::SkillReward {
            skill: skill.clone(),
            target,
        });
        ctx.bus.emit(&GameEvent::AfterExecute {
            skill,
            target,
            result,
        });
        if self.pending_cast.is_none() {
            self.phase = SkillPhase::Idle;
        }
        result
    }

    /// Resolves expired deadlines.
    ///
    /// Re-enables activation once the skill delay elapsed and finishes a due
    /// cast. Returns the cast result when a cast finished during this call.
    pub fn update(&mut self, world: &mut dyn World, ctx: &mut SkillContext<'_>) -> Option<bool> {
        self.poll_activation(ctx);

        let now = ctx.now;
        let cast = self
            .pending_cast
            .take_if(|cast| now.has_reached(cast.due))?;

        self.phase = SkillPhase::Resolving;
        let result = self.run_logic(world, cast.target, ctx);
        if let Some(owner) = world.entity_mut(self.owner) {
            owner.set_casting(false);
        }
        ctx.bus.emit(&GameEvent::AfterCast {
            skill: self.skill_ref(),
            target: cast.target,
            result,
        });
        self.phase = SkillPhase::Idle;
        Some(result)
    }

    /// Drops pending deadlines and clears the owner's casting flag.
    pub fn cancel_timers(&mut self, world: &mut dyn World) {
        if self.pending_cast.take().is_some() {
            if let Some(owner) = world.entity_mut(self.owner) {
                owner.set_casting(false);
            }
            debug!(target: "rpg::skill", skill = %self.key, "pending cast cancelled");
        }
        self.activation_ready_at = None;
        self.can_activate = true;
        self.phase = SkillPhase::Idle;
    }

    pub(super) fn fail(&mut self, state: SkillState) -> bool {
        debug!(
            target: "rpg::skill",
            skill = %self.key,
            owner = %self.owner,
            state = %state,
            "skill stopped"
        );
        self.last_state = Some(state);
        self.phase = SkillPhase::Idle;
        false
    }

    fn reject(&mut self, state: SkillState) -> bool {
        self.is_valid = false;
        self.fail(state)
    }

    fn poll_activation(&mut self, ctx: &SkillContext<'_>) {
        if self
            .activation_ready_at
            .is_some_and(|ready_at| ctx.now.has_reached(ready_at))
        {
            self.activation_ready_at = None;
            self.can_activate = true;
        }
    }

    fn apply_owner_effects(&mut self, world: &mut dyn World, ctx: &mut SkillContext<'_>) {
        let Some(owner) = world.entity_mut(self.owner) else {
            return;
        };

        let mut applied = Vec::with_capacity(self.owner_effects.len());
        for modifier in &self.owner_effects {
            match modifier.apply(&mut *owner) {
                Ok(record) => applied.push(record),
                Err(error) => warn!(
                    target: "rpg::skill",
                    skill = %self.key,
                    modifier = %modifier.key,
                    %error,
                    "owner effect skipped"
                ),
            }
        }

        ctx.bus.emit(&GameEvent::OwnerEffectsApplied {
            skill: self.skill_ref(),
            applied,
        });
    }

    fn begin_cast(&mut self, world: &mut dyn World, target: EntityId, ctx: &mut SkillContext<'_>) {
        if let Some(owner) = world.entity_mut(self.owner) {
            owner.set_casting(true);
        }
        let due = ctx.now + self.cast_time;
        self.pending_cast = Some(PendingCast { target, due });
        self.phase = SkillPhase::Casting;
        self.last_state = Some(SkillState::Casting);
        ctx.bus.emit(&GameEvent::BeforeCast {
            skill: self.skill_ref(),
            target,
            due,
        });
    }

    fn run_logic(&mut self, world: &mut dyn World, target: EntityId, ctx: &mut SkillContext<'_>) -> bool {
        let skill = self.skill_ref();
        ctx.bus.emit(&GameEvent::BeforeRunLogic {
            skill: skill.clone(),
            target,
        });

        let result = match self.skill_type() {
            SkillType::Base => {
                self.last_state = Some(SkillState::Executed);
                true
            }
            SkillType::Attack | SkillType::Effect => self.resolve_on(world, target, true, ctx),
            SkillType::PhysicalAttack | SkillType::PhysicalEffect => {
                self.launch_physical(world, target, ctx.bus)
            }
        };

        ctx.bus.emit(&GameEvent::AfterRunLogic {
            skill,
            target,
            result,
        });
        result
    }

    /// Applies the attack or effect part of the skill to `target`.
    pub(super) fn resolve_on(
        &mut self,
        world: &mut dyn World,
        target: EntityId,
        check_range: bool,
        ctx: &mut SkillContext<'_>,
    ) -> bool {
        if world.entity(self.owner).is_none() || world.entity(target).is_none() {
            return self.fail(SkillState::TargetNotAvailable);
        }
        if check_range && !self.is_in_range(&*world, target, ctx.bus) {
            return self.fail(SkillState::OutOfRange);
        }

        let skill = self.skill_ref();
        let critical = self.critical;
        let resolution = match &mut self.kind {
            SkillKind::Attack(attack) | SkillKind::PhysicalAttack { attack, .. } => {
                attack.apply_damage_to(world, &skill, target, &critical, ctx)
            }
            SkillKind::Effect(effect) | SkillKind::PhysicalEffect { effect, .. } => {
                effect.apply_to(world, &skill, target, &critical, ctx)
            }
            SkillKind::Base => Ok(SkillState::Executed),
        };

        match resolution {
            Ok(state) => {
                self.last_state = Some(state);
                true
            }
            Err(state) => self.fail(state),
        }
    }
}
