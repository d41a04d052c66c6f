use tracing::warn;

use crate::attributes::{AppliedModifier, Modifier};
use crate::events::{GameEvent, SkillRef};
use crate::state::{EntityId, World};

use super::SkillContext;
use super::critical::CriticalHit;
use super::state::{Resolution, SkillState};

/// Buff/debuff parameters: modifiers applied to the target.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Effect {
    pub target_effects: Vec<Modifier>,
    #[cfg_attr(feature = "serde", serde(skip))]
    last_applied: Vec<AppliedModifier>,
}

impl Effect {
    pub fn new(target_effects: Vec<Modifier>) -> Self {
        Self {
            target_effects,
            last_applied: Vec::new(),
        }
    }

    /// Records of the most recent application.
    pub fn last_applied(&self) -> &[AppliedModifier] {
        &self.last_applied
    }

    /// Applies every target effect, each scaled by its own critical roll.
    ///
    /// Modifiers whose attribute is missing on the target are skipped.
    pub(crate) fn apply_to(
        &mut self,
        world: &mut dyn World,
        skill: &SkillRef,
        target: EntityId,
        critical: &CriticalHit,
        ctx: &mut SkillContext<'_>,
    ) -> Resolution {
        let entity = world
            .entity_mut(target)
            .ok_or(SkillState::TargetNotAvailable)?;

        let mut applied = Vec::with_capacity(self.target_effects.len());
        for modifier in &self.target_effects {
            let value = critical.apply_value(modifier.value, ctx.dice, skill.owner);
            match modifier.apply_value(&mut *entity, value) {
                Ok(record) => applied.push(record),
                Err(error) => warn!(
                    target: "rpg::skill",
                    skill = %skill.key,
                    modifier = %modifier.key,
                    %target,
                    %error,
                    "target effect skipped"
                ),
            }
        }

        self.last_applied.clone_from(&applied);
        ctx.bus.emit(&GameEvent::TargetModifiersApplied {
            skill: skill.clone(),
            target,
            applied,
        });
        Ok(SkillState::TargetEffectsApplied)
    }
}
