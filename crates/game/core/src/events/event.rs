use crate::attributes::AppliedModifier;
use crate::skill::SkillType;
use crate::state::{EntityId, Position, Tick};

/// Identity of the skill an event was published for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillRef {
    pub key: String,
    pub owner: EntityId,
    pub skill_type: SkillType,
}

/// Names of every hook published by skills and progression tracks.
///
/// Rendered in snake_case as the last segment of an event key
/// (`id7.level_up`).
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::AsRefStr,
    strum::EnumString,
    strum::EnumIter,
)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[strum(serialize_all = "snake_case")]
pub enum EventName {
    LevelsSetInitStart,
    LevelsSetInitEnd,
    GeneratedLevels,
    SetSkills,
    BeforeAddSkills,
    AfterAddSkills,
    BeforeRemoveSkills,
    AfterRemoveSkills,
    ValidateBefore,
    ValidateSuccess,
    ValidateFail,
    BeforeExecute,
    ExecuteGate,
    AfterExecute,
    SkillReward,
    BeforeCast,
    AfterCast,
    BeforeRunLogic,
    AfterRunLogic,
    BeforeRangeCheck,
    AfterRangeCheck,
    OwnerEffectsApplied,
    AttackDodged,
    DamageApplied,
    TargetModifiersApplied,
    PhysicalAttackHit,
    PhysicalEffectHit,
    LevelUp,
    LevelDown,
    ExperienceAdded,
    LevelModifiersApplied,
    LevelModifiersReverted,
}

impl EventName {
    /// True for events published by progression tracks rather than skills.
    pub fn is_progression(self) -> bool {
        matches!(
            self,
            Self::LevelsSetInitStart
                | Self::LevelsSetInitEnd
                | Self::GeneratedLevels
                | Self::SetSkills
                | Self::BeforeAddSkills
                | Self::AfterAddSkills
                | Self::BeforeRemoveSkills
                | Self::AfterRemoveSkills
                | Self::LevelUp
                | Self::LevelDown
                | Self::ExperienceAdded
                | Self::LevelModifiersApplied
                | Self::LevelModifiersReverted
        )
    }
}

/// Payload of a published hook.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "event", rename_all = "snake_case")
)]
pub enum GameEvent {
    LevelsSetInitStart {
        owner: EntityId,
        track: String,
    },
    LevelsSetInitEnd {
        owner: EntityId,
        track: String,
        levels: usize,
    },
    GeneratedLevels {
        owner: EntityId,
        track: String,
        keys: Vec<i32>,
    },
    SetSkills {
        owner: EntityId,
        track: String,
        skills: Vec<String>,
    },
    BeforeAddSkills {
        owner: EntityId,
        track: String,
        skills: Vec<String>,
    },
    AfterAddSkills {
        owner: EntityId,
        track: String,
        skills: Vec<String>,
    },
    BeforeRemoveSkills {
        owner: EntityId,
        track: String,
        skills: Vec<String>,
    },
    AfterRemoveSkills {
        owner: EntityId,
        track: String,
        skills: Vec<String>,
    },
    ValidateBefore {
        skill: SkillRef,
    },
    ValidateSuccess {
        skill: SkillRef,
    },
    ValidateFail {
        skill: SkillRef,
        condition: String,
    },
    BeforeExecute {
        skill: SkillRef,
        target: Option<EntityId>,
    },
    /// Published before execution proceeds; any handler may veto it.
    ExecuteGate {
        skill: SkillRef,
        target: EntityId,
    },
    AfterExecute {
        skill: SkillRef,
        target: EntityId,
        result: bool,
    },
    SkillReward {
        skill: SkillRef,
        target: EntityId,
    },
    BeforeCast {
        skill: SkillRef,
        target: EntityId,
        due: Tick,
    },
    AfterCast {
        skill: SkillRef,
        target: EntityId,
        result: bool,
    },
    BeforeRunLogic {
        skill: SkillRef,
        target: EntityId,
    },
    AfterRunLogic {
        skill: SkillRef,
        target: EntityId,
        result: bool,
    },
    BeforeRangeCheck {
        skill: SkillRef,
        owner_position: Position,
        target_position: Position,
    },
    AfterRangeCheck {
        skill: SkillRef,
        in_range: bool,
    },
    OwnerEffectsApplied {
        skill: SkillRef,
        applied: Vec<AppliedModifier>,
    },
    AttackDodged {
        skill: SkillRef,
        target: EntityId,
        dodge: f64,
        aim: f64,
    },
    DamageApplied {
        skill: SkillRef,
        target: EntityId,
        damage: f64,
        new_value: f64,
    },
    TargetModifiersApplied {
        skill: SkillRef,
        target: EntityId,
        applied: Vec<AppliedModifier>,
    },
    PhysicalAttackHit {
        skill: SkillRef,
        target: EntityId,
    },
    PhysicalEffectHit {
        skill: SkillRef,
        target: EntityId,
    },
    LevelUp {
        owner: EntityId,
        track: String,
        level: i32,
        experience: f64,
    },
    LevelDown {
        owner: EntityId,
        track: String,
        level: i32,
        experience: f64,
    },
    ExperienceAdded {
        owner: EntityId,
        track: String,
        /// Level of the track when the experience was added.
        level: i32,
        amount: f64,
        total: f64,
    },
    LevelModifiersApplied {
        owner: EntityId,
        track: String,
        level: i32,
        applied: Vec<AppliedModifier>,
    },
    LevelModifiersReverted {
        owner: EntityId,
        track: String,
        level: i32,
        modifiers: Vec<String>,
    },
}

impl GameEvent {
    pub fn name(&self) -> EventName {
        match self {
            Self::LevelsSetInitStart { .. } => EventName::LevelsSetInitStart,
            Self::LevelsSetInitEnd { .. } => EventName::LevelsSetInitEnd,
            Self::GeneratedLevels { .. } => EventName::GeneratedLevels,
            Self::SetSkills { .. } => EventName::SetSkills,
            Self::BeforeAddSkills { .. } => EventName::BeforeAddSkills,
            Self::AfterAddSkills { .. } => EventName::AfterAddSkills,
            Self::BeforeRemoveSkills { .. } => EventName::BeforeRemoveSkills,
            Self::AfterRemoveSkills { .. } => EventName::AfterRemoveSkills,
            Self::ValidateBefore { .. } => EventName::ValidateBefore,
            Self::ValidateSuccess { .. } => EventName::ValidateSuccess,
            Self::ValidateFail { .. } => EventName::ValidateFail,
            Self::BeforeExecute { .. } => EventName::BeforeExecute,
            Self::ExecuteGate { .. } => EventName::ExecuteGate,
            Self::AfterExecute { .. } => EventName::AfterExecute,
            Self::SkillReward { .. } => EventName::SkillReward,
            Self::BeforeCast { .. } => EventName::BeforeCast,
            Self::AfterCast { .. } => EventName::AfterCast,
            Self::BeforeRunLogic { .. } => EventName::BeforeRunLogic,
            Self::AfterRunLogic { .. } => EventName::AfterRunLogic,
            Self::BeforeRangeCheck { .. } => EventName::BeforeRangeCheck,
            Self::AfterRangeCheck { .. } => EventName::AfterRangeCheck,
            Self::OwnerEffectsApplied { .. } => EventName::OwnerEffectsApplied,
            Self::AttackDodged { .. } => EventName::AttackDodged,
            Self::DamageApplied { .. } => EventName::DamageApplied,
            Self::TargetModifiersApplied { .. } => EventName::TargetModifiersApplied,
            Self::PhysicalAttackHit { .. } => EventName::PhysicalAttackHit,
            Self::PhysicalEffectHit { .. } => EventName::PhysicalEffectHit,
            Self::LevelUp { .. } => EventName::LevelUp,
            Self::LevelDown { .. } => EventName::LevelDown,
            Self::ExperienceAdded { .. } => EventName::ExperienceAdded,
            Self::LevelModifiersApplied { .. } => EventName::LevelModifiersApplied,
            Self::LevelModifiersReverted { .. } => EventName::LevelModifiersReverted,
        }
    }

    /// Entity whose scope the event is published in.
    pub fn owner(&self) -> EntityId {
        match self {
            Self::LevelsSetInitStart { owner, .. }
            | Self::LevelsSetInitEnd { owner, .. }
            | Self::GeneratedLevels { owner, .. }
            | Self::SetSkills { owner, .. }
            | Self::BeforeAddSkills { owner, .. }
            | Self::AfterAddSkills { owner, .. }
            | Self::BeforeRemoveSkills { owner, .. }
            | Self::AfterRemoveSkills { owner, .. }
            | Self::LevelUp { owner, .. }
            | Self::LevelDown { owner, .. }
            | Self::ExperienceAdded { owner, .. }
            | Self::LevelModifiersApplied { owner, .. }
            | Self::LevelModifiersReverted { owner, .. } => *owner,
            Self::ValidateBefore { skill }
            | Self::ValidateSuccess { skill }
            | Self::ValidateFail { skill, .. }
            | Self::BeforeExecute { skill, .. }
            | Self::ExecuteGate { skill, .. }
            | Self::AfterExecute { skill, .. }
            | Self::SkillReward { skill, .. }
            | Self::BeforeCast { skill, .. }
            | Self::AfterCast { skill, .. }
            | Self::BeforeRunLogic { skill, .. }
            | Self::AfterRunLogic { skill, .. }
            | Self::BeforeRangeCheck { skill, .. }
            | Self::AfterRangeCheck { skill, .. }
            | Self::OwnerEffectsApplied { skill, .. }
            | Self::AttackDodged { skill, .. }
            | Self::DamageApplied { skill, .. }
            | Self::TargetModifiersApplied { skill, .. }
            | Self::PhysicalAttackHit { skill, .. }
            | Self::PhysicalEffectHit { skill, .. } => skill.owner,
        }
    }

    /// Skill the event belongs to, if any.
    pub fn skill(&self) -> Option<&SkillRef> {
        match self {
            Self::ValidateBefore { skill }
            | Self::ValidateSuccess { skill }
            | Self::ValidateFail { skill, .. }
            | Self::BeforeExecute { skill, .. }
            | Self::ExecuteGate { skill, .. }
            | Self::AfterExecute { skill, .. }
            | Self::SkillReward { skill, .. }
            | Self::BeforeCast { skill, .. }
            | Self::AfterCast { skill, .. }
            | Self::BeforeRunLogic { skill, .. }
            | Self::AfterRunLogic { skill, .. }
            | Self::BeforeRangeCheck { skill, .. }
            | Self::AfterRangeCheck { skill, .. }
            | Self::OwnerEffectsApplied { skill, .. }
            | Self::AttackDodged { skill, .. }
            | Self::DamageApplied { skill, .. }
            | Self::TargetModifiersApplied { skill, .. }
            | Self::PhysicalAttackHit { skill, .. }
            | Self::PhysicalEffectHit { skill, .. } => Some(skill),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn event_names_render_snake_case() {
        assert_eq!(EventName::LevelUp.to_string(), "level_up");
        assert_eq!(EventName::ExperienceAdded.as_ref(), "experience_added");
        assert_eq!("validate_fail".parse::<EventName>(), Ok(EventName::ValidateFail));
    }

    #[test]
    fn progression_and_skill_events_partition_the_taxonomy() {
        let progression = EventName::iter().filter(|name| name.is_progression()).count();
        assert_eq!(progression, 13);
        assert_eq!(EventName::iter().count(), 32);
    }
}
