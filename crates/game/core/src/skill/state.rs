/// Position of a skill in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[strum(serialize_all = "snake_case")]
pub enum SkillPhase {
    #[default]
    Idle,
    Validating,
    /// Waiting for the cast deadline.
    Casting,
    Resolving,
}

/// Outcome of the last gate or resolution step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[strum(serialize_all = "snake_case")]
pub enum SkillState {
    Validated,
    /// A validate-success handler vetoed the activation.
    ValidationVetoed,
    CanNotActivate,
    OwnerConditionsFailed,
    UsesLimitReached,
    TargetNotAvailable,
    OutOfRange,
    ExecuteBlocked,
    Casting,
    Dodged,
    DamageApplied,
    /// The affected attribute was already at or below zero.
    TargetDepleted,
    TargetEffectsApplied,
    PhysicalLaunched,
    HitTargetMismatch,
    MissingPhysicalDelegate,
    PropertyNotFound,
    Executed,
}

impl SkillState {
    /// True for states that end a resolution without applying anything.
    pub fn is_failure(self) -> bool {
        !matches!(
            self,
            Self::Validated
                | Self::Casting
                | Self::DamageApplied
                | Self::TargetEffectsApplied
                | Self::PhysicalLaunched
                | Self::Executed
        )
    }
}

/// Result of type-specific resolution: the state reached, as success or failure.
pub(crate) type Resolution = Result<SkillState, SkillState>;
