//! Data-driven skill descriptions.
//!
//! A [`SkillDefinition`] describes a skill independently of its owner. The
//! same definition is instantiated once per owner through `Skill::new`.

use crate::attributes::{Condition, Modifier};

use super::attack::Attack;
use super::effect::Effect;
use super::physical::Physics;

/// Skill family, which selects the resolution logic.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::AsRefStr,
    strum::EnumString,
)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SkillType {
    #[default]
    Base,
    Attack,
    Effect,
    PhysicalAttack,
    PhysicalEffect,
}

/// Type-specific part of a skill.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum SkillKind {
    /// Runs owner effects only.
    #[default]
    Base,
    /// Damages one attribute of the target.
    Attack(Attack),
    /// Applies modifiers to the target.
    Effect(Effect),
    /// Attack resolved when the host reports the projectile's hit.
    PhysicalAttack { attack: Attack, physics: Physics },
    /// Effect resolved when the host reports the projectile's hit.
    PhysicalEffect { effect: Effect, physics: Physics },
}

impl SkillKind {
    pub fn skill_type(&self) -> SkillType {
        match self {
            Self::Base => SkillType::Base,
            Self::Attack(_) => SkillType::Attack,
            Self::Effect(_) => SkillType::Effect,
            Self::PhysicalAttack { .. } => SkillType::PhysicalAttack,
            Self::PhysicalEffect { .. } => SkillType::PhysicalEffect,
        }
    }

    /// Attack parameters of `Attack` and `PhysicalAttack` skills.
    pub fn attack(&self) -> Option<&Attack> {
        match self {
            Self::Attack(attack) | Self::PhysicalAttack { attack, .. } => Some(attack),
            _ => None,
        }
    }

    pub fn effect(&self) -> Option<&Effect> {
        match self {
            Self::Effect(effect) | Self::PhysicalEffect { effect, .. } => Some(effect),
            _ => None,
        }
    }

    /// Projectile parameters of physical skills.
    pub fn physics(&self) -> Option<&Physics> {
        match self {
            Self::PhysicalAttack { physics, .. } | Self::PhysicalEffect { physics, .. } => {
                Some(physics)
            }
            _ => None,
        }
    }

    pub(crate) fn attack_mut(&mut self) -> Option<&mut Attack> {
        match self {
            Self::Attack(attack) | Self::PhysicalAttack { attack, .. } => Some(attack),
            _ => None,
        }
    }
}

/// Owner-independent description of a skill.
///
/// Durations are milliseconds of the logical clock. A zero `range` means
/// unlimited range and a zero `uses_limit` means unlimited uses.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SkillDefinition {
    pub key: String,
    pub uses_limit: u32,
    pub skill_delay: u64,
    pub cast_time: u64,
    pub range: u32,
    pub range_automatic_validation: bool,
    pub auto_validation: bool,
    pub critical_chance: f64,
    /// Falls back to the configured default multiplier.
    pub critical_multiplier: Option<f64>,
    pub critical_fixed_value: f64,
    pub owner_conditions: Vec<Condition>,
    pub owner_effects: Vec<Modifier>,
    pub kind: SkillKind,
}

impl SkillDefinition {
    /// Definition with default tunables: no delay, no cast time, unlimited
    /// range and uses.
    pub fn new(key: impl Into<String>, kind: SkillKind) -> Self {
        Self {
            key: key.into(),
            kind,
            ..Self::default()
        }
    }

    pub fn skill_type(&self) -> SkillType {
        self.kind.skill_type()
    }

    pub fn with_range(mut self, range: u32) -> Self {
        self.range = range;
        self
    }

    pub fn with_skill_delay(mut self, skill_delay: u64) -> Self {
        self.skill_delay = skill_delay;
        self
    }

    pub fn with_cast_time(mut self, cast_time: u64) -> Self {
        self.cast_time = cast_time;
        self
    }

    pub fn with_uses_limit(mut self, uses_limit: u32) -> Self {
        self.uses_limit = uses_limit;
        self
    }

    /// Sets the critical chance (percent), multiplier and fixed bonus.
    pub fn with_critical(mut self, chance: f64, multiplier: f64, fixed_value: f64) -> Self {
        self.critical_chance = chance;
        self.critical_multiplier = Some(multiplier);
        self.critical_fixed_value = fixed_value;
        self
    }

    pub fn with_owner_condition(mut self, condition: Condition) -> Self {
        self.owner_conditions.push(condition);
        self
    }

    pub fn with_owner_effect(mut self, modifier: Modifier) -> Self {
        self.owner_effects.push(modifier);
        self
    }

    pub fn with_auto_validation(mut self, enabled: bool) -> Self {
        self.auto_validation = enabled;
        self
    }

    pub fn with_range_validation(mut self, enabled: bool) -> Self {
        self.range_automatic_validation = enabled;
        self
    }

    /// Reason the definition cannot produce a usable skill, if any.
    pub fn defect(&self) -> Option<&'static str> {
        if self.key.trim().is_empty() {
            return Some("missing skill key");
        }
        if self.kind.physics().is_some_and(|physics| physics.magnitude.is_none()) {
            return Some("physical skill without magnitude");
        }
        None
    }
}

impl Default for SkillDefinition {
    fn default() -> Self {
        Self {
            key: String::new(),
            uses_limit: 0,
            skill_delay: 0,
            cast_time: 0,
            range: 0,
            range_automatic_validation: true,
            auto_validation: true,
            critical_chance: 0.0,
            critical_multiplier: None,
            critical_fixed_value: 0.0,
            owner_conditions: Vec::new(),
            owner_effects: Vec::new(),
            kind: SkillKind::Base,
        }
    }
}
