//! Damage resolution for attack skills.
//!
//! Damage starts from `hit_damage`, is scaled by the attack/defense
//! proportion (unless applied directly), reduced by the dodge/aim proportion
//! and topped up by the critical difference:
//!
//! ```text
//! diff      = atk - def
//! diff > 0  : damage += ceil(min(99, diff < def ? diff*100/def : 99) * damage / 100)
//! diff < 0  : damage -= floor(min(99, -diff < atk ? -diff*100/atk : 99) * damage / 100)
//! dodge>aim : damage -= floor(damage * dodge_aim_diff / 100)
//! ```

use tracing::debug;

use crate::attributes::AttributeAccess;
use crate::events::{GameEvent, SkillRef};
use crate::rng::Dice;
use crate::state::{EntityId, World};

use super::SkillContext;
use super::critical::CriticalHit;
use super::state::{Resolution, SkillState};

/// How a property value combines with the running total.
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
pub enum PropertyOperator {
    #[default]
    Add,
    Subtract,
    Multiply,
    /// A zero divisor leaves the total unchanged.
    Divide,
}

impl PropertyOperator {
    pub fn combine(self, total: f64, value: f64) -> f64 {
        match self {
            Self::Add => total + value,
            Self::Subtract => total - value,
            Self::Multiply => total * value,
            Self::Divide if value == 0.0 => total,
            Self::Divide => total / value,
        }
    }
}

/// One attribute contributing to an attack, aim, defense or dodge total.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PropertyTerm {
    pub property_key: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub operator: PropertyOperator,
}

impl PropertyTerm {
    pub fn new(property_key: impl Into<String>) -> Self {
        Self::with_operator(property_key, PropertyOperator::Add)
    }

    pub fn with_operator(property_key: impl Into<String>, operator: PropertyOperator) -> Self {
        Self {
            property_key: property_key.into(),
            operator,
        }
    }
}

impl From<&str> for PropertyTerm {
    fn from(property_key: &str) -> Self {
        Self::new(property_key)
    }
}

/// Combines the properties of `entity` into one total.
///
/// The first property seeds the total and the following ones combine with
/// their operator. Returns `None` as soon as a property cannot be resolved;
/// an empty list totals zero.
pub fn combine_properties<T>(entity: &T, terms: &[PropertyTerm]) -> Option<f64>
where
    T: AttributeAccess + ?Sized,
{
    let mut total: Option<f64> = None;
    for term in terms {
        let value = entity.property(&term.property_key)?;
        total = Some(match total {
            None => value,
            Some(total) => term.operator.combine(total, value),
        });
    }
    Some(total.unwrap_or(0.0))
}

/// Percentage by which dodge exceeds aim (zero when it does not).
///
/// With zero aim any positive dodge counts as 100%.
pub fn dodge_aim_diff(dodge: f64, aim: f64) -> f64 {
    if dodge <= aim {
        0.0
    } else if aim == 0.0 {
        100.0
    } else {
        (dodge - aim) * 100.0 / aim
    }
}

/// Scales `damage` by how far attack exceeds (or falls short of) defense.
pub fn proportion_damage(damage: f64, attack: f64, defense: f64) -> f64 {
    let diff = attack - defense;
    if diff > 0.0 {
        let percentage = diff_percentage(diff, defense);
        damage + (percentage * damage / 100.0).ceil()
    } else if diff < 0.0 {
        let percentage = diff_percentage(-diff, attack);
        damage - (percentage * damage / 100.0).floor()
    } else {
        damage
    }
}

fn diff_percentage(diff: f64, base: f64) -> f64 {
    let percentage = if diff < base { diff * 100.0 / base } else { 99.0 };
    percentage.min(99.0)
}

/// Resolved totals of both combatants.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CombatTotals {
    pub attack: f64,
    pub defense: f64,
    pub aim: f64,
    pub dodge: f64,
}

/// Attack parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Attack {
    /// Attribute the damage is subtracted from.
    pub affected_property: String,
    pub hit_damage: f64,
    pub attack_properties: Vec<PropertyTerm>,
    pub defense_properties: Vec<PropertyTerm>,
    pub aim_properties: Vec<PropertyTerm>,
    pub dodge_properties: Vec<PropertyTerm>,
    /// Allows a full dodge when dodge exceeds `aim * dodge_over_aim_success`.
    pub dodge_full_enabled: bool,
    /// Falls back to the configured ratio.
    pub dodge_over_aim_success: Option<f64>,
    /// Reduces damage by the dodge/aim proportion.
    pub damage_affected: bool,
    /// Reduces the critical addition by the dodge/aim proportion.
    pub critical_affected: bool,
    pub allow_effect_below_zero: bool,
    /// Uses `hit_damage` without the attack/defense proportion.
    pub apply_direct_damage: bool,
}

impl Attack {
    pub fn new(affected_property: impl Into<String>, hit_damage: f64) -> Self {
        Self {
            affected_property: affected_property.into(),
            hit_damage,
            ..Self::default()
        }
    }

    /// Damage dealt for the given totals before it is written to the target.
    ///
    /// The result is not clamped. A dodge reduction larger than the damage
    /// yields negative damage, which raises the affected property; only the
    /// new property value is clamped, and only below zero.
    pub fn calculate_damage(
        &self,
        totals: CombatTotals,
        critical: &CriticalHit,
        dice: &mut Dice,
        owner: EntityId,
    ) -> f64 {
        let mut damage = if self.apply_direct_damage {
            self.hit_damage
        } else {
            proportion_damage(self.hit_damage, totals.attack, totals.defense)
        };

        let dodged_more = totals.dodge > totals.aim;
        let dodge_diff = dodge_aim_diff(totals.dodge, totals.aim);
        if self.damage_affected && dodged_more {
            damage -= (damage * dodge_diff / 100.0).floor();
        }

        let mut critical_diff = critical.diff(damage, dice, owner);
        if self.critical_affected && dodged_more {
            critical_diff -= (critical_diff * dodge_diff / 100.0).floor();
        }

        damage + critical_diff
    }

    /// Resolves the attack of `skill.owner` against `target`.
    pub(crate) fn apply_damage_to(
        &self,
        world: &mut dyn World,
        skill: &SkillRef,
        target: EntityId,
        critical: &CriticalHit,
        ctx: &mut SkillContext<'_>,
    ) -> Resolution {
        let owner = world
            .entity(skill.owner)
            .ok_or(SkillState::TargetNotAvailable)?;
        let defender = world.entity(target).ok_or(SkillState::TargetNotAvailable)?;

        let mut totals = CombatTotals {
            aim: combine_properties(owner, &self.aim_properties)
                .ok_or(SkillState::PropertyNotFound)?,
            dodge: combine_properties(defender, &self.dodge_properties)
                .ok_or(SkillState::PropertyNotFound)?,
            ..CombatTotals::default()
        };

        let ratio = self
            .dodge_over_aim_success
            .unwrap_or(crate::config::SkillsConfig::DEFAULT_DODGE_OVER_AIM_SUCCESS);
        if self.dodge_full_enabled && totals.dodge > totals.aim * ratio {
            debug!(
                target: "rpg::skill",
                skill = %skill.key,
                %target,
                dodge = totals.dodge,
                aim = totals.aim,
                "attack dodged"
            );
            ctx.bus.emit(&GameEvent::AttackDodged {
                skill: skill.clone(),
                target,
                dodge: totals.dodge,
                aim: totals.aim,
            });
            return Err(SkillState::Dodged);
        }

        let current = defender
            .property(&self.affected_property)
            .ok_or(SkillState::PropertyNotFound)?;
        if !self.allow_effect_below_zero && current <= 0.0 {
            return Err(SkillState::TargetDepleted);
        }

        if !self.apply_direct_damage {
            totals.attack = combine_properties(owner, &self.attack_properties)
                .ok_or(SkillState::PropertyNotFound)?;
            totals.defense = combine_properties(defender, &self.defense_properties)
                .ok_or(SkillState::PropertyNotFound)?;
        }

        let damage = self.calculate_damage(totals, critical, ctx.dice, skill.owner);
        let mut new_value = current - damage;
        if !self.allow_effect_below_zero && new_value < 0.0 {
            new_value = 0.0;
        }

        world
            .entity_mut(target)
            .ok_or(SkillState::TargetNotAvailable)?
            .set_property(&self.affected_property, new_value)
            .map_err(|_| SkillState::PropertyNotFound)?;

        ctx.bus.emit(&GameEvent::DamageApplied {
            skill: skill.clone(),
            target,
            damage,
            new_value,
        });
        Ok(SkillState::DamageApplied)
    }
}

impl Default for Attack {
    fn default() -> Self {
        Self {
            affected_property: "stats/hp".to_string(),
            hit_damage: 0.0,
            attack_properties: Vec::new(),
            defense_properties: Vec::new(),
            aim_properties: Vec::new(),
            dodge_properties: Vec::new(),
            dodge_full_enabled: false,
            dodge_over_aim_success: None,
            damage_affected: false,
            critical_affected: false,
            allow_effect_below_zero: false,
            apply_direct_damage: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Attributes;

    fn no_critical() -> CriticalHit {
        CriticalHit::new(0.0, 2.0, 0.0)
    }

    #[test]
    fn proportion_caps_at_ninety_nine_percent() {
        // diff == def is not "< def", so the percentage falls back to 99.
        assert_eq!(proportion_damage(10.0, 20.0, 10.0), 20.0);
        // diff 5 of def 10 => 50% => +5.
        assert_eq!(proportion_damage(10.0, 15.0, 10.0), 15.0);
        // defense 0 always takes the capped branch.
        assert_eq!(proportion_damage(10.0, 5.0, 0.0), 20.0);
    }

    #[test]
    fn weaker_attack_floors_reduction() {
        // -diff 5 of atk 15 => 33.3% => floor(3.33) = 3.
        assert_eq!(proportion_damage(10.0, 15.0, 20.0), 7.0);
        // attack 0 takes the capped branch: floor(9.9) = 9.
        assert_eq!(proportion_damage(10.0, 0.0, 20.0), 1.0);
        assert_eq!(proportion_damage(10.0, 12.0, 12.0), 10.0);
    }

    #[test]
    fn dodge_aim_diff_guards_zero_aim() {
        assert_eq!(dodge_aim_diff(0.0, 0.0), 0.0);
        assert_eq!(dodge_aim_diff(5.0, 0.0), 100.0);
        assert_eq!(dodge_aim_diff(15.0, 10.0), 50.0);
        assert_eq!(dodge_aim_diff(10.0, 15.0), 0.0);
    }

    #[test]
    fn damage_reduction_applies_only_when_enabled() {
        let mut dice = Dice::seeded(1);
        let totals = CombatTotals {
            attack: 10.0,
            defense: 10.0,
            aim: 10.0,
            dodge: 15.0,
        };
        let mut attack = Attack::new("stats/hp", 10.0);

        assert_eq!(attack.calculate_damage(totals, &no_critical(), &mut dice, EntityId(1)), 10.0);

        attack.damage_affected = true;
        assert_eq!(attack.calculate_damage(totals, &no_critical(), &mut dice, EntityId(1)), 5.0);
    }

    #[test]
    fn critical_addition_is_reduced_by_dodge_when_affected() {
        let mut dice = Dice::seeded(1);
        let totals = CombatTotals {
            attack: 0.0,
            defense: 0.0,
            aim: 10.0,
            dodge: 15.0,
        };
        let always = CriticalHit::new(100.0, 2.0, 0.0);
        let mut attack = Attack {
            apply_direct_damage: true,
            ..Attack::new("stats/hp", 10.0)
        };

        // Critical diff 10, not reduced.
        assert_eq!(attack.calculate_damage(totals, &always, &mut dice, EntityId(1)), 20.0);

        attack.critical_affected = true;
        // Critical diff 10 reduced by floor(10 * 50 / 100) = 5.
        assert_eq!(attack.calculate_damage(totals, &always, &mut dice, EntityId(1)), 15.0);
    }

    #[test]
    fn overwhelming_dodge_turns_damage_negative() {
        let mut dice = Dice::seeded(1);
        let totals = CombatTotals {
            aim: 10.0,
            dodge: 40.0,
            ..CombatTotals::default()
        };
        let attack = Attack {
            apply_direct_damage: true,
            damage_affected: true,
            ..Attack::new("stats/hp", 10.0)
        };

        // 300% reduction: 10 - floor(10 * 300 / 100) = -20.
        assert_eq!(attack.calculate_damage(totals, &no_critical(), &mut dice, EntityId(1)), -20.0);
    }

    #[test]
    fn properties_combine_from_the_first_value() {
        let attrs = Attributes::new()
            .with("stats/atk", 10.0)
            .with("stats/str", 4.0)
            .with("stats/weight", 2.0);
        let terms = vec![
            PropertyTerm::new("stats/atk"),
            PropertyTerm::with_operator("stats/str", PropertyOperator::Multiply),
            PropertyTerm::with_operator("stats/weight", PropertyOperator::Subtract),
        ];

        assert_eq!(combine_properties(&attrs, &terms), Some(38.0));
        assert_eq!(combine_properties(&attrs, &[]), Some(0.0));
        assert_eq!(combine_properties(&attrs, &[PropertyTerm::new("stats/mp")]), None);
    }
}
