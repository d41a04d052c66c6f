use crate::rng::Dice;
use crate::state::EntityId;

/// Critical-hit parameters of a skill.
///
/// Every call that consults the chance rolls the dice once, so two calls on
/// the same value may disagree.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CriticalHit {
    /// Percentage in `[0, 100]`.
    pub chance: f64,
    pub multiplier: f64,
    pub fixed_value: f64,
}

impl CriticalHit {
    pub fn new(chance: f64, multiplier: f64, fixed_value: f64) -> Self {
        Self {
            chance,
            multiplier,
            fixed_value,
        }
    }

    /// Rolls a d100 and compares it with the chance.
    ///
    /// A non-positive chance never rolls and is never critical.
    pub fn is_critical(&self, dice: &mut Dice, owner: EntityId) -> bool {
        if self.chance <= 0.0 {
            return false;
        }
        f64::from(dice.roll_d100(owner)) <= self.chance
    }

    /// Returns `value * multiplier + fixed_value` on a critical roll, else `value`.
    pub fn apply_value(&self, value: f64, dice: &mut Dice, owner: EntityId) -> f64 {
        if self.is_critical(dice, owner) {
            value * self.multiplier + self.fixed_value
        } else {
            value
        }
    }

    /// Extra amount a critical roll adds on top of `value` (zero otherwise).
    pub fn diff(&self, value: f64, dice: &mut Dice, owner: EntityId) -> f64 {
        self.apply_value(value, dice, owner) - value
    }
}

impl Default for CriticalHit {
    fn default() -> Self {
        Self::new(0.0, 1.0, 0.0)
    }
}
