//! Modifiers - reusable, revertible attribute changes.
//!
//! A modifier describes one operation on one attribute path. Applying it
//! produces an [`AppliedModifier`] record; reverting that record subtracts
//! exactly the delta it introduced, so apply/revert pairs are net-zero even if
//! the attribute moved in between (damage taken between a level-up and the
//! following level-down, for instance).

use super::path::{AttributeAccess, AttributeError};

/// Operation a [`Modifier`] performs on its attribute.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ModifierOperation {
    /// Replace the value.
    Set,
    /// Add the value.
    Increase,
    /// Subtract the value.
    Decrease,
    /// Multiply by the value.
    Multiply,
    /// Divide by the value (a zero divisor leaves the attribute unchanged).
    Divide,
    /// Add `value` percent of the current value.
    IncreasePercent,
    /// Subtract `value` percent of the current value.
    DecreasePercent,
}

impl ModifierOperation {
    /// Computes the attribute value after the operation.
    pub fn compute(self, current: f64, value: f64) -> f64 {
        match self {
            Self::Set => value,
            Self::Increase => current + value,
            Self::Decrease => current - value,
            Self::Multiply => current * value,
            Self::Divide if value == 0.0 => current,
            Self::Divide => current / value,
            Self::IncreasePercent => current + current * value / 100.0,
            Self::DecreasePercent => current - current * value / 100.0,
        }
    }

    /// Computes the value before the operation, when the operation can be inverted.
    ///
    /// `Set` discards the previous value and has no inverse.
    pub fn invert(self, current: f64, value: f64) -> Option<f64> {
        match self {
            Self::Set => None,
            Self::Increase => Some(current - value),
            Self::Decrease => Some(current + value),
            Self::Multiply if value == 0.0 => None,
            Self::Multiply => Some(current / value),
            Self::Divide if value == 0.0 => Some(current),
            Self::Divide => Some(current * value),
            Self::IncreasePercent => divide_by_factor(current, 1.0 + value / 100.0),
            Self::DecreasePercent => divide_by_factor(current, 1.0 - value / 100.0),
        }
    }
}

fn divide_by_factor(current: f64, factor: f64) -> Option<f64> {
    (factor != 0.0).then(|| current / factor)
}

/// One attribute change that can be applied to and reverted from an entity.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Modifier {
    pub key: String,
    pub property_key: String,
    pub operation: ModifierOperation,
    pub value: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub min_value: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_value: Option<f64>,
    /// Attribute path whose value caps the result (e.g. `stats/max_hp`).
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_property: Option<String>,
}

impl Modifier {
    pub fn new(
        key: impl Into<String>,
        property_key: impl Into<String>,
        operation: ModifierOperation,
        value: f64,
    ) -> Self {
        Self {
            key: key.into(),
            property_key: property_key.into(),
            operation,
            value,
            min_value: None,
            max_value: None,
            max_property: None,
        }
    }

    pub fn with_bounds(mut self, min_value: Option<f64>, max_value: Option<f64>) -> Self {
        self.min_value = min_value;
        self.max_value = max_value;
        self
    }

    pub fn with_max_property(mut self, max_property: impl Into<String>) -> Self {
        self.max_property = Some(max_property.into());
        self
    }

    /// Applies the modifier with its own value.
    pub fn apply<T>(&self, target: &mut T) -> Result<AppliedModifier, AttributeError>
    where
        T: AttributeAccess + ?Sized,
    {
        self.apply_value(target, self.value)
    }

    /// Applies the modifier's operation with an overridden value.
    ///
    /// Used by skills that scale effects (critical hits).
    pub fn apply_value<T>(&self, target: &mut T, value: f64) -> Result<AppliedModifier, AttributeError>
    where
        T: AttributeAccess + ?Sized,
    {
        let previous = target
            .property(&self.property_key)
            .ok_or_else(|| AttributeError::PathNotFound(self.property_key.clone()))?;
        let applied = self.clamp(target, self.operation.compute(previous, value));
        target.set_property(&self.property_key, applied)?;

        Ok(AppliedModifier {
            modifier_key: self.key.clone(),
            property_key: self.property_key.clone(),
            previous,
            applied,
        })
    }

    /// Reverts the modifier by applying the inverse operation.
    ///
    /// Returns the resulting value. `Set` modifiers cannot be inverted and
    /// leave the attribute as is.
    pub fn revert<T>(&self, target: &mut T) -> Result<f64, AttributeError>
    where
        T: AttributeAccess + ?Sized,
    {
        let current = target
            .property(&self.property_key)
            .ok_or_else(|| AttributeError::PathNotFound(self.property_key.clone()))?;
        let Some(reverted) = self.operation.invert(current, self.value) else {
            return Ok(current);
        };
        let reverted = self.clamp(target, reverted);
        target.set_property(&self.property_key, reverted)?;
        Ok(reverted)
    }

    fn clamp<T>(&self, target: &T, value: f64) -> f64
    where
        T: AttributeAccess + ?Sized,
    {
        let mut value = value;
        if let Some(min) = self.min_value {
            value = value.max(min);
        }
        if let Some(max) = self.max_value {
            value = value.min(max);
        }
        if let Some(max) = self.max_property.as_deref().and_then(|path| target.property(path)) {
            value = value.min(max);
        }
        value
    }
}

/// Record of one modifier application.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AppliedModifier {
    pub modifier_key: String,
    pub property_key: String,
    pub previous: f64,
    pub applied: f64,
}

impl AppliedModifier {
    /// Change introduced by the application.
    pub fn delta(&self) -> f64 {
        self.applied - self.previous
    }

    /// Removes exactly the delta this application introduced.
    pub fn revert<T>(&self, target: &mut T) -> Result<f64, AttributeError>
    where
        T: AttributeAccess + ?Sized,
    {
        let current = target
            .property(&self.property_key)
            .ok_or_else(|| AttributeError::PathNotFound(self.property_key.clone()))?;
        let reverted = current - self.delta();
        target.set_property(&self.property_key, reverted)?;
        Ok(reverted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Attributes;

    #[test]
    fn operations_compute_expected_values() {
        use ModifierOperation::*;
        assert_eq!(Set.compute(10.0, 3.0), 3.0);
        assert_eq!(Increase.compute(10.0, 3.0), 13.0);
        assert_eq!(Decrease.compute(10.0, 3.0), 7.0);
        assert_eq!(Multiply.compute(10.0, 3.0), 30.0);
        assert_eq!(Divide.compute(10.0, 4.0), 2.5);
        assert_eq!(Divide.compute(10.0, 0.0), 10.0);
        assert_eq!(IncreasePercent.compute(200.0, 10.0), 220.0);
        assert_eq!(DecreasePercent.compute(200.0, 10.0), 180.0);
    }

    #[test]
    fn apply_clamps_to_bounds_and_max_property() {
        let mut attrs = Attributes::new()
            .with("stats/hp", 90.0)
            .with("stats/max_hp", 100.0);
        let heal = Modifier::new("heal", "stats/hp", ModifierOperation::Increase, 25.0)
            .with_max_property("stats/max_hp");

        let applied = heal.apply(&mut attrs).unwrap();
        assert_eq!(applied.previous, 90.0);
        assert_eq!(applied.applied, 100.0);
        assert_eq!(attrs.property("stats/hp"), Some(100.0));

        let drain = Modifier::new("drain", "stats/hp", ModifierOperation::Decrease, 500.0)
            .with_bounds(Some(1.0), None);
        drain.apply(&mut attrs).unwrap();
        assert_eq!(attrs.property("stats/hp"), Some(1.0));
    }

    #[test]
    fn applied_record_reverts_its_own_delta() {
        let mut attrs = Attributes::new().with("stats/atk", 10.0);
        let boost = Modifier::new("boost", "stats/atk", ModifierOperation::Multiply, 1.5);

        let applied = boost.apply(&mut attrs).unwrap();
        assert_eq!(attrs.property("stats/atk"), Some(15.0));

        // The attribute moves independently before the revert.
        attrs.set_property("stats/atk", 17.0).unwrap();
        applied.revert(&mut attrs).unwrap();
        assert_eq!(attrs.property("stats/atk"), Some(12.0));
    }

    #[test]
    fn modifier_revert_uses_inverse_operation() {
        let mut attrs = Attributes::new().with("stats/def", 50.0);
        let guard = Modifier::new("guard", "stats/def", ModifierOperation::IncreasePercent, 20.0);

        guard.apply(&mut attrs).unwrap();
        assert_eq!(attrs.property("stats/def"), Some(60.0));
        guard.revert(&mut attrs).unwrap();
        assert_eq!(attrs.property("stats/def"), Some(50.0));

        let set = Modifier::new("set", "stats/def", ModifierOperation::Set, 1.0);
        set.apply(&mut attrs).unwrap();
        assert_eq!(set.revert(&mut attrs), Ok(1.0));
    }

    #[test]
    fn missing_property_fails_without_writing() {
        let mut attrs = Attributes::new().with("stats/hp", 10.0);
        let modifier = Modifier::new("mp", "stats/mp", ModifierOperation::Increase, 5.0);

        assert_eq!(
            modifier.apply(&mut attrs),
            Err(AttributeError::PathNotFound("stats/mp".to_string()))
        );
        assert_eq!(attrs.leaves(), vec![("stats/hp".to_string(), 10.0)]);
    }
}
