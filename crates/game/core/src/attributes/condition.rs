//! Conditions - boolean predicates over an entity's attributes.

use super::path::AttributeAccess;

/// Comparison applied between an attribute and a condition value.
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
pub enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    pub fn holds(self, left: f64, right: f64) -> bool {
        match self {
            Self::Eq => left == right,
            Self::Ne => left != right,
            Self::Lt => left < right,
            Self::Le => left <= right,
            Self::Gt => left > right,
            Self::Ge => left >= right,
        }
    }
}

/// Predicate such as "`stats/mp` >= 10" used to gate skill validation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Condition {
    pub key: String,
    pub property_key: String,
    pub comparison: Comparison,
    pub value: f64,
}

impl Condition {
    pub fn new(
        key: impl Into<String>,
        property_key: impl Into<String>,
        comparison: Comparison,
        value: f64,
    ) -> Self {
        Self {
            key: key.into(),
            property_key: property_key.into(),
            comparison,
            value,
        }
    }

    /// Evaluates the condition; an absent attribute never satisfies it.
    pub fn is_valid_on<T>(&self, entity: &T) -> bool
    where
        T: AttributeAccess + ?Sized,
    {
        entity
            .property(&self.property_key)
            .is_some_and(|current| self.comparison.holds(current, self.value))
    }
}
