use tracing::error;

use crate::attributes::Modifier;
use crate::error::LevelError;

/// Serialized form of a level.
///
/// Keys arrive as numbers from content files and must be integers.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelDefinition {
    pub key: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub label: Option<String>,
    pub required_experience: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub modifiers: Vec<Modifier>,
}

impl LevelDefinition {
    /// Definition without label or modifiers. `key` must be integral to
    /// build a [`Level`].
    pub fn new(key: f64, required_experience: f64) -> Self {
        Self {
            key,
            label: None,
            required_experience,
            modifiers: Vec::new(),
        }
    }
}

/// One rung of a progression track. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Level {
    key: i32,
    label: String,
    required_experience: f64,
    modifiers: Vec<Modifier>,
}

impl Level {
    /// Creates a level without label or modifiers.
    ///
    /// # Errors
    ///
    /// Returns [`LevelError::NegativeExperience`] when `required_experience`
    /// is negative or NaN.
    pub fn new(key: i32, required_experience: f64) -> Result<Self, LevelError> {
        if required_experience.is_nan() || required_experience < 0.0 {
            return Err(LevelError::NegativeExperience {
                key,
                experience: required_experience,
            });
        }
        Ok(Self::synthesized(key, required_experience))
    }

    /// Level generated between two provided levels: no modifiers, key as label.
    pub(crate) fn synthesized(key: i32, required_experience: f64) -> Self {
        Self {
            key,
            label: key.to_string(),
            required_experience,
            modifiers: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    pub fn with_modifiers(mut self, modifiers: Vec<Modifier>) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn key(&self) -> i32 {
        self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Total experience an owner needs to enter this level.
    pub fn required_experience(&self) -> f64 {
        self.required_experience
    }

    /// Modifiers applied to the owner on entering the level, in order.
    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }
}

impl TryFrom<LevelDefinition> for Level {
    type Error = LevelError;

    fn try_from(definition: LevelDefinition) -> Result<Self, Self::Error> {
        let key = definition.key;
        let in_range = key >= f64::from(i32::MIN) && key <= f64::from(i32::MAX);
        if !key.is_finite() || key.fract() != 0.0 || !in_range {
            return Err(LevelError::InvalidKey(key));
        }
        let key = key as i32;

        let level = Self::new(key, definition.required_experience)?;
        let level = match definition.label {
            Some(label) => level.with_label(label),
            None => level,
        };
        Ok(level.with_modifiers(definition.modifiers))
    }
}

/// Builds levels from definitions, logging and skipping invalid ones.
pub fn levels_from_definitions(
    track: &str,
    definitions: impl IntoIterator<Item = LevelDefinition>,
) -> Vec<Level> {
    definitions
        .into_iter()
        .filter_map(|definition| match Level::try_from(definition) {
            Ok(level) => Some(level),
            Err(err) => {
                error!(target: "rpg::progression", track, error = %err, "level skipped");
                None
            }
        })
        .collect()
}
