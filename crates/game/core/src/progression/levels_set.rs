use std::collections::BTreeMap;
use std::ops::Bound;

use tracing::{debug, warn};

use crate::attributes::AppliedModifier;
use crate::config::SkillsConfig;
use crate::error::LevelError;
use crate::events::{EventBus, GameEvent};
use crate::state::{EntityId, World};

use super::level::{Level, LevelDefinition, levels_from_definitions};

/// Behaviour switches of a progression track.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct LevelsSetOptions {
    /// Synthesizes every missing key between the lowest and highest level.
    pub auto_fill_ranges: bool,
    /// Growth of the experience increments between synthesized levels.
    /// Falls back to the configured multiplier.
    pub auto_fill_experience_multiplier: Option<f64>,
    /// Levels up automatically when experience reaches the next requirement.
    pub increase_levels_with_experience: bool,
    /// Caps experience at the top level's requirement.
    pub set_required_experience_limit: bool,
}

impl Default for LevelsSetOptions {
    fn default() -> Self {
        Self {
            auto_fill_ranges: false,
            auto_fill_experience_multiplier: None,
            increase_levels_with_experience: true,
            set_required_experience_limit: false,
        }
    }
}

/// Serialized form of a progression track.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelsSetDefinition {
    pub key: String,
    pub levels: Vec<LevelDefinition>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub options: LevelsSetOptions,
}

/// Ordered levels of one track with the owner's progress along it.
///
/// Modifiers applied on level-up are recorded per level so level-down removes
/// exactly what was added.
#[derive(Clone, Debug)]
pub struct LevelsSet {
    key: String,
    owner: EntityId,
    levels: BTreeMap<i32, Level>,
    current_level: i32,
    current_exp: f64,
    options: LevelsSetOptions,
    applied: BTreeMap<i32, Vec<AppliedModifier>>,
}

impl LevelsSet {
    /// Builds the track and starts it at its lowest level.
    ///
    /// No modifiers are applied for the starting level.
    pub fn new(
        key: impl Into<String>,
        owner: EntityId,
        levels: Vec<Level>,
        options: LevelsSetOptions,
        bus: &EventBus,
    ) -> Result<Self, LevelError> {
        let key = key.into();
        bus.emit(&GameEvent::LevelsSetInitStart {
            owner,
            track: key.clone(),
        });

        let mut levels: BTreeMap<i32, Level> =
            levels.into_iter().map(|level| (level.key(), level)).collect();
        let Some(current_level) = levels.keys().next().copied() else {
            return Err(LevelError::EmptySet(key));
        };

        if options.auto_fill_ranges {
            let multiplier = options
                .auto_fill_experience_multiplier
                .unwrap_or(SkillsConfig::DEFAULT_AUTO_FILL_EXPERIENCE_MULTIPLIER);
            let generated = auto_fill_levels(&mut levels, multiplier);
            if !generated.is_empty() {
                bus.emit(&GameEvent::GeneratedLevels {
                    owner,
                    track: key.clone(),
                    keys: generated,
                });
            }
        }

        bus.emit(&GameEvent::LevelsSetInitEnd {
            owner,
            track: key.clone(),
            levels: levels.len(),
        });

        Ok(Self {
            key,
            owner,
            levels,
            current_level,
            current_exp: 0.0,
            options,
            applied: BTreeMap::new(),
        })
    }

    /// Builds the track from its serialized form.
    ///
    /// Level definitions with a non-integral key or invalid experience are
    /// logged and skipped.
    pub fn from_definition(
        definition: LevelsSetDefinition,
        owner: EntityId,
        bus: &EventBus,
    ) -> Result<Self, LevelError> {
        let levels = levels_from_definitions(&definition.key, definition.levels);
        Self::new(definition.key, owner, levels, definition.options, bus)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    pub fn options(&self) -> &LevelsSetOptions {
        &self.options
    }

    /// Every level of the track by key, synthesized ones included.
    pub fn levels(&self) -> &BTreeMap<i32, Level> {
        &self.levels
    }

    pub fn level(&self, key: i32) -> Option<&Level> {
        self.levels.get(&key)
    }

    pub fn current_level(&self) -> i32 {
        self.current_level
    }

    pub fn current_exp(&self) -> f64 {
        self.current_exp
    }

    /// Key of the level above the current one. Keys need not be contiguous.
    pub fn next_level_key(&self) -> Option<i32> {
        self.levels
            .range((Bound::Excluded(self.current_level), Bound::Unbounded))
            .next()
            .map(|(key, _)| *key)
    }

    /// Key of the level below the current one.
    pub fn previous_level_key(&self) -> Option<i32> {
        self.levels
            .range(..self.current_level)
            .next_back()
            .map(|(key, _)| *key)
    }

    /// Whether the current level is the highest one.
    pub fn is_top_level(&self) -> bool {
        self.next_level_key().is_none()
    }

    /// Experience required by the next level, or by the current one at the top.
    pub fn next_level_experience(&self) -> f64 {
        self.next_level_key()
            .or(Some(self.current_level))
            .and_then(|key| self.levels.get(&key))
            .map_or(0.0, Level::required_experience)
    }

    /// Records of the modifiers applied when `level` was entered.
    pub fn applied_modifiers(&self, level: i32) -> &[AppliedModifier] {
        self.applied.get(&level).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Overwrites progress without touching the owner's attributes.
    ///
    /// Fails with [`LevelError::UnknownLevel`] when `level` is not part of the
    /// track; the current progress is left untouched in that case. The
    /// experience cap applies to restored progress as well.
    pub fn set_progress(&mut self, level: i32, experience: f64) -> Result<(), LevelError> {
        if !self.levels.contains_key(&level) {
            return Err(LevelError::UnknownLevel(level));
        }
        self.current_level = level;
        self.current_exp = experience.max(0.0);
        self.applied.clear();
        self.apply_experience_limit();
        Ok(())
    }

    /// Enters the next level and applies its modifiers. Returns the new level.
    pub(crate) fn step_up(&mut self, world: &mut dyn World, bus: &EventBus) -> Option<i32> {
        let Some(next) = self.next_level_key() else {
            debug!(target: "rpg::progression", track = %self.key, "already at the top level");
            return None;
        };
        self.current_level = next;
        self.apply_level_modifiers(world, next, bus);
        self.apply_experience_limit();

        debug!(target: "rpg::progression", track = %self.key, owner = %self.owner, level = next, "level up");
        bus.emit(&GameEvent::LevelUp {
            owner: self.owner,
            track: self.key.clone(),
            level: next,
            experience: self.current_exp,
        });
        Some(next)
    }

    /// Returns to the previous level, reverting the modifiers of the level left.
    /// Returns the level left.
    pub(crate) fn step_down(&mut self, world: &mut dyn World, bus: &EventBus) -> Option<i32> {
        let Some(previous) = self.previous_level_key() else {
            debug!(target: "rpg::progression", track = %self.key, "already at the bottom level");
            return None;
        };
        let left = self.current_level;
        self.current_level = previous;
        self.revert_level_modifiers(world, left, bus);

        debug!(target: "rpg::progression", track = %self.key, owner = %self.owner, level = previous, "level down");
        bus.emit(&GameEvent::LevelDown {
            owner: self.owner,
            track: self.key.clone(),
            level: previous,
            experience: self.current_exp,
        });
        Some(left)
    }

    pub(crate) fn gain_experience(&mut self, amount: f64, bus: &EventBus) -> bool {
        if !amount.is_finite() || amount < 0.0 {
            warn!(target: "rpg::progression", track = %self.key, amount, "invalid experience amount ignored");
            return false;
        }
        self.current_exp += amount;
        self.apply_experience_limit();
        bus.emit(&GameEvent::ExperienceAdded {
            owner: self.owner,
            track: self.key.clone(),
            level: self.current_level,
            amount,
            total: self.current_exp,
        });
        true
    }

    /// Requirement of the next level when experience may still raise the level.
    pub(crate) fn pending_level_requirement(&self) -> Option<f64> {
        if !self.options.increase_levels_with_experience {
            return None;
        }
        self.next_level_key()
            .and_then(|key| self.levels.get(&key))
            .map(Level::required_experience)
    }

    /// Clamps experience to the top requirement while the track sits at its
    /// top level. Runs before any total is published.
    fn apply_experience_limit(&mut self) {
        if !self.options.set_required_experience_limit || !self.is_top_level() {
            return;
        }
        if let Some(top) = self.levels.get(&self.current_level) {
            self.current_exp = self.current_exp.min(top.required_experience());
        }
    }

    fn apply_level_modifiers(&mut self, world: &mut dyn World, level: i32, bus: &EventBus) {
        let Some(modifiers) = self.levels.get(&level).map(Level::modifiers) else {
            return;
        };
        if modifiers.is_empty() {
            return;
        }
        let Some(owner) = world.entity_mut(self.owner) else {
            warn!(target: "rpg::progression", track = %self.key, owner = %self.owner, "owner missing, level modifiers not applied");
            return;
        };

        let mut applied = Vec::with_capacity(modifiers.len());
        for modifier in modifiers {
            match modifier.apply(&mut *owner) {
                Ok(record) => applied.push(record),
                Err(error) => warn!(
                    target: "rpg::progression",
                    track = %self.key,
                    modifier = %modifier.key,
                    %error,
                    "level modifier skipped"
                ),
            }
        }

        self.applied.insert(level, applied.clone());
        bus.emit(&GameEvent::LevelModifiersApplied {
            owner: self.owner,
            track: self.key.clone(),
            level,
            applied,
        });
    }

    /// Reverts the recorded applications of `level`; without records (progress
    /// restored from storage) the level's modifiers are inverted instead.
    fn revert_level_modifiers(&mut self, world: &mut dyn World, level: i32, bus: &EventBus) {
        let records = self.applied.remove(&level);
        let Some(owner) = world.entity_mut(self.owner) else {
            warn!(target: "rpg::progression", track = %self.key, owner = %self.owner, "owner missing, level modifiers not reverted");
            return;
        };

        let mut reverted = Vec::new();
        match records {
            Some(records) => {
                for record in records.iter().rev() {
                    match record.revert(&mut *owner) {
                        Ok(_) => reverted.push(record.modifier_key.clone()),
                        Err(error) => warn!(target: "rpg::progression", track = %self.key, %error, "level modifier not reverted"),
                    }
                }
            }
            None => {
                let modifiers = self.levels.get(&level).map(Level::modifiers).unwrap_or_default();
                for modifier in modifiers.iter().rev() {
                    match modifier.revert(&mut *owner) {
                        Ok(_) => reverted.push(modifier.key.clone()),
                        Err(error) => warn!(target: "rpg::progression", track = %self.key, %error, "level modifier not reverted"),
                    }
                }
            }
        }

        if !reverted.is_empty() {
            bus.emit(&GameEvent::LevelModifiersReverted {
                owner: self.owner,
                track: self.key.clone(),
                level,
                modifiers: reverted,
            });
        }
    }
}

/// Inserts a level for every missing key between consecutive levels.
///
/// Within each gap the required experience moves from the lower to the upper
/// level in increments that grow by `multiplier` (equal increments for 1), so
/// generated values stay strictly between their neighbours. Returns the
/// generated keys.
pub fn auto_fill_levels(levels: &mut BTreeMap<i32, Level>, multiplier: f64) -> Vec<i32> {
    let multiplier = if multiplier.is_finite() && multiplier > 0.0 {
        multiplier
    } else {
        warn!(target: "rpg::progression", multiplier, "invalid auto-fill multiplier, using 1");
        1.0
    };

    let anchors: Vec<(i32, f64)> = levels
        .values()
        .map(|level| (level.key(), level.required_experience()))
        .collect();

    let mut generated = Vec::new();
    for pair in anchors.windows(2) {
        let (low, low_exp) = pair[0];
        let (high, high_exp) = pair[1];
        let steps = high - low;
        if steps < 2 {
            continue;
        }

        let weights: Vec<f64> = (0..steps).map(|step| multiplier.powi(step)).collect();
        let total: f64 = weights.iter().sum();
        let mut accumulated = 0.0;
        for (key, weight) in (low + 1..high).zip(&weights) {
            accumulated += weight;
            let experience = low_exp + (high_exp - low_exp) * accumulated / total;
            levels.insert(key, Level::synthesized(key, experience));
            generated.push(key);
        }
    }
    generated
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchors(pairs: &[(i32, f64)]) -> BTreeMap<i32, Level> {
        pairs
            .iter()
            .map(|(key, exp)| (*key, Level::new(*key, *exp).unwrap()))
            .collect()
    }

    #[test]
    fn linear_fill_spaces_experience_evenly() {
        let mut levels = anchors(&[(1, 10.0), (5, 1000.0)]);
        let generated = auto_fill_levels(&mut levels, 1.0);

        assert_eq!(generated, vec![2, 3, 4]);
        let exps: Vec<f64> = levels.values().map(Level::required_experience).collect();
        assert_eq!(exps, vec![10.0, 257.5, 505.0, 752.5, 1000.0]);
        assert!(levels.values().all(|level| level.modifiers().is_empty()));
    }

    #[test]
    fn growing_fill_stays_between_bounds() {
        let mut levels = anchors(&[(1, 0.0), (4, 700.0)]);
        auto_fill_levels(&mut levels, 2.0);

        // Increments 1:2:4 of 700.
        assert_eq!(levels[&2].required_experience(), 100.0);
        assert_eq!(levels[&3].required_experience(), 300.0);
    }

    #[test]
    fn adjacent_levels_generate_nothing() {
        let mut levels = anchors(&[(1, 0.0), (2, 10.0), (3, 20.0)]);
        assert!(auto_fill_levels(&mut levels, 1.0).is_empty());
        assert_eq!(levels.len(), 3);
    }

    #[test]
    fn empty_track_is_rejected() {
        let bus = EventBus::default();
        let result = LevelsSet::new("empty", EntityId(1), Vec::new(), LevelsSetOptions::default(), &bus);
        assert_eq!(result.err(), Some(LevelError::EmptySet("empty".to_string())));
    }
}
