use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, warn};

use crate::config::SkillsConfig;
use crate::error::LevelError;
use crate::events::{EventBus, GameEvent};
use crate::skill::{Skill, SkillContext, SkillDefinition};
use crate::state::{EntityId, World};

use super::level::{LevelDefinition, levels_from_definitions};
use super::levels_set::{LevelsSet, LevelsSetOptions};
use super::track::LevelTrack;

/// Serialized form of a class path. Skills are referenced by key.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassPathDefinition {
    pub key: String,
    pub label: String,
    pub levels: Vec<LevelDefinition>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub options: LevelsSetOptions,
    #[cfg_attr(feature = "serde", serde(default))]
    pub labels_by_level: BTreeMap<i32, String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub skills_by_level: BTreeMap<i32, Vec<String>>,
}

/// Progression track that unlocks skills and switches labels by level.
///
/// Current skills are the skills of every level up to the current one, minus
/// the ones removed explicitly, plus the ones added explicitly.
#[derive(Clone, Debug)]
pub struct ClassPath {
    key: String,
    label: String,
    levels: LevelsSet,
    labels_by_level: BTreeMap<i32, String>,
    skills_by_level: BTreeMap<i32, Vec<Skill>>,
    current_skills: BTreeMap<String, Skill>,
    removed: BTreeSet<String>,
    current_label: String,
}

impl ClassPath {
    /// Builds a class path over `levels` and unlocks the skills of every
    /// level up to the current one.
    ///
    /// # Arguments
    ///
    /// * `label` - Base label, used until a level override applies
    /// * `levels` - Track the class path progresses along
    /// * `labels_by_level` - Label overrides keyed by the level they start at
    /// * `skills_by_level` - Skills unlocked when their level is reached
    pub fn new(
        label: impl Into<String>,
        levels: LevelsSet,
        labels_by_level: BTreeMap<i32, String>,
        skills_by_level: BTreeMap<i32, Vec<Skill>>,
        bus: &EventBus,
    ) -> Self {
        let label = label.into();
        let mut class_path = Self {
            key: levels.key().to_string(),
            current_label: label.clone(),
            label,
            levels,
            labels_by_level,
            skills_by_level,
            current_skills: BTreeMap::new(),
            removed: BTreeSet::new(),
        };
        class_path.refresh_label();
        class_path.set_skills(bus);
        class_path
    }

    /// Builds a class path for `owner`, resolving skill keys through `resolve`.
    ///
    /// Unknown skill keys are logged and skipped.
    pub fn from_definition<F>(
        definition: ClassPathDefinition,
        owner: EntityId,
        mut resolve: F,
        config: &SkillsConfig,
        bus: &EventBus,
    ) -> Result<Self, LevelError>
    where
        F: FnMut(&str) -> Option<SkillDefinition>,
    {
        let ClassPathDefinition {
            key,
            label,
            levels,
            mut options,
            labels_by_level,
            skills_by_level,
        } = definition;

        options
            .auto_fill_experience_multiplier
            .get_or_insert(config.auto_fill_experience_multiplier);
        let levels = levels_from_definitions(&key, levels);
        let levels = LevelsSet::new(key.clone(), owner, levels, options, bus)?;

        let mut skills = BTreeMap::new();
        for (level, keys) in skills_by_level {
            let resolved: Vec<Skill> = keys
                .iter()
                .filter_map(|skill_key| match resolve(skill_key) {
                    Some(definition) => Some(Skill::with_config(definition, owner, None, config)),
                    None => {
                        warn!(target: "rpg::progression", class_path = %key, skill = %skill_key, "unknown skill skipped");
                        None
                    }
                })
                .collect();
            skills.insert(level, resolved);
        }

        Ok(Self::new(label, levels, labels_by_level, skills, bus))
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn owner(&self) -> EntityId {
        self.levels.owner()
    }

    /// Base label, used until a level override applies.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Latest label override at or below the current level, else the base
    /// label.
    pub fn current_label(&self) -> &str {
        &self.current_label
    }

    /// Skill templates by the level that unlocks them.
    pub fn skills_by_level(&self) -> &BTreeMap<i32, Vec<Skill>> {
        &self.skills_by_level
    }

    /// Current skill with `key`; locked skills are not returned.
    pub fn skill(&self, key: &str) -> Option<&Skill> {
        self.current_skills.get(key)
    }

    pub fn skill_mut(&mut self, key: &str) -> Option<&mut Skill> {
        self.current_skills.get_mut(key)
    }

    pub fn has_skill(&self, key: &str) -> bool {
        self.current_skills.contains_key(key)
    }

    pub fn skills(&self) -> impl Iterator<Item = &Skill> {
        self.current_skills.values()
    }

    /// Keys of the current skills in ascending order.
    pub fn skill_keys(&self) -> Vec<String> {
        self.current_skills.keys().cloned().collect()
    }

    /// Rebuilds current skills from the levels unlocked so far.
    ///
    /// Skills that stay unlocked keep their state (uses, timers).
    pub fn set_skills(&mut self, bus: &EventBus) {
        let mut previous = std::mem::take(&mut self.current_skills);
        let mapped = self.mapped_keys(..);

        for skills in self
            .skills_by_level
            .range(..=self.levels.current_level())
            .map(|(_, skills)| skills)
        {
            for skill in skills {
                if self.removed.contains(skill.key()) || self.current_skills.contains_key(skill.key()) {
                    continue;
                }
                let instance = previous
                    .remove(skill.key())
                    .unwrap_or_else(|| skill.clone());
                self.current_skills.insert(skill.key().to_string(), instance);
            }
        }
        // Skills added by hand belong to no level and survive the rebuild.
        for (key, skill) in previous {
            if !mapped.contains(&key) {
                self.current_skills.insert(key, skill);
            }
        }

        bus.emit(&GameEvent::SetSkills {
            owner: self.owner(),
            track: self.key.clone(),
            skills: self.skill_keys(),
        });
    }

    /// Adds skills outside of level unlocking. Returns the keys added.
    pub fn add_skills(&mut self, skills: Vec<Skill>, bus: &EventBus) -> Vec<String> {
        for skill in &skills {
            self.removed.remove(skill.key());
        }
        self.insert_skills(skills, bus)
    }

    /// Removes skills until they are added again. Returns the keys removed.
    pub fn remove_skills(&mut self, world: &mut dyn World, keys: &[&str], bus: &EventBus) -> Vec<String> {
        let keys: Vec<String> = keys.iter().map(|key| (*key).to_string()).collect();
        self.removed.extend(keys.iter().cloned());
        self.drop_skills(world, &keys, bus)
    }

    /// Sets progress loaded from storage without applying level modifiers.
    pub fn restore_progress(&mut self, level: i32, experience: f64, bus: &EventBus) -> Result<(), LevelError> {
        self.levels.set_progress(level, experience)?;
        self.refresh_label();
        self.set_skills(bus);
        Ok(())
    }

    /// Resolves due timers of every current skill.
    ///
    /// Returns the key and result of every cast finished by this call.
    pub fn update_skills(&mut self, world: &mut dyn World, ctx: &mut SkillContext<'_>) -> Vec<(String, bool)> {
        self.current_skills
            .iter_mut()
            .filter_map(|(key, skill)| skill.update(world, ctx).map(|result| (key.clone(), result)))
            .collect()
    }

    fn insert_skills(&mut self, skills: Vec<Skill>, bus: &EventBus) -> Vec<String> {
        let skills: Vec<Skill> = skills
            .into_iter()
            .filter(|skill| !self.current_skills.contains_key(skill.key()))
            .collect();
        if skills.is_empty() {
            return Vec::new();
        }
        let keys: Vec<String> = skills.iter().map(|skill| skill.key().to_string()).collect();

        bus.emit(&GameEvent::BeforeAddSkills {
            owner: self.owner(),
            track: self.key.clone(),
            skills: keys.clone(),
        });
        for skill in skills {
            self.current_skills.insert(skill.key().to_string(), skill);
        }
        bus.emit(&GameEvent::AfterAddSkills {
            owner: self.owner(),
            track: self.key.clone(),
            skills: keys.clone(),
        });
        keys
    }

    /// Removes skills, cancelling their timers so the owner does not stay casting.
    fn drop_skills(&mut self, world: &mut dyn World, keys: &[String], bus: &EventBus) -> Vec<String> {
        let keys: Vec<String> = keys
            .iter()
            .filter(|key| self.current_skills.contains_key(key.as_str()))
            .cloned()
            .collect();
        if keys.is_empty() {
            return Vec::new();
        }

        bus.emit(&GameEvent::BeforeRemoveSkills {
            owner: self.owner(),
            track: self.key.clone(),
            skills: keys.clone(),
        });
        for key in &keys {
            if let Some(mut skill) = self.current_skills.remove(key) {
                skill.cancel_timers(world);
            }
        }
        bus.emit(&GameEvent::AfterRemoveSkills {
            owner: self.owner(),
            track: self.key.clone(),
            skills: keys.clone(),
        });
        keys
    }

    fn mapped_keys<R>(&self, range: R) -> BTreeSet<String>
    where
        R: std::ops::RangeBounds<i32>,
    {
        self.skills_by_level
            .range(range)
            .flat_map(|(_, skills)| skills.iter().map(|skill| skill.key().to_string()))
            .collect()
    }

    fn refresh_label(&mut self) {
        self.current_label = self
            .labels_by_level
            .range(..=self.levels.current_level())
            .next_back()
            .map_or_else(|| self.label.clone(), |(_, label)| label.clone());
    }
}

impl LevelTrack for ClassPath {
    fn levels_set(&self) -> &LevelsSet {
        &self.levels
    }

    fn levels_set_mut(&mut self) -> &mut LevelsSet {
        &mut self.levels
    }

    fn on_level_up(&mut self, _world: &mut dyn World, level: i32, bus: &EventBus) {
        let unlocked: Vec<Skill> = self
            .skills_by_level
            .range(..=level)
            .flat_map(|(_, skills)| skills.iter())
            .filter(|skill| {
                !self.removed.contains(skill.key()) && !self.current_skills.contains_key(skill.key())
            })
            .cloned()
            .collect();
        let added = self.insert_skills(unlocked, bus);
        if !added.is_empty() {
            debug!(target: "rpg::progression", class_path = %self.key, level, skills = ?added, "skills unlocked");
        }
        self.refresh_label();
    }

    fn on_level_down(&mut self, world: &mut dyn World, left: i32, bus: &EventBus) {
        let current = self.levels.current_level();
        let still_unlocked = self.mapped_keys(..=current);
        let exclusive: Vec<String> = self
            .mapped_keys(current + 1..=left)
            .into_iter()
            .filter(|key| !still_unlocked.contains(key))
            .collect();
        let removed = self.drop_skills(world, &exclusive, bus);
        if !removed.is_empty() {
            debug!(target: "rpg::progression", class_path = %self.key, level = current, skills = ?removed, "skills locked");
        }
        self.refresh_label();
    }
}
