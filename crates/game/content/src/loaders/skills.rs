//! Skill catalog loader.

use std::collections::BTreeMap;
use std::path::Path;

use rpg_core::SkillDefinition;
use tracing::warn;

use crate::loaders::{LoadResult, read_file};

/// Skill definitions indexed by key.
///
/// Class paths reference skills by key; the catalog resolves those keys when a
/// class path is instantiated for an owner.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillCatalog {
    skills: BTreeMap<String, SkillDefinition>,
}

impl SkillCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a definition. Returns the replaced one.
    pub fn insert(&mut self, definition: SkillDefinition) -> Option<SkillDefinition> {
        self.skills.insert(definition.key.clone(), definition)
    }

    pub fn get(&self, key: &str) -> Option<&SkillDefinition> {
        self.skills.get(key)
    }

    /// Owned copy of a definition, ready to be instantiated.
    pub fn resolve(&self, key: &str) -> Option<SkillDefinition> {
        self.skills.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.skills.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.skills.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

impl FromIterator<SkillDefinition> for SkillCatalog {
    fn from_iter<I: IntoIterator<Item = SkillDefinition>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for definition in iter {
            catalog.insert(definition);
        }
        catalog
    }
}

/// Loader for skill catalogs from RON files.
pub struct SkillLoader;

impl SkillLoader {
    /// Load a skill catalog from a RON map of `key -> definition`.
    ///
    /// The map key wins over a missing `key` field inside the definition.
    /// Unusable definitions are kept (they build skills that are never ready)
    /// but reported.
    pub fn load(path: &Path) -> LoadResult<SkillCatalog> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse skill catalog RON at {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<SkillCatalog> {
        let raw: BTreeMap<String, SkillDefinition> = ron::from_str(content)?;

        let mut catalog = SkillCatalog::new();
        for (key, mut definition) in raw {
            if definition.key.is_empty() {
                definition.key = key;
            } else if definition.key != key {
                warn!(entry = %key, skill = %definition.key, "skill key differs from its catalog entry");
            }
            if let Some(reason) = definition.defect() {
                warn!(skill = %definition.key, reason, "skill definition is not usable");
            }
            catalog.insert(definition);
        }
        Ok(catalog)
    }
}
