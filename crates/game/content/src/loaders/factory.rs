//! Content factory for loading every content file of a data directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rpg_core::{ClassPathDefinition, SkillsConfig};
use tracing::{debug, info, warn};

use crate::loaders::{ClassPathLoader, ConfigLoader, LoadResult, SkillCatalog, SkillLoader};

/// Everything a runtime needs to instantiate skills and class paths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentBundle {
    pub config: SkillsConfig,
    pub skills: SkillCatalog,
    pub class_paths: BTreeMap<String, ClassPathDefinition>,
}

impl ContentBundle {
    pub fn class_path(&self, key: &str) -> Option<&ClassPathDefinition> {
        self.class_paths.get(key)
    }

    /// Skill keys referenced by class paths but absent from the catalog.
    pub fn missing_skills(&self) -> Vec<(String, String)> {
        self.class_paths
            .values()
            .flat_map(|class_path| {
                class_path
                    .skills_by_level
                    .values()
                    .flatten()
                    .filter(|key| !self.skills.contains(key))
                    .map(|key| (class_path.key.clone(), key.clone()))
            })
            .collect()
    }
}

/// Content factory that loads all game content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml        (optional)
/// ├── skills.ron
/// └── class_paths/       (optional)
///     ├── warrior.ron
///     └── mage.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Loads a whole data directory in one call.
    pub fn load_dir(data_dir: impl Into<PathBuf>) -> LoadResult<ContentBundle> {
        Self::new(data_dir).load_bundle()
    }

    /// Load skills configuration from `config.toml`, or defaults when absent.
    pub fn load_config(&self) -> LoadResult<SkillsConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(SkillsConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the skill catalog from `skills.ron`.
    pub fn load_skills(&self) -> LoadResult<SkillCatalog> {
        let path = self.data_dir.join("skills.ron");
        SkillLoader::load(&path)
    }

    /// Load every class path from `class_paths/`, keyed by class path key.
    pub fn load_class_paths(&self) -> LoadResult<BTreeMap<String, ClassPathDefinition>> {
        let dir = self.data_dir.join("class_paths");
        if !dir.is_dir() {
            return Ok(BTreeMap::new());
        }

        let mut class_paths = BTreeMap::new();
        for definition in ClassPathLoader::load_dir(&dir)? {
            let key = definition.key.clone();
            if class_paths.insert(key.clone(), definition).is_some() {
                anyhow::bail!("Duplicate class path key {} in {}", key, dir.display());
            }
        }
        Ok(class_paths)
    }

    pub fn load_bundle(&self) -> LoadResult<ContentBundle> {
        let bundle = ContentBundle {
            config: self.load_config()?,
            skills: self.load_skills()?,
            class_paths: self.load_class_paths()?,
        };

        for (class_path, skill) in bundle.missing_skills() {
            warn!(%class_path, %skill, "class path references an unknown skill");
        }
        info!(
            data_dir = %self.data_dir.display(),
            skills = bundle.skills.len(),
            class_paths = bundle.class_paths.len(),
            "content loaded"
        );
        Ok(bundle)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const SKILLS: &str = r#"{
        "strike": (kind: attack((hit_damage: 8.0, apply_direct_damage: true))),
        "cleave": (range: 1, kind: attack((hit_damage: 14.0))),
    }"#;

    const WARRIOR: &str = r#"(
        key: "warrior",
        label: "Squire",
        levels: [
            (key: 1.0, required_experience: 0.0),
            (key: 3.0, required_experience: 300.0, label: Some("Veteran")),
        ],
        options: (auto_fill_ranges: true),
        labels_by_level: { 3: "Knight" },
        skills_by_level: { 1: ["strike"], 3: ["cleave", "whirlwind"] },
    )"#;

    fn data_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("skills.ron"), SKILLS).unwrap();
        fs::create_dir(dir.path().join("class_paths")).unwrap();
        fs::write(dir.path().join("class_paths").join("warrior.ron"), WARRIOR).unwrap();
        dir
    }

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn bundle_loads_every_file() {
        let dir = data_dir();
        fs::write(dir.path().join("config.toml"), "critical_multiplier = 3.0\n").unwrap();

        let bundle = ContentFactory::load_dir(dir.path()).unwrap();

        assert_eq!(bundle.config.critical_multiplier, 3.0);
        assert_eq!(bundle.skills.len(), 2);
        let warrior = bundle.class_path("warrior").unwrap();
        assert_eq!(warrior.levels.len(), 2);
        assert!(warrior.options.auto_fill_ranges);
        assert_eq!(warrior.labels_by_level[&3], "Knight");
        assert_eq!(
            bundle.missing_skills(),
            vec![("warrior".to_string(), "whirlwind".to_string())]
        );
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let dir = data_dir();
        let bundle = ContentFactory::load_dir(dir.path()).unwrap();
        assert_eq!(bundle.config, SkillsConfig::default());
    }

    #[test]
    fn missing_skill_catalog_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let error = ContentFactory::load_dir(dir.path()).unwrap_err();
        assert!(error.to_string().contains("skills.ron"));
    }

    #[test]
    fn duplicate_class_paths_are_rejected() {
        let dir = data_dir();
        fs::write(dir.path().join("class_paths").join("copy.ron"), WARRIOR).unwrap();
        assert!(ContentFactory::load_dir(dir.path()).is_err());
    }
}
