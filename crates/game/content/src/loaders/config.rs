//! Skills configuration loader.

use std::path::Path;

use rpg_core::SkillsConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for skills configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Missing keys fall back to the defaults of [`SkillsConfig`].
    pub fn load(path: &Path) -> LoadResult<SkillsConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<SkillsConfig> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = ConfigLoader::parse("scope_prefix = \"player\"\ngame_seed = 42\n").unwrap();

        assert_eq!(config.scope_prefix, "player");
        assert_eq!(config.game_seed, 42);
        assert_eq!(config.critical_multiplier, SkillsConfig::DEFAULT_CRITICAL_MULTIPLIER);
    }

    #[test]
    fn malformed_config_is_an_error() {
        assert!(ConfigLoader::parse("critical_multiplier = \"high\"").is_err());
    }
}
