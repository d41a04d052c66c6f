//! Level list loader.

use std::path::Path;

use rpg_core::{LevelDefinition, LevelsSetDefinition};

use crate::loaders::{LoadResult, read_file};

/// Loader for level lists and standalone tracks from RON files.
pub struct LevelsLoader;

impl LevelsLoader {
    /// Load a list of level definitions.
    ///
    /// Keys are checked when the track is built, not here.
    pub fn load(path: &Path) -> LoadResult<Vec<LevelDefinition>> {
        let content = read_file(path)?;
        ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse levels RON at {}: {}", path.display(), e))
    }

    /// Load a complete track (key, levels and options).
    pub fn load_set(path: &Path) -> LoadResult<LevelsSetDefinition> {
        let content = read_file(path)?;
        ron::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse levels set RON at {}: {}", path.display(), e)
        })
    }
}
