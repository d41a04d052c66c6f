//! Content loaders for reading game data from files.
//!
//! RON holds skills, levels and class paths; TOML holds configuration.

pub mod class_path;
pub mod config;
pub mod factory;
pub mod levels;
pub mod skills;

pub use class_path::ClassPathLoader;
pub use config::ConfigLoader;
pub use factory::{ContentBundle, ContentFactory};
pub use levels::LevelsLoader;
pub use skills::{SkillCatalog, SkillLoader};

use std::path::{Path, PathBuf};

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}

/// Lists the files of `dir` with the given extension, sorted by path.
pub(crate) fn files_with_extension(dir: &Path, extension: &str) -> LoadResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {}", dir.display(), e))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
