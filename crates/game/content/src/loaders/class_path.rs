//! Class path loader.

use std::path::Path;

use rpg_core::ClassPathDefinition;

use crate::loaders::{LoadResult, files_with_extension, read_file};

/// Loader for class paths from RON files.
///
/// # File format
///
/// ```ron
/// (
///     key: "warrior",
///     label: "Squire",
///     levels: [
///         (key: 1.0, required_experience: 0.0),
///         (key: 5.0, required_experience: 1000.0),
///     ],
///     options: (auto_fill_ranges: true),
///     labels_by_level: { 5: "Knight" },
///     skills_by_level: { 1: ["strike"], 5: ["cleave"] },
/// )
/// ```
pub struct ClassPathLoader;

impl ClassPathLoader {
    pub fn load(path: &Path) -> LoadResult<ClassPathDefinition> {
        let content = read_file(path)?;
        ron::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse class path RON at {}: {}", path.display(), e)
        })
    }

    /// Load every `*.ron` class path of a directory, sorted by file name.
    pub fn load_dir(dir: &Path) -> LoadResult<Vec<ClassPathDefinition>> {
        files_with_extension(dir, "ron")?
            .iter()
            .map(|path| Self::load(path))
            .collect()
    }
}
