//! Levels, experience and class paths.
//!
//! A [`LevelsSet`] holds the ordered levels of one track and the owner's
//! progress along it. [`ClassPath`] builds on it through [`LevelTrack`] to
//! unlock skills and switch labels as the owner levels.
mod class_path;
mod level;
mod levels_set;
mod track;

pub use class_path::{ClassPath, ClassPathDefinition};
pub use level::{Level, LevelDefinition, levels_from_definitions};
pub use levels_set::{LevelsSet, LevelsSetDefinition, LevelsSetOptions, auto_fill_levels};
pub use track::LevelTrack;
