//! Data-driven content definitions and loaders.
//!
//! This crate reads skills, levels, class paths and configuration from data
//! files:
//! - Skill catalogs (data-driven via RON)
//! - Level lists and class paths (data-driven via RON)
//! - Skills configuration (data-driven via TOML)
//!
//! Content only describes skills and tracks; instances are built per owner by
//! the runtime. All loaders use rpg-core types directly with serde.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    ClassPathLoader, ConfigLoader, ContentBundle, ContentFactory, LevelsLoader, LoadResult,
    SkillCatalog, SkillLoader,
};
