//! Attribute access, modifiers and conditions.
//!
//! Entities expose numeric attributes by path (`stats/hp`). Modifiers change
//! them (and can be reverted), conditions read them to gate skills.

mod condition;
mod modifier;
mod path;

pub use condition::{Comparison, Condition};
pub use modifier::{AppliedModifier, Modifier, ModifierOperation};
pub use path::{AttributeAccess, AttributeError, AttributeValue, Attributes, path_segments};
