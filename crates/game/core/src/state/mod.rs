//! Entities, positions and the logical clock.
//!
//! The core never owns host entities. It addresses them by [`EntityId`]
//! through the [`World`] trait and reads positions, casting flags and
//! attributes through [`Entity`].
mod actor;
mod types;
mod world;

pub use actor::{Actor, Entity, PhysicalDelegate, PhysicalLaunch};
pub use types::{EntityId, Position, Tick};
pub use world::{Roster, World};
