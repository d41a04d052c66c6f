use std::collections::BTreeMap;

use super::{Actor, Entity, EntityId};

/// Lookup of entities by id.
///
/// Skills and class paths only store ids; every operation borrows the world
/// for the duration of the call.
pub trait World {
    fn entity(&self, id: EntityId) -> Option<&dyn Entity>;

    fn entity_mut(&mut self, id: EntityId) -> Option<&mut dyn Entity>;
}

/// Reference [`World`] holding [`Actor`]s in id order.
#[derive(Clone, Debug, Default)]
pub struct Roster {
    actors: BTreeMap<EntityId, Actor>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an actor, returning the one previously stored under its id.
    pub fn insert(&mut self, actor: Actor) -> Option<Actor> {
        self.actors.insert(actor.id(), actor)
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Actor> {
        self.actors.remove(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.actors.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}

impl FromIterator<Actor> for Roster {
    fn from_iter<I: IntoIterator<Item = Actor>>(iter: I) -> Self {
        let mut roster = Self::new();
        for actor in iter {
            roster.insert(actor);
        }
        roster
    }
}

impl World for Roster {
    fn entity(&self, id: EntityId) -> Option<&dyn Entity> {
        self.actors.get(&id).map(|actor| actor as &dyn Entity)
    }

    fn entity_mut(&mut self, id: EntityId) -> Option<&mut dyn Entity> {
        self.actors.get_mut(&id).map(|actor| actor as &mut dyn Entity)
    }
}
