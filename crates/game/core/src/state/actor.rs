use std::fmt;
use std::sync::Arc;

use crate::attributes::{AttributeAccess, AttributeError, Attributes};
use crate::events::SkillRef;

use super::{EntityId, Position};

/// Minimum capability set of anything that owns or receives skills.
///
/// Attributes are reachable by path through the [`AttributeAccess`]
/// supertrait; the remaining methods expose what skills and progression need
/// from the host entity.
pub trait Entity: AttributeAccess {
    fn id(&self) -> EntityId;

    fn position(&self) -> Position;

    /// True while one of the entity's skills is casting.
    fn is_casting(&self) -> bool;

    fn set_casting(&mut self, casting: bool);

    /// Delegate that launches physical skills, if the entity supports them.
    fn physical_delegate(&self) -> Option<&dyn PhysicalDelegate> {
        None
    }
}

/// Request handed to the host physics layer when a physical skill fires.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhysicalLaunch {
    pub skill: SkillRef,
    pub owner: EntityId,
    pub target: EntityId,
    pub magnitude: f64,
    pub object_width: f64,
    pub object_height: f64,
}

/// Host-side collision handling for physical skills.
///
/// The delegate spawns whatever projectile the host simulates; the outcome is
/// reported back later through `Skill::execute_on_hit`.
pub trait PhysicalDelegate: Send + Sync {
    fn execute_physical_skill(&self, launch: PhysicalLaunch);
}

/// Reference [`Entity`] backed by an [`Attributes`] tree.
#[derive(Clone)]
pub struct Actor {
    id: EntityId,
    position: Position,
    attributes: Attributes,
    casting: bool,
    delegate: Option<Arc<dyn PhysicalDelegate>>,
}

impl Actor {
    pub fn new(id: EntityId, position: Position) -> Self {
        Self {
            id,
            position,
            attributes: Attributes::new(),
            casting: false,
            delegate: None,
        }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_attribute(mut self, path: &str, value: f64) -> Self {
        self.attributes.insert(path, value);
        self
    }

    pub fn with_delegate(mut self, delegate: Arc<dyn PhysicalDelegate>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn set_delegate(&mut self, delegate: Option<Arc<dyn PhysicalDelegate>>) {
        self.delegate = delegate;
    }
}

impl fmt::Debug for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Actor")
            .field("id", &self.id)
            .field("position", &self.position)
            .field("attributes", &self.attributes)
            .field("casting", &self.casting)
            .field("delegate", &self.delegate.is_some())
            .finish()
    }
}

impl AttributeAccess for Actor {
    fn property(&self, path: &str) -> Option<f64> {
        self.attributes.property(path)
    }

    fn set_property(&mut self, path: &str, value: f64) -> Result<(), AttributeError> {
        self.attributes.set_property(path, value)
    }
}

impl Entity for Actor {
    fn id(&self) -> EntityId {
        self.id
    }

    fn position(&self) -> Position {
        self.position
    }

    fn is_casting(&self) -> bool {
        self.casting
    }

    fn set_casting(&mut self, casting: bool) {
        self.casting = casting;
    }

    fn physical_delegate(&self) -> Option<&dyn PhysicalDelegate> {
        self.delegate.as_deref()
    }
}
