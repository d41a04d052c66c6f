use crate::events::{EventBus, GameEvent};
use crate::state::{EntityId, Position, World};

use super::Skill;

impl Skill {
    /// Checks the target against the owner's interaction area.
    ///
    /// A zero range is unlimited. A missing owner or target is out of range.
    pub fn is_in_range(&self, world: &dyn World, target: EntityId, bus: &EventBus) -> bool {
        if self.range == 0 {
            return true;
        }
        let (Some(owner), Some(target)) = (world.entity(self.owner), world.entity(target)) else {
            return false;
        };
        self.positions_in_range(owner.position(), target.position(), bus)
    }

    pub fn positions_in_range(
        &self,
        owner_position: Position,
        target_position: Position,
        bus: &EventBus,
    ) -> bool {
        if self.range == 0 {
            return true;
        }
        let skill = self.skill_ref();
        bus.emit(&GameEvent::BeforeRangeCheck {
            skill: skill.clone(),
            owner_position,
            target_position,
        });
        let in_range = owner_position.within_area(target_position, self.range);
        bus.emit(&GameEvent::AfterRangeCheck { skill, in_range });
        in_range
    }
}
