//! Physical delegate that hands launches to the host through the stream.

use rpg_core::{PhysicalDelegate, PhysicalLaunch};
use tracing::debug;

use super::{Event, EventStream};

/// Publishes every physical launch on [`super::Topic::Physics`].
///
/// The host simulates the projectile and reports the outcome back with
/// `RuntimeHandle::skill_hit`.
#[derive(Clone)]
pub struct StreamDelegate {
    stream: EventStream,
}

impl StreamDelegate {
    pub fn new(stream: EventStream) -> Self {
        Self { stream }
    }
}

impl PhysicalDelegate for StreamDelegate {
    fn execute_physical_skill(&self, launch: PhysicalLaunch) {
        debug!(
            target: "runtime::physics",
            skill = %launch.skill.key,
            owner = %launch.owner,
            target_entity = %launch.target,
            "physical skill launched"
        );
        self.stream.publish(Event::Physics(launch));
    }
}
