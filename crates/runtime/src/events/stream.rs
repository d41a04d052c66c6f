//! Topic-based event stream implementation.

use rpg_core::{GameEvent, PhysicalLaunch};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Skill lifecycle: validation, execution, casts, damage and effects
    Skills,
    /// Levels, experience and class path skill changes
    Progression,
    /// Physical launches waiting for the host to report a hit
    Physics,
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Skills(GameEvent),
    Progression(GameEvent),
    Physics(PhysicalLaunch),
}

impl Event {
    /// Routes a core event to the skills or progression topic.
    pub fn from_game_event(event: &GameEvent) -> Self {
        if event.name().is_progression() {
            Event::Progression(event.clone())
        } else {
            Event::Skills(event.clone())
        }
    }

    pub fn topic(&self) -> Topic {
        match self {
            Event::Skills(_) => Topic::Skills,
            Event::Progression(_) => Topic::Progression,
            Event::Physics(_) => Topic::Physics,
        }
    }
}

/// Topic-based event stream
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Publishing never blocks the simulation.
#[derive(Clone)]
pub struct EventStream {
    skills: broadcast::Sender<Event>,
    progression: broadcast::Sender<Event>,
    physics: broadcast::Sender<Event>,
}

impl EventStream {
    /// Creates a new event stream with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event stream with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            skills: broadcast::channel(capacity).0,
            progression: broadcast::channel(capacity).0,
            physics: broadcast::channel(capacity).0,
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    ///
    /// Returns receivers for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> std::collections::HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }

    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Skills => &self.skills,
            Topic::Progression => &self.progression,
            Topic::Physics => &self.physics,
        }
    }
}

impl Default for EventStream {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use rpg_core::EntityId;

    use super::*;

    #[tokio::test]
    async fn events_reach_their_topic_only() {
        let stream = EventStream::new();
        let mut progression = stream.subscribe(Topic::Progression);
        let mut skills = stream.subscribe(Topic::Skills);

        stream.publish(Event::from_game_event(&GameEvent::ExperienceAdded {
            owner: EntityId(1),
            track: "warrior".into(),
            level: 1,
            amount: 10.0,
            total: 10.0,
        }));

        assert!(matches!(
            progression.recv().await.unwrap(),
            Event::Progression(GameEvent::ExperienceAdded { .. })
        ));
        assert!(skills.try_recv().is_err());
    }
}
