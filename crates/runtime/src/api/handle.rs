//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! driving skills and progression or streaming events from specific topics.
use tokio::sync::{broadcast, mpsc, oneshot};

use rpg_core::{Actor, EntityId, EventName, GameEvent, HookResult, Position, SubscriptionId};

use super::errors::{Result, RuntimeError};
use super::types::{EventHandler, ProgressSnapshot, SkillOutcome};
use crate::events::{Event, EventStream, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
    stream: EventStream,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, stream: EventStream) -> Self {
        Self { command_tx, stream }
    }

    /// Add an actor to the simulation
    pub async fn spawn_actor(&self, actor: Actor) -> Result<()> {
        self.request(|reply| Command::SpawnActor { actor, reply })
            .await?
    }

    /// Move an actor to a new position
    pub async fn move_actor(&self, owner: EntityId, position: Position) -> Result<()> {
        self.request(|reply| Command::MoveActor {
            owner,
            position,
            reply,
        })
        .await?
    }

    /// Give `owner` a class path from the loaded content
    ///
    /// Stored progress is restored when a repository is configured.
    pub async fn assign_class_path(
        &self,
        owner: EntityId,
        class_path: impl Into<String>,
    ) -> Result<ProgressSnapshot> {
        let class_path = class_path.into();
        self.request(|reply| Command::AssignClassPath {
            owner,
            class_path,
            reply,
        })
        .await?
    }

    /// Execute one of the owner's current skills
    ///
    /// `target` falls back to the skill's fixed target when `None`.
    pub async fn execute_skill(
        &self,
        owner: EntityId,
        skill: impl Into<String>,
        target: Option<EntityId>,
    ) -> Result<SkillOutcome> {
        let skill = skill.into();
        self.request(|reply| Command::ExecuteSkill {
            owner,
            skill,
            target,
            reply,
        })
        .await?
    }

    /// Report the entity hit by a physical skill's projectile
    pub async fn skill_hit(
        &self,
        owner: EntityId,
        skill: impl Into<String>,
        hit_target: EntityId,
    ) -> Result<SkillOutcome> {
        let skill = skill.into();
        self.request(|reply| Command::SkillHit {
            owner,
            skill,
            hit_target,
            reply,
        })
        .await?
    }

    /// Add experience to a class path, returning the number of levels gained
    pub async fn add_experience(
        &self,
        owner: EntityId,
        class_path: impl Into<String>,
        amount: f64,
    ) -> Result<u32> {
        let class_path = class_path.into();
        self.request(|reply| Command::AddExperience {
            owner,
            class_path,
            amount,
            reply,
        })
        .await?
    }

    pub async fn level_up(&self, owner: EntityId, class_path: impl Into<String>) -> Result<bool> {
        let class_path = class_path.into();
        self.request(|reply| Command::LevelUp {
            owner,
            class_path,
            reply,
        })
        .await?
    }

    pub async fn level_down(
        &self,
        owner: EntityId,
        class_path: impl Into<String>,
    ) -> Result<bool> {
        let class_path = class_path.into();
        self.request(|reply| Command::LevelDown {
            owner,
            class_path,
            reply,
        })
        .await?
    }

    /// Move the logical clock forward by `millis`
    ///
    /// Returns the casts finished by this step as `(skill, result)` pairs.
    pub async fn advance(&self, millis: u64) -> Result<Vec<(String, bool)>> {
        self.request(|reply| Command::Advance { millis, reply })
            .await
    }

    /// Query a snapshot of one actor
    pub async fn query_actor(&self, owner: EntityId) -> Result<Option<Actor>> {
        self.request(|reply| Command::QueryActor { owner, reply })
            .await
    }

    /// Query the progress of `owner` along `class_path`
    pub async fn query_progress(
        &self,
        owner: EntityId,
        class_path: impl Into<String>,
    ) -> Result<ProgressSnapshot> {
        let class_path = class_path.into();
        self.request(|reply| Command::QueryProgress {
            owner,
            class_path,
            reply,
        })
        .await?
    }

    /// Register a handler for one core event of one owner
    ///
    /// Handlers run on the simulation task, in subscription order, and may
    /// veto the validate-success and execute-gate events.
    pub async fn on<F>(&self, owner: EntityId, name: EventName, handler: F) -> Result<SubscriptionId>
    where
        F: Fn(&GameEvent) -> HookResult + Send + Sync + 'static,
    {
        let handler: EventHandler = Box::new(handler);
        self.request(|reply| Command::Subscribe {
            owner,
            name,
            handler,
            reply,
        })
        .await
    }

    /// Remove a handler registered with [`RuntimeHandle::on`]
    pub async fn unsubscribe(&self, id: SubscriptionId) -> Result<bool> {
        self.request(|reply| Command::Unsubscribe { id, reply })
            .await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Skills` - Validation, execution, casts, damage and effects
    /// - `Topic::Progression` - Levels, experience and unlocked skills
    /// - `Topic::Physics` - Physical launches awaiting [`RuntimeHandle::skill_hit`]
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use rpg_runtime::Topic;
    ///
    /// let mut progression = handle.subscribe(Topic::Progression);
    /// while let Ok(event) = progression.recv().await {
    ///     // Handle level and experience events
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.stream.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> std::collections::HashMap<Topic, broadcast::Receiver<Event>> {
        self.stream.subscribe_multiple(topics)
    }

    /// Get a reference to the event stream for advanced usage
    pub fn stream(&self) -> &EventStream {
        &self.stream
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }
}
