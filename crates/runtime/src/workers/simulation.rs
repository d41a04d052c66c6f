//! Simulation worker that owns the authoritative [`Roster`] and class paths.
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), runs them
//! against the core skill and progression rules, and advances the logical
//! clock on a fixed interval so casts and skill delays expire.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use rpg_content::ContentBundle;
use rpg_core::{
    Actor, ClassPath, Dice, Entity, EntityId, EventBus, EventName, HookFlow, LevelTrack,
    Position, Roster, Skill, SkillContext, SubscriptionId, Tick,
};
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::api::{EventHandler, ProgressSnapshot, Result, RuntimeError, SkillOutcome};
use crate::events::{Event, EventStream, StreamDelegate};
use crate::repository::ClassPathRepository;

use super::persistence::{ProgressUpdate, register_progress_hooks};

/// Commands that can be sent to the simulation worker
pub enum Command {
    /// Adds an actor to the roster.
    SpawnActor {
        actor: Actor,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Moves an actor; range checks read the new position.
    MoveActor {
        owner: EntityId,
        position: Position,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Instantiates a class path from content, restoring stored progress.
    AssignClassPath {
        owner: EntityId,
        class_path: String,
        reply: oneshot::Sender<Result<ProgressSnapshot>>,
    },
    ExecuteSkill {
        owner: EntityId,
        skill: String,
        target: Option<EntityId>,
        reply: oneshot::Sender<Result<SkillOutcome>>,
    },
    /// Reports where the projectile of a physical skill landed.
    SkillHit {
        owner: EntityId,
        skill: String,
        hit_target: EntityId,
        reply: oneshot::Sender<Result<SkillOutcome>>,
    },
    AddExperience {
        owner: EntityId,
        class_path: String,
        amount: f64,
        reply: oneshot::Sender<Result<u32>>,
    },
    LevelUp {
        owner: EntityId,
        class_path: String,
        reply: oneshot::Sender<Result<bool>>,
    },
    LevelDown {
        owner: EntityId,
        class_path: String,
        reply: oneshot::Sender<Result<bool>>,
    },
    /// Moves the logical clock forward outside of the interval.
    Advance {
        millis: u64,
        reply: oneshot::Sender<Vec<(String, bool)>>,
    },
    QueryActor {
        owner: EntityId,
        reply: oneshot::Sender<Option<Actor>>,
    },
    QueryProgress {
        owner: EntityId,
        class_path: String,
        reply: oneshot::Sender<Result<ProgressSnapshot>>,
    },
    /// Registers a handler on the core bus for one event of one owner.
    Subscribe {
        owner: EntityId,
        name: EventName,
        handler: EventHandler,
        reply: oneshot::Sender<SubscriptionId>,
    },
    Unsubscribe {
        id: SubscriptionId,
        reply: oneshot::Sender<bool>,
    },
}

/// Background task that processes skill and progression commands.
pub struct SimulationWorker {
    world: Roster,
    bus: EventBus,
    dice: Dice,
    clock: Tick,
    tick_interval: Duration,
    class_paths: BTreeMap<EntityId, BTreeMap<String, ClassPath>>,
    content: ContentBundle,
    command_rx: mpsc::Receiver<Command>,
    stream: EventStream,
    repository: Option<Arc<dyn ClassPathRepository>>,
    persistence: Option<mpsc::Sender<ProgressUpdate>>,
}

impl SimulationWorker {
    pub fn new(
        world: Roster,
        content: ContentBundle,
        tick_interval: Duration,
        command_rx: mpsc::Receiver<Command>,
        stream: EventStream,
        repository: Option<Arc<dyn ClassPathRepository>>,
        persistence: Option<mpsc::Sender<ProgressUpdate>>,
    ) -> Self {
        let mut worker = Self {
            bus: EventBus::from_config(&content.config),
            dice: Dice::seeded(content.config.game_seed),
            clock: Tick::ZERO,
            tick_interval,
            class_paths: BTreeMap::new(),
            world: Roster::new(),
            content,
            command_rx,
            stream,
            repository,
            persistence,
        };

        for actor in world.iter() {
            worker.world.insert(actor.clone());
            worker.prepare_actor(actor.id());
        }

        info!(
            target: "runtime::worker",
            actors = worker.world.len(),
            skills = worker.content.skills.len(),
            class_paths = worker.content.class_paths.len(),
            "SimulationWorker initialized"
        );
        worker
    }

    /// Main worker loop; ends once every handle is dropped.
    pub async fn run(mut self) {
        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let step = u64::try_from(self.tick_interval.as_millis()).unwrap_or(u64::MAX);

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                _ = interval.tick() => {
                    self.advance(step);
                }
            }
        }

        info!(target: "runtime::worker", clock = %self.clock, "SimulationWorker stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::SpawnActor { actor, reply } => {
                let result = self.spawn_actor(actor);
                if reply.send(result).is_err() {
                    debug!("SpawnActor reply channel closed (caller dropped)");
                }
            }
            Command::MoveActor {
                owner,
                position,
                reply,
            } => {
                let result = self.actor_mut(owner).map(|actor| actor.set_position(position));
                if reply.send(result).is_err() {
                    debug!("MoveActor reply channel closed (caller dropped)");
                }
            }
            Command::AssignClassPath {
                owner,
                class_path,
                reply,
            } => {
                let result = self.assign_class_path(owner, &class_path);
                if reply.send(result).is_err() {
                    debug!("AssignClassPath reply channel closed (caller dropped)");
                }
            }
            Command::ExecuteSkill {
                owner,
                skill,
                target,
                reply,
            } => {
                let result = self.execute_skill(owner, &skill, target);
                if reply.send(result).is_err() {
                    debug!("ExecuteSkill reply channel closed (caller dropped)");
                }
            }
            Command::SkillHit {
                owner,
                skill,
                hit_target,
                reply,
            } => {
                let result = self.skill_hit(owner, &skill, hit_target);
                if reply.send(result).is_err() {
                    debug!("SkillHit reply channel closed (caller dropped)");
                }
            }
            Command::AddExperience {
                owner,
                class_path,
                amount,
                reply,
            } => {
                let result = self.with_class_path(owner, &class_path, |path, world, bus| {
                    path.add_experience(world, amount, bus)
                });
                if reply.send(result).is_err() {
                    debug!("AddExperience reply channel closed (caller dropped)");
                }
            }
            Command::LevelUp {
                owner,
                class_path,
                reply,
            } => {
                let result = self.with_class_path(owner, &class_path, |path, world, bus| {
                    path.level_up(world, bus)
                });
                if reply.send(result).is_err() {
                    debug!("LevelUp reply channel closed (caller dropped)");
                }
            }
            Command::LevelDown {
                owner,
                class_path,
                reply,
            } => {
                let result = self.with_class_path(owner, &class_path, |path, world, bus| {
                    path.level_down(world, bus)
                });
                if reply.send(result).is_err() {
                    debug!("LevelDown reply channel closed (caller dropped)");
                }
            }
            Command::Advance { millis, reply } => {
                let finished = self.advance(millis);
                if reply.send(finished).is_err() {
                    debug!("Advance reply channel closed (caller dropped)");
                }
            }
            Command::QueryActor { owner, reply } => {
                if reply.send(self.world.get(owner).cloned()).is_err() {
                    debug!("QueryActor reply channel closed (caller dropped)");
                }
            }
            Command::QueryProgress {
                owner,
                class_path,
                reply,
            } => {
                let result = self.class_path(owner, &class_path).map(snapshot);
                if reply.send(result).is_err() {
                    debug!("QueryProgress reply channel closed (caller dropped)");
                }
            }
            Command::Subscribe {
                owner,
                name,
                handler,
                reply,
            } => {
                let id = self.bus.on(owner, name, handler);
                if reply.send(id).is_err() {
                    debug!("Subscribe reply channel closed (caller dropped)");
                }
            }
            Command::Unsubscribe { id, reply } => {
                if reply.send(self.bus.unsubscribe(id)).is_err() {
                    debug!("Unsubscribe reply channel closed (caller dropped)");
                }
            }
        }
    }

    /// Moves the clock and resolves every expired skill timer.
    ///
    /// Returns the key and result of every cast finished during the step.
    fn advance(&mut self, millis: u64) -> Vec<(String, bool)> {
        self.clock = self.clock + millis;

        let mut ctx = SkillContext::new(self.clock, &self.bus, &mut self.dice);
        let mut finished = Vec::new();
        for path in self.class_paths.values_mut().flat_map(BTreeMap::values_mut) {
            for (skill, result) in path.update_skills(&mut self.world, &mut ctx) {
                debug!(
                    target: "runtime::worker",
                    owner = %path.owner(),
                    skill = %skill,
                    result,
                    clock = %self.clock,
                    "cast finished"
                );
                finished.push((skill, result));
            }
        }
        finished
    }

    fn spawn_actor(&mut self, actor: Actor) -> Result<()> {
        let id = actor.id();
        if self.world.get(id).is_some() {
            return Err(RuntimeError::DuplicateActor(id));
        }
        self.world.insert(actor);
        self.prepare_actor(id);
        debug!(target: "runtime::worker", actor = %id, "actor spawned");
        Ok(())
    }

    /// Wires an actor into the stream: core events of the owner are mirrored
    /// to their topic, physical launches go through a [`StreamDelegate`] unless
    /// the host supplied its own, and progress is queued for persistence.
    fn prepare_actor(&mut self, id: EntityId) {
        if let Some(actor) = self.world.get_mut(id)
            && actor.physical_delegate().is_none()
        {
            actor.set_delegate(Some(Arc::new(StreamDelegate::new(self.stream.clone()))));
        }

        let stream = self.stream.clone();
        self.bus.subscribe_scope(id, move |event| {
            stream.publish(Event::from_game_event(event));
            Ok(HookFlow::Continue)
        });

        if let Some(updates) = &self.persistence {
            register_progress_hooks(&mut self.bus, id, updates);
        }
    }

    fn assign_class_path(&mut self, owner: EntityId, key: &str) -> Result<ProgressSnapshot> {
        self.actor_mut(owner)?;
        if self
            .class_paths
            .get(&owner)
            .is_some_and(|paths| paths.contains_key(key))
        {
            return Err(RuntimeError::ClassPathAlreadyAssigned {
                owner,
                class_path: key.to_string(),
            });
        }
        let definition = self
            .content
            .class_path(key)
            .cloned()
            .ok_or_else(|| RuntimeError::UnknownClassPath(key.to_string()))?;

        let skills = &self.content.skills;
        let mut path = ClassPath::from_definition(
            definition,
            owner,
            |skill| skills.resolve(skill),
            &self.content.config,
            &self.bus,
        )?;

        if let Some(repository) = &self.repository
            && let Some(record) = repository.load_owner_class_path(owner, key)?
        {
            // A stale record (level no longer on the track) must not lock the
            // owner out of the class path: it starts over instead.
            match path.restore_progress(record.level, record.experience, &self.bus) {
                Ok(()) => info!(
                    target: "runtime::worker",
                    %owner,
                    class_path = key,
                    level = path.current_level(),
                    experience = path.current_exp(),
                    "class path progress restored"
                ),
                Err(error) => warn!(
                    target: "runtime::worker",
                    %owner,
                    class_path = key,
                    stored_level = record.level,
                    %error,
                    "stored progress does not fit the class path, starting over"
                ),
            }
        }

        let progress = snapshot(&path);
        self.class_paths
            .entry(owner)
            .or_default()
            .insert(key.to_string(), path);
        Ok(progress)
    }

    fn execute_skill(
        &mut self,
        owner: EntityId,
        key: &str,
        target: Option<EntityId>,
    ) -> Result<SkillOutcome> {
        self.actor_mut(owner)?;
        let skill = find_skill(&mut self.class_paths, owner, key)?;
        let mut ctx = SkillContext::new(self.clock, &self.bus, &mut self.dice);
        let result = skill.execute(&mut self.world, target, &mut ctx);

        debug!(
            target: "runtime::worker",
            %owner,
            skill = key,
            target_entity = ?target,
            result,
            state = ?skill.last_state(),
            "skill executed"
        );
        Ok(SkillOutcome {
            result,
            state: skill.last_state(),
        })
    }

    fn skill_hit(
        &mut self,
        owner: EntityId,
        key: &str,
        hit_target: EntityId,
    ) -> Result<SkillOutcome> {
        self.actor_mut(owner)?;
        let skill = find_skill(&mut self.class_paths, owner, key)?;
        let mut ctx = SkillContext::new(self.clock, &self.bus, &mut self.dice);
        let result = skill.execute_on_hit(&mut self.world, hit_target, &mut ctx);

        Ok(SkillOutcome {
            result,
            state: skill.last_state(),
        })
    }

    fn with_class_path<T>(
        &mut self,
        owner: EntityId,
        key: &str,
        f: impl FnOnce(&mut ClassPath, &mut Roster, &EventBus) -> T,
    ) -> Result<T> {
        let path = self
            .class_paths
            .get_mut(&owner)
            .and_then(|paths| paths.get_mut(key))
            .ok_or_else(|| RuntimeError::ClassPathNotAssigned {
                owner,
                class_path: key.to_string(),
            })?;
        Ok(f(path, &mut self.world, &self.bus))
    }

    fn class_path(&self, owner: EntityId, key: &str) -> Result<&ClassPath> {
        self.class_paths
            .get(&owner)
            .and_then(|paths| paths.get(key))
            .ok_or_else(|| RuntimeError::ClassPathNotAssigned {
                owner,
                class_path: key.to_string(),
            })
    }

    fn actor_mut(&mut self, owner: EntityId) -> Result<&mut Actor> {
        self.world
            .get_mut(owner)
            .ok_or(RuntimeError::UnknownActor(owner))
    }
}

/// Looks a skill up across every class path of `owner`.
fn find_skill<'a>(
    class_paths: &'a mut BTreeMap<EntityId, BTreeMap<String, ClassPath>>,
    owner: EntityId,
    key: &str,
) -> Result<&'a mut Skill> {
    let skill = class_paths
        .get_mut(&owner)
        .and_then(|paths| paths.values_mut().find_map(|path| path.skill_mut(key)));
    if skill.is_none() {
        warn!(target: "runtime::worker", %owner, skill = key, "skill not available");
    }
    skill.ok_or_else(|| RuntimeError::UnknownSkill {
        owner,
        skill: key.to_string(),
    })
}

fn snapshot(path: &ClassPath) -> ProgressSnapshot {
    ProgressSnapshot {
        owner: path.owner(),
        class_path: path.key().to_string(),
        label: path.current_label().to_string(),
        level: path.current_level(),
        experience: path.current_exp(),
        next_level_experience: path.next_level_experience(),
        skills: path.skill_keys(),
    }
}
