use tracing::error;

use crate::attributes::{Condition, Modifier};
use crate::config::SkillsConfig;
use crate::events::SkillRef;
use crate::rng::Dice;
use crate::state::{EntityId, Tick};

use super::critical::CriticalHit;
use super::definition::{SkillDefinition, SkillKind, SkillType};
use super::state::{SkillPhase, SkillState};

/// Cast waiting for its deadline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PendingCast {
    pub(crate) target: EntityId,
    pub(crate) due: Tick,
}

/// A skill owned by one entity.
///
/// Skills hold ids only; every operation borrows the world, the event bus
/// and the dice for the duration of the call. Timers are deadlines on the
/// logical clock resolved by [`Skill::update`].
#[derive(Clone, Debug)]
pub struct Skill {
    pub(super) key: String,
    pub(super) owner: EntityId,
    pub(super) target: Option<EntityId>,
    pub(super) is_ready: bool,
    pub(super) is_valid: bool,
    pub(super) can_activate: bool,
    pub(super) uses: u32,
    pub(super) uses_limit: u32,
    pub(super) skill_delay: u64,
    pub(super) cast_time: u64,
    pub(super) range: u32,
    pub(super) range_automatic_validation: bool,
    pub(super) auto_validation: bool,
    pub(super) critical: CriticalHit,
    pub(super) owner_conditions: Vec<Condition>,
    pub(super) owner_effects: Vec<Modifier>,
    pub(super) kind: SkillKind,
    pub(super) phase: SkillPhase,
    pub(super) last_state: Option<SkillState>,
    pub(super) activation_ready_at: Option<Tick>,
    pub(super) pending_cast: Option<PendingCast>,
    pub(super) bound_target: Option<EntityId>,
}

impl Skill {
    /// Instantiates `definition` for `owner` with the default configuration.
    ///
    /// Never fails: a defective definition yields a skill that is not ready
    /// and ignores every validate/execute call.
    pub fn new(definition: SkillDefinition, owner: EntityId, target: Option<EntityId>) -> Self {
        Self::with_config(definition, owner, target, &SkillsConfig::default())
    }

    /// Instantiates `definition` for `owner`, filling unset tunables from
    /// `config`.
    ///
    /// # Arguments
    ///
    /// * `definition` - Data-driven description of the skill
    /// * `owner` - Entity casting the skill; conditions and effects read it
    /// * `target` - Default target used when `execute` is called without one
    /// * `config` - Source of the critical multiplier and dodge/aim ratio
    ///   when the definition leaves them unset
    pub fn with_config(
        definition: SkillDefinition,
        owner: EntityId,
        target: Option<EntityId>,
        config: &SkillsConfig,
    ) -> Self {
        let is_ready = match definition.defect() {
            None => true,
            Some(reason) => {
                error!(
                    target: "rpg::skill",
                    skill = %definition.key,
                    %owner,
                    reason,
                    "skill is not usable"
                );
                false
            }
        };

        let SkillDefinition {
            key,
            uses_limit,
            skill_delay,
            cast_time,
            range,
            range_automatic_validation,
            auto_validation,
            critical_chance,
            critical_multiplier,
            critical_fixed_value,
            owner_conditions,
            owner_effects,
            mut kind,
        } = definition;

        if let Some(attack) = kind.attack_mut() {
            attack
                .dodge_over_aim_success
                .get_or_insert(config.dodge_over_aim_success);
        }

        Self {
            key,
            owner,
            target,
            is_ready,
            is_valid: false,
            can_activate: true,
            uses: 0,
            uses_limit,
            skill_delay,
            cast_time,
            range,
            range_automatic_validation,
            auto_validation,
            critical: CriticalHit::new(
                critical_chance,
                critical_multiplier.unwrap_or(config.critical_multiplier),
                critical_fixed_value,
            ),
            owner_conditions,
            owner_effects,
            kind,
            phase: SkillPhase::Idle,
            last_state: None,
            activation_ready_at: None,
            pending_cast: None,
            bound_target: None,
        }
    }

    /// Catalog key, unique within one owner's class path.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn owner(&self) -> EntityId {
        self.owner
    }

    /// Target fixed at construction, used when `execute` gets none.
    pub fn target(&self) -> Option<EntityId> {
        self.target
    }

    /// Replaces the default target. `None` requires every `execute` call to
    /// name its target.
    pub fn set_target(&mut self, target: Option<EntityId>) {
        self.target = target;
    }

    /// Target bound by the most recent execution.
    pub fn bound_target(&self) -> Option<EntityId> {
        self.bound_target
    }

    /// Variant tag of the skill, as published in [`SkillRef`].
    pub fn skill_type(&self) -> SkillType {
        self.kind.skill_type()
    }

    pub fn kind(&self) -> &SkillKind {
        &self.kind
    }

    /// Identity attached to every event this skill publishes.
    pub fn skill_ref(&self) -> SkillRef {
        SkillRef {
            key: self.key.clone(),
            owner: self.owner,
            skill_type: self.skill_type(),
        }
    }

    /// Whether the skill was built from a usable definition.
    ///
    /// A skill that is not ready stays inert for its whole lifetime: validate
    /// and execute return `false` without publishing anything.
    pub fn is_ready(&self) -> bool {
        self.is_ready
    }

    /// Outcome of the latest validation, including vetoes from handlers.
    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// `false` while the skill delay started by the last validation runs.
    pub fn can_activate(&self) -> bool {
        self.can_activate
    }

    /// Successful executions so far.
    pub fn uses(&self) -> u32 {
        self.uses
    }

    /// Overrides the use counter, e.g. when restoring a session.
    pub fn set_uses(&mut self, uses: u32) {
        self.uses = uses;
    }

    /// Maximum number of executions; `0` means unlimited.
    pub fn uses_limit(&self) -> u32 {
        self.uses_limit
    }

    /// Cooldown in milliseconds started by a successful validation.
    pub fn skill_delay(&self) -> u64 {
        self.skill_delay
    }

    /// Milliseconds between execution and resolution; `0` resolves at once.
    pub fn cast_time(&self) -> u64 {
        self.cast_time
    }

    /// Half-size of the square interaction area; `0` means unlimited.
    pub fn range(&self) -> u32 {
        self.range
    }

    pub fn critical(&self) -> &CriticalHit {
        &self.critical
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SkillPhase {
        self.phase
    }

    /// State recorded by the latest operation, success or failure.
    ///
    /// Gate failures are reported here rather than as errors; `None` until
    /// the skill is used for the first time.
    pub fn last_state(&self) -> Option<SkillState> {
        self.last_state
    }

    /// Deadline after which the skill may activate again.
    pub fn activation_ready_at(&self) -> Option<Tick> {
        self.activation_ready_at
    }

    /// Deadline of the pending cast, if one is running.
    pub fn cast_due(&self) -> Option<Tick> {
        self.pending_cast.map(|cast| cast.due)
    }

    /// Whether a cast is waiting for its deadline.
    pub fn is_casting(&self) -> bool {
        self.pending_cast.is_some()
    }

    /// Rolls for a critical hit, consuming one roll of `dice` unless the
    /// chance is zero.
    pub fn is_critical(&self, dice: &mut Dice) -> bool {
        self.critical.is_critical(dice, self.owner)
    }

    /// Returns `value` scaled by the critical multiplier and fixed bonus on a
    /// critical roll, or `value` unchanged otherwise.
    pub fn apply_critical_value(&self, value: f64, dice: &mut Dice) -> f64 {
        self.critical.apply_value(value, dice, self.owner)
    }

    /// Extra amount a critical roll adds on top of `value` (`0` when the roll
    /// misses).
    pub fn critical_diff(&self, value: f64, dice: &mut Dice) -> f64 {
        self.critical.diff(value, dice, self.owner)
    }
}
