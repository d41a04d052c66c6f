use std::sync::{Arc, Mutex};

use rpg_core::{
    Actor, Attack, AttributeAccess, Comparison, Condition, Dice, Effect, Entity, EntityId,
    EventBus, EventName, HookFlow, Modifier, ModifierOperation, PhysicalDelegate, PhysicalLaunch,
    Physics, Position, Roster, Skill, SkillContext, SkillDefinition, SkillKind, SkillState, Tick,
    World,
};
use rpg_core::skill::PropertyTerm;

const HERO: EntityId = EntityId(1);
const GOBLIN: EntityId = EntityId(2);

fn arena(goblin_hp: f64) -> Roster {
    [
        Actor::new(HERO, Position::new(0, 0))
            .with_attribute("stats/hp", 100.0)
            .with_attribute("stats/mp", 20.0)
            .with_attribute("stats/atk", 20.0)
            .with_attribute("stats/aim", 5.0),
        Actor::new(GOBLIN, Position::new(1, 0))
            .with_attribute("stats/hp", goblin_hp)
            .with_attribute("stats/def", 10.0)
            .with_attribute("stats/dodge", 0.0),
    ]
    .into_iter()
    .collect()
}

fn hp(world: &Roster, id: EntityId) -> f64 {
    world
        .get(id)
        .and_then(|actor| actor.property("stats/hp"))
        .unwrap()
}

fn direct_attack(key: &str, damage: f64) -> SkillDefinition {
    let attack = Attack {
        apply_direct_damage: true,
        ..Attack::new("stats/hp", damage)
    };
    SkillDefinition::new(key, SkillKind::Attack(attack))
}

#[derive(Default)]
struct LaunchRecorder {
    launches: Mutex<Vec<PhysicalLaunch>>,
}

impl PhysicalDelegate for LaunchRecorder {
    fn execute_physical_skill(&self, launch: PhysicalLaunch) {
        self.launches.lock().unwrap().push(launch);
    }
}

#[test]
fn direct_damage_ignores_attack_and_defense() {
    let mut world = arena(80.0);
    let bus = EventBus::default();
    let mut dice = Dice::seeded(7);
    let mut skill = Skill::new(direct_attack("slash", 10.0), HERO, Some(GOBLIN));

    let mut ctx = SkillContext::new(Tick(0), &bus, &mut dice);
    assert!(skill.execute(&mut world, None, &mut ctx));

    assert_eq!(hp(&world, GOBLIN), 70.0);
    assert_eq!(skill.last_state(), Some(SkillState::DamageApplied));
    assert_eq!(skill.uses(), 1);
}

#[test]
fn proportional_damage_scales_with_attack_over_defense() {
    let mut world = arena(100.0);
    let bus = EventBus::default();
    let mut dice = Dice::seeded(7);
    let attack = Attack {
        attack_properties: vec![PropertyTerm::new("stats/atk")],
        defense_properties: vec![PropertyTerm::new("stats/def")],
        ..Attack::new("stats/hp", 10.0)
    };
    let mut skill = Skill::new(
        SkillDefinition::new("smash", SkillKind::Attack(attack)),
        HERO,
        None,
    );

    let mut ctx = SkillContext::new(Tick(0), &bus, &mut dice);
    assert!(skill.execute(&mut world, Some(GOBLIN), &mut ctx));

    // atk 20 vs def 10: diff equals defense, capped at 99% => 10 + ceil(9.9).
    assert_eq!(hp(&world, GOBLIN), 80.0);
}

#[test]
fn full_dodge_requires_strictly_more_than_the_ratio() {
    let attack = Attack {
        apply_direct_damage: true,
        dodge_full_enabled: true,
        aim_properties: vec![PropertyTerm::new("stats/aim")],
        dodge_properties: vec![PropertyTerm::new("stats/dodge")],
        ..Attack::new("stats/hp", 10.0)
    };
    let definition = SkillDefinition::new("jab", SkillKind::Attack(attack));
    let bus = EventBus::default();
    let mut dice = Dice::seeded(3);

    // aim 5 with the default ratio 2: dodge 11 evades, dodge 10 does not.
    let mut world = arena(50.0);
    world.get_mut(GOBLIN).unwrap().set_property("stats/dodge", 11.0).unwrap();
    let mut skill = Skill::new(definition.clone(), HERO, Some(GOBLIN));
    let mut ctx = SkillContext::new(Tick(0), &bus, &mut dice);
    assert!(!skill.execute(&mut world, None, &mut ctx));
    assert_eq!(skill.last_state(), Some(SkillState::Dodged));
    assert_eq!(hp(&world, GOBLIN), 50.0);

    world.get_mut(GOBLIN).unwrap().set_property("stats/dodge", 10.0).unwrap();
    let mut skill = Skill::new(definition, HERO, Some(GOBLIN));
    assert!(skill.execute(&mut world, None, &mut ctx));
    assert_eq!(hp(&world, GOBLIN), 40.0);
}

#[test]
fn dodge_reduction_larger_than_damage_raises_the_property() {
    let attack = Attack {
        apply_direct_damage: true,
        damage_affected: true,
        aim_properties: vec![PropertyTerm::new("stats/aim")],
        dodge_properties: vec![PropertyTerm::new("stats/dodge")],
        ..Attack::new("stats/hp", 10.0)
    };
    let bus = EventBus::default();
    let mut dice = Dice::seeded(3);
    let mut world = arena(50.0);
    world.get_mut(HERO).unwrap().set_property("stats/aim", 10.0).unwrap();
    world.get_mut(GOBLIN).unwrap().set_property("stats/dodge", 40.0).unwrap();

    let mut skill = Skill::new(
        SkillDefinition::new("feint", SkillKind::Attack(attack)),
        HERO,
        Some(GOBLIN),
    );
    let mut ctx = SkillContext::new(Tick(0), &bus, &mut dice);
    assert!(skill.execute(&mut world, None, &mut ctx));

    // 10 - floor(10 * 300%) = -20 damage.
    assert_eq!(hp(&world, GOBLIN), 70.0);
    assert_eq!(skill.last_state(), Some(SkillState::DamageApplied));
}

#[test]
fn depleted_target_is_not_hit_again() {
    let mut world = arena(5.0);
    let bus = EventBus::default();
    let mut dice = Dice::seeded(1);
    let mut skill = Skill::new(direct_attack("slash", 10.0), HERO, Some(GOBLIN));

    let mut ctx = SkillContext::new(Tick(0), &bus, &mut dice);
    assert!(skill.execute(&mut world, None, &mut ctx));
    assert_eq!(hp(&world, GOBLIN), 0.0);

    assert!(!skill.execute(&mut world, None, &mut ctx));
    assert_eq!(skill.last_state(), Some(SkillState::TargetDepleted));
}

#[test]
fn uses_limit_stops_execution() {
    let mut world = arena(100.0);
    let bus = EventBus::default();
    let mut dice = Dice::seeded(1);
    let mut skill = Skill::new(
        direct_attack("slash", 1.0).with_uses_limit(2),
        HERO,
        Some(GOBLIN),
    );

    let mut ctx = SkillContext::new(Tick(0), &bus, &mut dice);
    assert!(skill.execute(&mut world, None, &mut ctx));
    assert!(skill.execute(&mut world, None, &mut ctx));
    assert!(!skill.execute(&mut world, None, &mut ctx));

    assert_eq!(skill.uses(), 2);
    assert_eq!(skill.last_state(), Some(SkillState::UsesLimitReached));
    assert_eq!(hp(&world, GOBLIN), 98.0);
}

#[test]
fn validation_without_delay_is_repeatable() {
    let world = arena(100.0);
    let bus = EventBus::default();
    let mut dice = Dice::seeded(1);
    let mut skill = Skill::new(direct_attack("slash", 1.0), HERO, Some(GOBLIN));

    let mut ctx = SkillContext::new(Tick(0), &bus, &mut dice);
    assert!(skill.validate(&world, &mut ctx));
    assert!(skill.validate(&world, &mut ctx));
    assert_eq!(skill.uses(), 0);
    assert_eq!(skill.last_state(), Some(SkillState::Validated));
}

#[test]
fn skill_delay_blocks_activation_until_the_deadline() {
    let world = arena(100.0);
    let bus = EventBus::default();
    let mut dice = Dice::seeded(1);
    let mut skill = Skill::new(
        direct_attack("slash", 1.0).with_skill_delay(1_000),
        HERO,
        Some(GOBLIN),
    );

    assert!(skill.validate(&world, &mut SkillContext::new(Tick(0), &bus, &mut dice)));
    assert_eq!(skill.activation_ready_at(), Some(Tick(1_000)));

    assert!(!skill.validate(&world, &mut SkillContext::new(Tick(999), &bus, &mut dice)));
    assert_eq!(skill.last_state(), Some(SkillState::CanNotActivate));

    assert!(skill.validate(&world, &mut SkillContext::new(Tick(1_000), &bus, &mut dice)));
}

#[test]
fn owner_conditions_gate_validation() {
    let world = arena(100.0);
    let bus = EventBus::default();
    let mut dice = Dice::seeded(1);
    let definition = direct_attack("fireball", 30.0).with_owner_condition(Condition::new(
        "enough_mana",
        "stats/mp",
        Comparison::Ge,
        25.0,
    ));
    let mut skill = Skill::new(definition, HERO, Some(GOBLIN));

    let mut ctx = SkillContext::new(Tick(0), &bus, &mut dice);
    assert!(!skill.validate(&world, &mut ctx));
    assert!(!skill.is_valid());
    assert_eq!(skill.last_state(), Some(SkillState::OwnerConditionsFailed));
}

#[test]
fn out_of_range_target_is_rejected_before_validation() {
    let mut world = arena(100.0);
    world.get_mut(GOBLIN).unwrap().set_position(Position::new(3, 0));
    let bus = EventBus::default();
    let mut dice = Dice::seeded(1);
    let mut skill = Skill::new(
        direct_attack("slash", 10.0).with_range(2),
        HERO,
        Some(GOBLIN),
    );

    let mut ctx = SkillContext::new(Tick(0), &bus, &mut dice);
    assert!(!skill.execute(&mut world, None, &mut ctx));
    assert_eq!(skill.last_state(), Some(SkillState::OutOfRange));
    assert_eq!(skill.uses(), 0);
}

#[test]
fn handlers_can_veto_execution_and_validation() {
    let mut world = arena(100.0);
    let mut bus = EventBus::default();
    let gate = bus.on(HERO, EventName::ExecuteGate, |_| Ok(HookFlow::Veto));
    let mut dice = Dice::seeded(1);
    let mut skill = Skill::new(direct_attack("slash", 10.0), HERO, Some(GOBLIN));

    let mut ctx = SkillContext::new(Tick(0), &bus, &mut dice);
    assert!(!skill.execute(&mut world, None, &mut ctx));
    assert_eq!(skill.last_state(), Some(SkillState::ExecuteBlocked));
    assert_eq!(hp(&world, GOBLIN), 100.0);

    bus.unsubscribe(gate);
    bus.on(HERO, EventName::ValidateSuccess, |_| Ok(HookFlow::Veto));
    let mut ctx = SkillContext::new(Tick(0), &bus, &mut dice);
    assert!(!skill.validate(&world, &mut ctx));
    assert_eq!(skill.last_state(), Some(SkillState::ValidationVetoed));
}

#[test]
fn cast_time_defers_resolution_to_update() {
    let mut world = arena(100.0);
    let bus = EventBus::default();
    let mut dice = Dice::seeded(1);
    let mut skill = Skill::new(
        direct_attack("meteor", 40.0).with_cast_time(500),
        HERO,
        Some(GOBLIN),
    );

    let mut ctx = SkillContext::new(Tick(0), &bus, &mut dice);
    assert!(!skill.execute(&mut world, None, &mut ctx));
    assert_eq!(skill.last_state(), Some(SkillState::Casting));
    assert!(world.entity(HERO).unwrap().is_casting());
    assert_eq!(skill.cast_due(), Some(Tick(500)));

    // A second activation is refused while the owner casts.
    let mut other = Skill::new(direct_attack("slash", 1.0), HERO, Some(GOBLIN));
    assert!(!other.validate(&world, &mut ctx));
    assert_eq!(other.last_state(), Some(SkillState::CanNotActivate));

    let mut ctx = SkillContext::new(Tick(499), &bus, &mut dice);
    assert_eq!(skill.update(&mut world, &mut ctx), None);
    assert_eq!(hp(&world, GOBLIN), 100.0);

    let mut ctx = SkillContext::new(Tick(500), &bus, &mut dice);
    assert_eq!(skill.update(&mut world, &mut ctx), Some(true));
    assert_eq!(hp(&world, GOBLIN), 60.0);
    assert!(!world.entity(HERO).unwrap().is_casting());
    assert!(!skill.is_casting());
}

#[test]
fn cancelled_cast_releases_the_owner() {
    let mut world = arena(100.0);
    let bus = EventBus::default();
    let mut dice = Dice::seeded(1);
    let mut skill = Skill::new(
        direct_attack("meteor", 40.0).with_cast_time(500),
        HERO,
        Some(GOBLIN),
    );

    let mut ctx = SkillContext::new(Tick(0), &bus, &mut dice);
    skill.execute(&mut world, None, &mut ctx);
    skill.cancel_timers(&mut world);

    assert!(!world.entity(HERO).unwrap().is_casting());
    let mut ctx = SkillContext::new(Tick(600), &bus, &mut dice);
    assert_eq!(skill.update(&mut world, &mut ctx), None);
    assert_eq!(hp(&world, GOBLIN), 100.0);
}

#[test]
fn effects_modify_target_and_owner() {
    let mut world = arena(100.0);
    let bus = EventBus::default();
    let mut dice = Dice::seeded(1);
    let effect = Effect::new(vec![Modifier::new(
        "weaken",
        "stats/def",
        ModifierOperation::DecreasePercent,
        50.0,
    )]);
    let definition = SkillDefinition::new("curse", SkillKind::Effect(effect)).with_owner_effect(
        Modifier::new("mana_cost", "stats/mp", ModifierOperation::Decrease, 5.0),
    );
    let mut skill = Skill::new(definition, HERO, Some(GOBLIN));

    let mut ctx = SkillContext::new(Tick(0), &bus, &mut dice);
    assert!(skill.execute(&mut world, None, &mut ctx));

    assert_eq!(world.get(GOBLIN).unwrap().property("stats/def"), Some(5.0));
    assert_eq!(world.get(HERO).unwrap().property("stats/mp"), Some(15.0));
    assert_eq!(skill.last_state(), Some(SkillState::TargetEffectsApplied));
}

#[test]
fn physical_attack_resolves_on_hit() {
    let recorder = Arc::new(LaunchRecorder::default());
    let mut world = arena(100.0);
    world
        .get_mut(HERO)
        .unwrap()
        .set_delegate(Some(recorder.clone()));
    let bus = EventBus::default();
    let mut dice = Dice::seeded(1);
    let attack = Attack {
        apply_direct_damage: true,
        ..Attack::new("stats/hp", 25.0)
    };
    let kind = SkillKind::PhysicalAttack {
        attack,
        physics: Physics::new(12.0, 1.0, 1.0).validating_target(),
    };
    let mut skill = Skill::new(SkillDefinition::new("arrow", kind), HERO, Some(GOBLIN));

    let mut ctx = SkillContext::new(Tick(0), &bus, &mut dice);
    assert!(!skill.execute(&mut world, None, &mut ctx));
    assert_eq!(skill.last_state(), Some(SkillState::PhysicalLaunched));
    {
        let launches = recorder.launches.lock().unwrap();
        assert_eq!(launches.len(), 1);
        assert_eq!(launches[0].target, GOBLIN);
        assert_eq!(launches[0].magnitude, 12.0);
    }
    assert_eq!(hp(&world, GOBLIN), 100.0);

    // The projectile hit someone else: rejected.
    assert!(!skill.execute_on_hit(&mut world, HERO, &mut ctx));
    assert_eq!(skill.last_state(), Some(SkillState::HitTargetMismatch));

    assert!(skill.execute_on_hit(&mut world, GOBLIN, &mut ctx));
    assert_eq!(hp(&world, GOBLIN), 75.0);
}

#[test]
fn physical_skill_without_delegate_fails() {
    let mut world = arena(100.0);
    let bus = EventBus::default();
    let mut dice = Dice::seeded(1);
    let kind = SkillKind::PhysicalEffect {
        effect: Effect::default(),
        physics: Physics::new(5.0, 1.0, 1.0),
    };
    let mut skill = Skill::new(SkillDefinition::new("net", kind), HERO, Some(GOBLIN));

    let mut ctx = SkillContext::new(Tick(0), &bus, &mut dice);
    assert!(!skill.execute(&mut world, None, &mut ctx));
    assert_eq!(skill.last_state(), Some(SkillState::MissingPhysicalDelegate));
}

#[test]
fn physical_skill_without_magnitude_is_never_ready() {
    let mut world = arena(100.0);
    let bus = EventBus::default();
    let mut dice = Dice::seeded(1);
    let kind = SkillKind::PhysicalAttack {
        attack: Attack::default(),
        physics: Physics::default(),
    };
    let mut skill = Skill::new(SkillDefinition::new("broken", kind), HERO, Some(GOBLIN));

    assert!(!skill.is_ready());
    let mut ctx = SkillContext::new(Tick(0), &bus, &mut dice);
    assert!(!skill.execute(&mut world, None, &mut ctx));
    assert_eq!(skill.last_state(), None);
}

#[test]
fn owner_scoped_events_follow_the_execution() {
    let mut world = arena(100.0);
    let mut bus = EventBus::default();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    bus.subscribe_scope(HERO, move |event| {
        sink.lock().unwrap().push(event.name());
        Ok(HookFlow::Continue)
    });
    let mut dice = Dice::seeded(1);
    let mut skill = Skill::new(direct_attack("slash", 10.0), HERO, Some(GOBLIN));

    let mut ctx = SkillContext::new(Tick(0), &bus, &mut dice);
    assert!(skill.execute(&mut world, None, &mut ctx));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.first(), Some(&EventName::BeforeExecute));
    assert_eq!(seen.last(), Some(&EventName::AfterExecute));
    let damage = seen.iter().position(|name| *name == EventName::DamageApplied);
    let reward = seen.iter().position(|name| *name == EventName::SkillReward);
    assert!(damage.is_some() && damage < reward);
}
