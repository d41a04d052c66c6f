use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use rpg_content::{ContentBundle, SkillCatalog};
use rpg_core::{
    Actor, Attack, AttributeAccess, ClassPathDefinition, EntityId, EventName, GameEvent,
    HookFlow, LevelDefinition, LevelsSetOptions, Physics, Position, Roster, SkillDefinition,
    SkillKind, SkillState,
};
use rpg_runtime::{
    ClassPathRecord, ClassPathRepository, Event, InMemoryClassPathRepository, Runtime,
    RuntimeError, Topic,
};

const HERO: EntityId = EntityId(1);
const GOBLIN: EntityId = EntityId(2);

fn direct(damage: f64) -> Attack {
    Attack {
        apply_direct_damage: true,
        ..Attack::new("stats/hp", damage)
    }
}

fn content() -> ContentBundle {
    let skills: SkillCatalog = [
        SkillDefinition::new("strike", SkillKind::Attack(direct(5.0))),
        SkillDefinition::new(
            "arrow",
            SkillKind::PhysicalAttack {
                attack: direct(25.0),
                physics: Physics::new(12.0, 1.0, 1.0).validating_target(),
            },
        ),
        SkillDefinition::new("fireball", SkillKind::Attack(direct(30.0))).with_cast_time(500),
    ]
    .into_iter()
    .collect();

    let battle_mage = ClassPathDefinition {
        key: "battle_mage".into(),
        label: "Apprentice".into(),
        levels: vec![
            LevelDefinition::new(1.0, 0.0),
            LevelDefinition::new(2.0, 100.0),
            LevelDefinition::new(3.0, 250.0),
        ],
        labels_by_level: BTreeMap::from([(2, "Battle Mage".to_string())]),
        skills_by_level: BTreeMap::from([
            (1, vec!["strike".to_string(), "arrow".to_string()]),
            (2, vec!["fireball".to_string()]),
        ]),
        ..ClassPathDefinition::default()
    };

    let veteran = ClassPathDefinition {
        key: "veteran".into(),
        label: "Veteran".into(),
        levels: vec![
            LevelDefinition::new(1.0, 0.0),
            LevelDefinition::new(2.0, 100.0),
            LevelDefinition::new(3.0, 250.0),
        ],
        options: LevelsSetOptions {
            set_required_experience_limit: true,
            ..LevelsSetOptions::default()
        },
        ..ClassPathDefinition::default()
    };

    // Starts at level 0 and has no level 1.
    let sage = ClassPathDefinition {
        key: "sage".into(),
        label: "Sage".into(),
        levels: vec![
            LevelDefinition::new(0.0, 0.0),
            LevelDefinition::new(5.0, 100.0),
        ],
        ..ClassPathDefinition::default()
    };

    ContentBundle {
        skills,
        class_paths: [battle_mage, veteran, sage]
            .into_iter()
            .map(|class_path| (class_path.key.clone(), class_path))
            .collect(),
        ..ContentBundle::default()
    }
}

fn world() -> Roster {
    [
        Actor::new(HERO, Position::new(0, 0)).with_attribute("stats/hp", 100.0),
        Actor::new(GOBLIN, Position::new(2, 0)).with_attribute("stats/hp", 100.0),
    ]
    .into_iter()
    .collect()
}

async fn start() -> Runtime {
    Runtime::builder()
        .world(world())
        .content(content())
        .build()
        .await
        .unwrap()
}

async fn goblin_hp(runtime: &Runtime) -> f64 {
    runtime
        .handle()
        .query_actor(GOBLIN)
        .await
        .unwrap()
        .and_then(|actor| actor.property("stats/hp"))
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn executed_skill_damages_target_and_streams_events() {
    let runtime = start().await;
    let handle = runtime.handle();
    let mut skills = handle.subscribe(Topic::Skills);

    handle.assign_class_path(HERO, "battle_mage").await.unwrap();
    let outcome = handle
        .execute_skill(HERO, "strike", Some(GOBLIN))
        .await
        .unwrap();

    assert!(outcome.result);
    assert_eq!(outcome.state, Some(SkillState::DamageApplied));
    assert_eq!(goblin_hp(&runtime).await, 95.0);

    let mut damage = None;
    while let Ok(event) = skills.try_recv() {
        if let Event::Skills(GameEvent::DamageApplied {
            damage: dealt,
            new_value,
            ..
        }) = event
        {
            damage = Some((dealt, new_value));
        }
    }
    assert_eq!(damage, Some((5.0, 95.0)));
}

#[tokio::test(start_paused = true)]
async fn cast_resolves_once_the_clock_passes_its_deadline() {
    let runtime = start().await;
    let handle = runtime.handle();
    let mut progression = handle.subscribe(Topic::Progression);

    let snapshot = handle.assign_class_path(HERO, "battle_mage").await.unwrap();
    assert!(!snapshot.skills.contains(&"fireball".to_string()));

    assert!(handle.level_up(HERO, "battle_mage").await.unwrap());
    let snapshot = handle.query_progress(HERO, "battle_mage").await.unwrap();
    assert_eq!(snapshot.level, 2);
    assert_eq!(snapshot.label, "Battle Mage");
    assert!(snapshot.skills.contains(&"fireball".to_string()));

    let mut unlocked = false;
    while let Ok(event) = progression.try_recv() {
        if let Event::Progression(GameEvent::AfterAddSkills { skills, .. }) = event {
            unlocked |= skills.contains(&"fireball".to_string());
        }
    }
    assert!(unlocked);

    let outcome = handle
        .execute_skill(HERO, "fireball", Some(GOBLIN))
        .await
        .unwrap();
    assert!(!outcome.result);
    assert_eq!(outcome.state, Some(SkillState::Casting));
    assert_eq!(goblin_hp(&runtime).await, 100.0);

    tokio::time::sleep(Duration::from_millis(700)).await;
    assert_eq!(goblin_hp(&runtime).await, 70.0);
}

#[tokio::test(start_paused = true)]
async fn manual_advance_reports_finished_casts() {
    let runtime = start().await;
    let handle = runtime.handle();

    handle.assign_class_path(HERO, "battle_mage").await.unwrap();
    handle.add_experience(HERO, "battle_mage", 100.0).await.unwrap();
    handle
        .execute_skill(HERO, "fireball", Some(GOBLIN))
        .await
        .unwrap();

    let finished = handle.advance(500).await.unwrap();
    assert_eq!(finished, vec![("fireball".to_string(), true)]);
    assert_eq!(goblin_hp(&runtime).await, 70.0);
}

#[tokio::test(start_paused = true)]
async fn physical_skill_launches_then_resolves_on_hit() {
    let runtime = start().await;
    let handle = runtime.handle();
    let mut physics = handle.subscribe(Topic::Physics);

    handle.assign_class_path(HERO, "battle_mage").await.unwrap();
    let launched = handle
        .execute_skill(HERO, "arrow", Some(GOBLIN))
        .await
        .unwrap();
    assert!(!launched.result);
    assert_eq!(launched.state, Some(SkillState::PhysicalLaunched));

    let Event::Physics(launch) = physics.recv().await.unwrap() else {
        panic!("expected a physical launch");
    };
    assert_eq!(launch.owner, HERO);
    assert_eq!(launch.target, GOBLIN);
    assert_eq!(launch.magnitude, 12.0);

    let missed = handle.skill_hit(HERO, "arrow", HERO).await.unwrap();
    assert!(!missed.result);
    assert_eq!(missed.state, Some(SkillState::HitTargetMismatch));

    let hit = handle.skill_hit(HERO, "arrow", GOBLIN).await.unwrap();
    assert!(hit.result);
    assert_eq!(goblin_hp(&runtime).await, 75.0);
}

#[tokio::test(start_paused = true)]
async fn handlers_can_veto_execution() {
    let runtime = start().await;
    let handle = runtime.handle();
    handle.assign_class_path(HERO, "battle_mage").await.unwrap();

    let gate = handle
        .on(HERO, EventName::ExecuteGate, |_| Ok(HookFlow::Veto))
        .await
        .unwrap();
    let blocked = handle
        .execute_skill(HERO, "strike", Some(GOBLIN))
        .await
        .unwrap();
    assert!(!blocked.result);
    assert_eq!(blocked.state, Some(SkillState::ExecuteBlocked));
    assert_eq!(goblin_hp(&runtime).await, 100.0);

    assert!(handle.unsubscribe(gate).await.unwrap());
    let outcome = handle
        .execute_skill(HERO, "strike", Some(GOBLIN))
        .await
        .unwrap();
    assert!(outcome.result);
}

#[tokio::test(start_paused = true)]
async fn invalid_requests_are_rejected() {
    let runtime = start().await;
    let handle = runtime.handle();

    assert!(matches!(
        handle.assign_class_path(HERO, "necromancer").await,
        Err(RuntimeError::UnknownClassPath(key)) if key == "necromancer"
    ));
    assert!(matches!(
        handle.execute_skill(EntityId(9), "strike", None).await,
        Err(RuntimeError::UnknownActor(EntityId(9)))
    ));
    assert!(matches!(
        handle.execute_skill(HERO, "strike", Some(GOBLIN)).await,
        Err(RuntimeError::UnknownSkill { .. })
    ));
    assert!(matches!(
        handle.level_up(HERO, "battle_mage").await,
        Err(RuntimeError::ClassPathNotAssigned { .. })
    ));

    handle.assign_class_path(HERO, "battle_mage").await.unwrap();
    assert!(matches!(
        handle.assign_class_path(HERO, "battle_mage").await,
        Err(RuntimeError::ClassPathAlreadyAssigned { .. })
    ));
    assert!(matches!(
        handle
            .spawn_actor(Actor::new(GOBLIN, Position::new(5, 5)))
            .await,
        Err(RuntimeError::DuplicateActor(GOBLIN))
    ));
}

#[tokio::test(start_paused = true)]
async fn moved_target_falls_out_of_range() {
    let mut content = content();
    if let Some(strike) = content.skills.get("strike").cloned() {
        content.skills.insert(strike.with_range(3));
    }
    let runtime = Runtime::builder()
        .world(world())
        .content(content)
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();
    handle.assign_class_path(HERO, "battle_mage").await.unwrap();

    handle
        .move_actor(GOBLIN, Position::new(10, 0))
        .await
        .unwrap();
    let outcome = handle
        .execute_skill(HERO, "strike", Some(GOBLIN))
        .await
        .unwrap();
    assert_eq!(outcome.state, Some(SkillState::OutOfRange));
    assert_eq!(goblin_hp(&runtime).await, 100.0);
}

#[tokio::test(start_paused = true)]
async fn progress_is_persisted_and_restored() {
    let repository = Arc::new(InMemoryClassPathRepository::new());

    let runtime = Runtime::builder()
        .world(world())
        .content(content())
        .repository(repository.clone())
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();
    handle.assign_class_path(HERO, "battle_mage").await.unwrap();
    assert_eq!(
        handle
            .add_experience(HERO, "battle_mage", 120.0)
            .await
            .unwrap(),
        1
    );
    drop(handle);
    runtime.shutdown().await.unwrap();

    assert_eq!(
        repository
            .load_owner_class_path(HERO, "battle_mage")
            .unwrap(),
        Some(ClassPathRecord {
            owner: HERO,
            class_path: "battle_mage".into(),
            level: 2,
            experience: 120.0,
        })
    );

    let runtime = Runtime::builder()
        .world(world())
        .content(content())
        .repository(repository)
        .build()
        .await
        .unwrap();
    let restored = runtime
        .handle()
        .assign_class_path(HERO, "battle_mage")
        .await
        .unwrap();
    assert_eq!(restored.level, 2);
    assert_eq!(restored.experience, 120.0);
    assert_eq!(restored.next_level_experience, 250.0);
    assert!(restored.skills.contains(&"fireball".to_string()));
}

async fn start_with(repository: Arc<InMemoryClassPathRepository>) -> Runtime {
    Runtime::builder()
        .world(world())
        .content(content())
        .repository(repository)
        .build()
        .await
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn stored_experience_respects_the_cap() {
    let repository = Arc::new(InMemoryClassPathRepository::new());

    let runtime = start_with(repository.clone()).await;
    let handle = runtime.handle();
    handle.assign_class_path(HERO, "veteran").await.unwrap();
    assert_eq!(
        handle.add_experience(HERO, "veteran", 1_000.0).await.unwrap(),
        2
    );
    let progress = handle.query_progress(HERO, "veteran").await.unwrap();
    assert_eq!(progress.level, 3);
    assert_eq!(progress.experience, 250.0);
    drop(handle);
    runtime.shutdown().await.unwrap();

    let record = repository
        .load_owner_class_path(HERO, "veteran")
        .unwrap()
        .unwrap();
    assert_eq!(record.level, 3);
    assert_eq!(record.experience, 250.0);
}

#[tokio::test(start_paused = true)]
async fn experience_below_the_next_level_is_restorable() {
    let repository = Arc::new(InMemoryClassPathRepository::new());

    let runtime = start_with(repository.clone()).await;
    let handle = runtime.handle();
    let start = handle.assign_class_path(HERO, "sage").await.unwrap();
    assert_eq!(start.level, 0);
    assert_eq!(handle.add_experience(HERO, "sage", 10.0).await.unwrap(), 0);
    drop(handle);
    runtime.shutdown().await.unwrap();

    assert_eq!(
        repository.load_owner_class_path(HERO, "sage").unwrap(),
        Some(ClassPathRecord {
            owner: HERO,
            class_path: "sage".into(),
            level: 0,
            experience: 10.0,
        })
    );

    let runtime = start_with(repository).await;
    let restored = runtime
        .handle()
        .assign_class_path(HERO, "sage")
        .await
        .unwrap();
    assert_eq!(restored.level, 0);
    assert_eq!(restored.experience, 10.0);
}

#[tokio::test(start_paused = true)]
async fn stale_stored_level_starts_the_class_path_over() {
    let repository = Arc::new(InMemoryClassPathRepository::with_records([ClassPathRecord {
        owner: HERO,
        class_path: "sage".into(),
        level: 1,
        experience: 10.0,
    }]));

    let runtime = start_with(repository).await;
    let progress = runtime
        .handle()
        .assign_class_path(HERO, "sage")
        .await
        .unwrap();
    assert_eq!(progress.level, 0);
    assert_eq!(progress.experience, 0.0);
}
