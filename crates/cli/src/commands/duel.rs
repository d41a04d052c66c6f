//! Scripted duel between a hero following a class path and a training dummy.
//!
//! Every round the hero uses each current skill on the dummy, projectiles of
//! physical skills always land, the logical clock moves one round forward,
//! and the hero earns experience.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::warn;

use rpg_content::ContentFactory;
use rpg_core::{Actor, AttributeAccess, EntityId, PhysicalLaunch, Position, Roster};
use rpg_runtime::{Event, Runtime, RuntimeConfig, RuntimeHandle, SkillOutcome, Topic};

use crate::config::CliConfig;

const HERO: EntityId = EntityId(1);
const DUMMY: EntityId = EntityId(2);

/// Run a scripted duel through the runtime
#[derive(Parser)]
pub struct Duel {
    /// Content directory (defaults to RPG_DATA_DIR or the bundled demo data)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Class path followed by the hero
    #[arg(short, long, default_value = "battle_mage")]
    class_path: String,

    /// Maximum number of rounds
    #[arg(short, long, default_value_t = 12)]
    rounds: u32,

    /// Logical milliseconds between two rounds
    #[arg(long, default_value_t = 500)]
    round_ms: u64,

    /// Experience earned by the hero after each round
    #[arg(long, default_value_t = 45.0)]
    experience: f64,

    /// Overrides the configured game seed
    #[arg(long)]
    seed: Option<u64>,
}

impl Duel {
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let data_dir = self.data_dir.clone().unwrap_or_else(|| config.data_dir.clone());
        let mut content = ContentFactory::load_dir(&data_dir)
            .with_context(|| format!("Failed to load content from {}", data_dir.display()))?;
        if let Some(seed) = self.seed {
            content.config.game_seed = seed;
        }

        let runtime = Runtime::builder()
            .config(RuntimeConfig {
                tick_interval: config.tick_interval,
                ..RuntimeConfig::default()
            })
            .world(arena())
            .content(content)
            .build()
            .await?;
        let handle = runtime.handle();
        let mut launches = handle.subscribe(Topic::Physics);

        let start = handle.assign_class_path(HERO, &self.class_path).await?;
        println!(
            "{} {} starts as {} (level {})",
            style("Duel").bold().cyan(),
            HERO,
            style(&start.label).bold(),
            start.level
        );

        let result = self.fight(&handle, &mut launches).await;

        drop(handle);
        runtime.shutdown().await?;
        result
    }

    async fn fight(
        &self,
        handle: &RuntimeHandle,
        launches: &mut broadcast::Receiver<Event>,
    ) -> Result<()> {
        for round in 1..=self.rounds {
            println!();
            println!("{}", style(format!("Round {round}")).bold());

            let progress = handle.query_progress(HERO, &self.class_path).await?;
            for skill in &progress.skills {
                let outcome = handle.execute_skill(HERO, skill, Some(DUMMY)).await?;
                report(skill, outcome);
            }
            land_projectiles(handle, launches).await?;

            for (skill, result) in handle.advance(self.round_ms).await? {
                report_cast(&skill, result);
            }

            let gained = handle
                .add_experience(HERO, &self.class_path, self.experience)
                .await?;
            if gained > 0 {
                let progress = handle.query_progress(HERO, &self.class_path).await?;
                println!(
                    "  {} level {} ({}), skills: {}",
                    style("level up!").green().bold(),
                    progress.level,
                    progress.label,
                    progress.skills.join(", ")
                );
            }

            let hp = property(handle, DUMMY, "stats/hp").await?;
            println!("  dummy hp: {hp:.1}");
            if hp <= 0.0 {
                println!();
                println!("{}", style(format!("Dummy defeated in {round} rounds")).green().bold());
                break;
            }
        }

        let progress = handle.query_progress(HERO, &self.class_path).await?;
        println!();
        println!(
            "{} level {} {}, {:.0}/{:.0} xp",
            style("Final").bold().cyan(),
            progress.level,
            progress.label,
            progress.experience,
            progress.next_level_experience
        );
        println!(
            "  hero mp {:.0}, atk {:.1}, max hp {:.0}",
            property(handle, HERO, "stats/mp").await?,
            property(handle, HERO, "stats/atk").await?,
            property(handle, HERO, "stats/max_hp").await?,
        );
        Ok(())
    }
}

fn arena() -> Roster {
    [
        Actor::new(HERO, Position::new(0, 0))
            .with_attribute("stats/hp", 120.0)
            .with_attribute("stats/max_hp", 120.0)
            .with_attribute("stats/mp", 40.0)
            .with_attribute("stats/atk", 18.0)
            .with_attribute("stats/aim", 8.0),
        Actor::new(DUMMY, Position::new(2, 1))
            .with_attribute("stats/hp", 400.0)
            .with_attribute("stats/def", 6.0)
            .with_attribute("stats/dodge", 4.0),
    ]
    .into_iter()
    .collect()
}

/// The dummy never moves, so every projectile hits what it was aimed at.
async fn land_projectiles(
    handle: &RuntimeHandle,
    launches: &mut broadcast::Receiver<Event>,
) -> Result<()> {
    for launch in pending_launches(launches) {
        let outcome = handle
            .skill_hit(launch.owner, launch.skill.key.as_str(), launch.target)
            .await?;
        println!(
            "  {:<10} hit {} -> {}",
            launch.skill.key,
            launch.target,
            describe(outcome)
        );
    }
    Ok(())
}

/// Takes every launch still queued on the physics topic.
///
/// Launches overwritten while the receiver lagged are reported and skipped;
/// the ones still buffered are returned.
fn pending_launches(launches: &mut broadcast::Receiver<Event>) -> Vec<PhysicalLaunch> {
    let mut pending = Vec::new();
    loop {
        match launches.try_recv() {
            Ok(Event::Physics(launch)) => pending.push(launch),
            Ok(_) => {}
            Err(TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "projectile reports fell behind");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
    pending
}

async fn property(handle: &RuntimeHandle, id: EntityId, path: &str) -> Result<f64> {
    let actor = handle
        .query_actor(id)
        .await?
        .with_context(|| format!("actor {id} left the duel"))?;
    Ok(actor.property(path).unwrap_or_default())
}

fn describe(outcome: SkillOutcome) -> String {
    match outcome.state {
        Some(state) => state.to_string(),
        None => "not ready".to_string(),
    }
}

fn report(skill: &str, outcome: SkillOutcome) {
    let text = describe(outcome);
    let text = match outcome.state {
        Some(state) if state.is_failure() => style(text).yellow(),
        _ => style(text).green(),
    };
    println!("  {skill:<10} -> {text}");
}

fn report_cast(skill: &str, result: bool) {
    let text = if result {
        style("cast landed").green()
    } else {
        style("cast fizzled").yellow()
    };
    println!("  {skill:<10} -> {text}");
}

#[cfg(test)]
mod tests {
    use rpg_core::{SkillRef, SkillType};

    use super::*;

    fn launch(key: &str) -> Event {
        Event::Physics(PhysicalLaunch {
            skill: SkillRef {
                key: key.to_string(),
                owner: HERO,
                skill_type: SkillType::PhysicalAttack,
            },
            owner: HERO,
            target: DUMMY,
            magnitude: 10.0,
            object_width: 1.0,
            object_height: 1.0,
        })
    }

    #[test]
    fn lagging_receiver_still_lands_buffered_launches() {
        let (tx, mut rx) = broadcast::channel(2);
        for key in ["first", "second", "third"] {
            tx.send(launch(key)).unwrap();
        }

        let keys: Vec<String> = pending_launches(&mut rx)
            .into_iter()
            .map(|launch| launch.skill.key)
            .collect();
        assert_eq!(keys, vec!["second".to_string(), "third".to_string()]);
        assert!(pending_launches(&mut rx).is_empty());
    }
}
