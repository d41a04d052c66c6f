//! Load a data directory and describe what it contains.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use serde::Serialize;

use rpg_content::{ContentBundle, ContentFactory};
use rpg_core::{ClassPathDefinition, SkillDefinition, SkillsConfig};

use crate::config::CliConfig;

/// Load a data directory and describe its skills and class paths
#[derive(Parser)]
pub struct Inspect {
    /// Content directory (defaults to RPG_DATA_DIR or the bundled demo data)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    /// Readable overview with content problems highlighted
    Summary,
    /// Full JSON output
    Json,
}

#[derive(Serialize)]
struct ContentView<'a> {
    config: &'a SkillsConfig,
    skills: Vec<&'a SkillDefinition>,
    class_paths: Vec<&'a ClassPathDefinition>,
}

impl Inspect {
    pub fn execute(self, config: &CliConfig) -> Result<()> {
        let data_dir = self.data_dir.unwrap_or_else(|| config.data_dir.clone());
        let bundle = ContentFactory::load_dir(&data_dir)
            .with_context(|| format!("Failed to load content from {}", data_dir.display()))?;

        match self.format {
            OutputFormat::Summary => print_summary(&bundle),
            OutputFormat::Json => {
                let view = ContentView {
                    config: &bundle.config,
                    skills: bundle
                        .skills
                        .keys()
                        .filter_map(|key| bundle.skills.get(key))
                        .collect(),
                    class_paths: bundle.class_paths.values().collect(),
                };
                println!("{}", serde_json::to_string_pretty(&view)?);
            }
        }
        Ok(())
    }
}

fn print_summary(bundle: &ContentBundle) {
    let config = &bundle.config;
    println!("{}", style("Settings").bold().cyan());
    println!("  scope prefix:       {}", config.scope_prefix);
    println!("  critical x:         {}", config.critical_multiplier);
    println!("  dodge over aim:     {}", config.dodge_over_aim_success);
    println!("  auto-fill growth:   {}", config.auto_fill_experience_multiplier);
    println!("  game seed:          {}", config.game_seed);

    println!();
    println!("{} ({})", style("Skills").bold().cyan(), bundle.skills.len());
    for key in bundle.skills.keys() {
        let Some(skill) = bundle.skills.get(key) else {
            continue;
        };
        let line = format!(
            "  {:<12} {:<16} range {:<3} cast {:>5}ms  delay {:>5}ms  uses {}",
            key,
            skill.skill_type().to_string(),
            skill.range,
            skill.cast_time,
            skill.skill_delay,
            match skill.uses_limit {
                0 => "-".to_string(),
                limit => limit.to_string(),
            },
        );
        match skill.defect() {
            Some(reason) => println!("{} {}", style(line).red(), style(reason).red().italic()),
            None => println!("{line}"),
        }
    }

    println!();
    println!(
        "{} ({})",
        style("Class paths").bold().cyan(),
        bundle.class_paths.len()
    );
    for class_path in bundle.class_paths.values() {
        println!(
            "  {} {} - {} explicit levels{}",
            style(&class_path.key).bold(),
            style(format!("\"{}\"", class_path.label)).dim(),
            class_path.levels.len(),
            if class_path.options.auto_fill_ranges {
                ", auto-filled"
            } else {
                ""
            },
        );
        for (level, skills) in &class_path.skills_by_level {
            let label = class_path
                .labels_by_level
                .get(level)
                .map(|label| format!(" ({label})"))
                .unwrap_or_default();
            println!("    level {level}{label}: {}", skills.join(", "));
        }
    }

    let missing = bundle.missing_skills();
    if !missing.is_empty() {
        println!();
        println!("{}", style("Missing skills").bold().yellow());
        for (class_path, skill) in missing {
            println!("  {class_path} references unknown skill {skill}");
        }
    }
}
