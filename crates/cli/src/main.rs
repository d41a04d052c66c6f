//! Command line front end for the skill and progression runtime.
//!
//! Run with: `cargo run -p rpg-cli -- <command>`

mod commands;
mod config;
mod logging;

use anyhow::Result;
use clap::Parser;
use commands::{Duel, Inspect};
use config::CliConfig;

/// Skill and progression toolbox
#[derive(Parser)]
#[command(name = "rpg")]
#[command(about = "Inspect skill content and run scripted duels", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Load a data directory and describe its skills and class paths
    Inspect(Inspect),

    /// Run a scripted duel through the runtime
    Duel(Duel),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (for RPG_DATA_DIR and other env vars)
    let _ = dotenvy::dotenv();

    let config = CliConfig::from_env();
    logging::setup_logging(&config.log_filter)?;

    let cli = Cli::parse();

    match cli.command {
        Command::Inspect(cmd) => cmd.execute(&config),
        Command::Duel(cmd) => cmd.execute(&config).await,
    }
}
