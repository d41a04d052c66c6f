//! Environment-driven CLI configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Settings read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Content directory used when a command gets no `--data-dir`.
    pub data_dir: PathBuf,
    /// Wall-clock period of the runtime's logical clock step.
    pub tick_interval: Duration,
    /// `tracing` filter directives, e.g. `info,rpg::skill=debug`.
    pub log_filter: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/data")),
            tick_interval: Duration::from_millis(100),
            log_filter: "info".to_string(),
        }
    }
}

impl CliConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("RPG_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        if let Some(millis) = read_env::<u64>("RPG_TICK_MS") {
            config.tick_interval = Duration::from_millis(millis.max(1));
        }

        if let Ok(filter) = env::var("RPG_LOG") {
            config.log_filter = filter;
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
