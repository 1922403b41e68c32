#![allow(clippy::missing_errors_doc)]

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use waypoint_core::Difficulty;
use waypoint_system_map_data::{MapGenerator, DEFAULT_TIMEOUT};

/// Settings loaded from the configuration file.
#[derive(Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Config {
    /// Game installation and difficulty.
    pub(crate) game: GameConfig,
    /// External map generator invocation.
    pub(crate) map_generator: GeneratorConfig,
}

/// Game installation the generator reads level data from.
#[derive(Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct GameConfig {
    /// Difficulty the bot plays on.
    #[serde(default)]
    pub(crate) difficulty: Difficulty,
    /// Root directory of the game installation.
    pub(crate) install_path: PathBuf,
}

/// How the external map generator is launched.
#[derive(Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct GeneratorConfig {
    /// Path to the generator binary.
    pub(crate) binary: PathBuf,
    /// Seconds the generator may run before it is killed.
    #[serde(default = "default_timeout_secs")]
    pub(crate) timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

impl Config {
    /// Reads and validates the configuration file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid configuration {}", path.display()))
    }

    /// Parses and validates configuration toml contents.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).context("failed to parse configuration toml contents")?;
        if config.map_generator.timeout_secs == 0 {
            bail!("map_generator.timeout_secs must be greater than zero");
        }
        Ok(config)
    }

    /// Builds the generator driver described by the configuration.
    pub(crate) fn generator(&self) -> MapGenerator {
        MapGenerator::new(&self.map_generator.binary, &self.game.install_path)
            .with_timeout(Duration::from_secs(self.map_generator.timeout_secs))
    }
}
