use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use waypoint_core::Command;

/// Scripted game session replayed by the control loop.
#[derive(Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Session {
    /// Ticks in replay order.
    #[serde(default, rename = "tick")]
    pub(crate) ticks: Vec<Tick>,
}

/// Commands applied to the world before a snapshot is taken.
#[derive(Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Tick {
    /// Commands in application order.
    #[serde(default, rename = "command")]
    pub(crate) commands: Vec<Command>,
}

impl Session {
    /// Reads the session script at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read session {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse session toml {}", path.display()))
    }
}
