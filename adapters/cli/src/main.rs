#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays a scripted session through the snapshot
//! pipeline, one snapshot per tick.

mod config;
mod session;

use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use waypoint_core::{Event, Snapshot};
use waypoint_system_snapshot::SnapshotBuilder;
use waypoint_world::{self as world, World};

use crate::{config::Config, session::Session};

/// Replays a scripted game session and reports a world snapshot per tick.
#[derive(Debug, Parser)]
#[command(name = "waypoint", version)]
struct Cli {
    /// Configuration file describing the game and the map generator.
    #[arg(long, default_value = "waypoint.toml")]
    config: PathBuf,
    /// Session script replayed tick by tick.
    #[arg(long)]
    session: PathBuf,
    /// Print each snapshot as one JSON line on stdout.
    #[arg(long)]
    json: bool,
}

/// Entry point for the waypoint command-line interface.
fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    match run(&Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::load(&cli.config)?;
    let session = Session::load(&cli.session)?;
    let generator = config.generator();
    let generator_binary = generator.binary().to_path_buf();
    let mut builder = SnapshotBuilder::new(World::new(), generator, config.game.difficulty);
    let mut stdout = io::stdout().lock();

    info!(ticks = session.ticks.len(), difficulty = ?config.game.difficulty, "replaying session");

    for (tick, step) in session.ticks.into_iter().enumerate() {
        let mut events = Vec::new();
        for command in step.commands {
            world::apply(builder.source_mut(), command, &mut events);
        }

        for event in &events {
            if let Event::CommandRejected { reason } = event {
                warn!(tick, ?reason, "command rejected");
            }
        }
        let new_game = events
            .iter()
            .any(|event| matches!(event, Event::GameEntered { .. }));

        let snapshot = builder.build(new_game).with_context(|| {
            format!(
                "map generator {} failed at tick {tick}; halting",
                generator_binary.display()
            )
        })?;

        if cli.json {
            serde_json::to_writer(&mut stdout, &snapshot).context("failed to encode snapshot")?;
            writeln!(stdout).context("failed to write snapshot")?;
        } else {
            report(tick, builder.in_game(), &snapshot);
        }
    }

    Ok(())
}

fn report(tick: usize, in_game: bool, snapshot: &Snapshot) {
    if !in_game {
        info!(tick, "not in game");
        return;
    }

    let walkable = snapshot.collision_grid.is_walkable(snapshot.player.position);
    info!(
        tick,
        area = snapshot.player.area.get(),
        position = ?snapshot.player.position,
        origin = ?snapshot.area_origin,
        walkable,
        monsters = snapshot.monsters.len(),
        npcs = snapshot.npcs.len(),
        objects = snapshot.objects.len(),
        exits = snapshot.adjacent_levels.len(),
        "snapshot"
    );
}
