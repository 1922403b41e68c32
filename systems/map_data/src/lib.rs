#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Static map decoder built on top of the external map generator.
//!
//! The generator prints one JSON level record per line, interleaved with blank
//! and diagnostic lines. [`MapData::parse`] keeps the records that describe a
//! level and discards everything else. Queries on [`MapData`] are permissive:
//! an area missing from the result behaves like an empty level so callers
//! never have to handle lookup failures.

mod generator;
mod grid;
mod record;

use tracing::debug;
use waypoint_core::{
    AdjacentLevel, AreaId, CollisionGrid, Difficulty, Npc, NpcId, Object, ObjectName, Position,
    Room,
};

pub use generator::{GeneratorError, MapGenerator, DEFAULT_TIMEOUT};
pub use grid::{decode_grid, encode_row};
pub use record::{EntityKind, EntityRecord, LevelOffset, LevelRecord, LevelSize, RoomRecord};

static EMPTY_LEVEL: LevelRecord = LevelRecord::EMPTY;

/// Produces static map data for a seed and difficulty.
pub trait StaticMapProvider {
    /// Generates and decodes the levels of the world identified by `seed`.
    ///
    /// Failures are fatal for the call; no partial result is returned.
    fn decode(&self, seed: &str, difficulty: Difficulty) -> Result<MapData, GeneratorError>;
}

/// Decoded level records of one seed and difficulty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MapData {
    levels: Vec<LevelRecord>,
}

/// Static entities of a level, translated into absolute coordinates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StaticEntities {
    /// NPCs placed in the level.
    pub npcs: Vec<Npc>,
    /// Exits leading into adjacent levels.
    pub exits: Vec<AdjacentLevel>,
    /// Interactive objects placed in the level.
    pub objects: Vec<Object>,
    /// Rooms, left in level-local coordinates.
    pub rooms: Vec<Room>,
}

impl MapData {
    /// Builds a result set from already decoded records, dropping noise records.
    #[must_use]
    pub fn from_levels(levels: Vec<LevelRecord>) -> Self {
        Self {
            levels: levels.into_iter().filter(LevelRecord::is_level).collect(),
        }
    }

    /// Parses the generator's line stream.
    ///
    /// The stream is split on `\r\n`; output without any `\r\n` is split on
    /// `\n`. Lines that are not JSON level records, or that describe a level
    /// without a kind or without grid rows, are skipped.
    #[must_use]
    pub fn parse(output: &str) -> Self {
        let delimiter = if output.contains("\r\n") { "\r\n" } else { "\n" };
        let mut levels = Vec::new();
        let mut discarded = 0_usize;

        for line in output.split(delimiter) {
            let line = line.trim_end_matches(['\r', '\n']);
            match serde_json::from_str::<LevelRecord>(line) {
                Ok(level) if level.is_level() => levels.push(level),
                _ if line.trim().is_empty() => {}
                _ => discarded += 1,
            }
        }

        if discarded > 0 {
            debug!(discarded, "skipped non-level generator lines");
        }

        Self { levels }
    }

    /// Records in generator order.
    #[must_use]
    pub fn levels(&self) -> &[LevelRecord] {
        &self.levels
    }

    /// Number of decoded levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Reports whether no level was decoded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Record of the provided area, or `None` when it is absent.
    #[must_use]
    pub fn try_level(&self, area: AreaId) -> Option<&LevelRecord> {
        self.levels.iter().find(|level| level.id == area.get())
    }

    /// Record of the provided area, or a zero-valued record when it is absent.
    #[must_use]
    pub fn level(&self, area: AreaId) -> &LevelRecord {
        self.try_level(area).unwrap_or(&EMPTY_LEVEL)
    }

    /// Absolute origin of the provided area.
    #[must_use]
    pub fn origin(&self, area: AreaId) -> Position {
        let offset = self.level(area).offset;
        Position::new(offset.x, offset.y)
    }

    /// Walkability grid of the provided area.
    #[must_use]
    pub fn collision_grid(&self, area: AreaId) -> CollisionGrid {
        let level = self.level(area);
        decode_grid(
            Position::new(level.offset.x, level.offset.y),
            level.size.width,
            level.size.height,
            &level.grid_rows,
        )
    }

    /// Static NPCs, exits, objects and rooms of the provided area.
    ///
    /// Entity positions are translated by `origin`; rooms are returned as
    /// recorded.
    #[must_use]
    pub fn npcs_exits_objects_rooms(&self, origin: Position, area: AreaId) -> StaticEntities {
        let level = self.level(area);
        let mut entities = StaticEntities {
            rooms: level
                .rooms
                .iter()
                .map(|room| Room {
                    position: Position::new(room.x, room.y),
                    width: room.width,
                    height: room.height,
                })
                .collect(),
            ..StaticEntities::default()
        };

        for entity in &level.entities {
            let position = Position::new(entity.x, entity.y).translated_by(origin);
            match entity.kind {
                EntityKind::Npc => entities.npcs.push(Npc {
                    id: NpcId::new(entity.id),
                    name: entity.name.clone(),
                    positions: vec![position],
                }),
                EntityKind::Exit => entities.exits.push(AdjacentLevel {
                    area: AreaId::new(entity.id),
                    position,
                }),
                EntityKind::Object => entities.objects.push(Object {
                    name: ObjectName::new(entity.id),
                    position,
                }),
                EntityKind::Other => {}
            }
        }

        entities
    }
}
