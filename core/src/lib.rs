#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the waypoint snapshot pipeline.
//!
//! This crate defines the vocabulary that connects the live entity source,
//! the static map decoder and the snapshot builder. Live sources implement
//! [`LiveEntitySource`] and hand out immutable entity records; the snapshot
//! builder combines them with generated level data and emits one
//! [`Snapshot`] per request. The scripted world accepts [`Command`] values
//! and broadcasts [`Event`] values so drivers can detect game transitions.

use serde::{Deserialize, Serialize};

/// Seed passed to the map generator when the live seed could not be read.
pub const UNKNOWN_SEED_ARGUMENT: &str = "0";

/// Game difficulty the static level data is generated for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Lowest difficulty tier.
    #[default]
    Normal,
    /// Intermediate difficulty tier.
    Nightmare,
    /// Highest difficulty tier.
    Hell,
}

impl Difficulty {
    /// Numeric code understood by the external map generator.
    #[must_use]
    pub const fn generator_code(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::Nightmare => 1,
            Self::Hell => 2,
        }
    }
}

/// Outcome of reading the world seed out of the live game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeedRead {
    /// The seed was read successfully.
    Known(u32),
    /// The seed could not be read; callers proceed best-effort.
    Unknown,
}

impl SeedRead {
    /// Renders the seed as the argument expected by the map generator.
    ///
    /// Unknown seeds degrade to [`UNKNOWN_SEED_ARGUMENT`] so a snapshot can
    /// still be produced while the game is settling.
    #[must_use]
    pub fn generator_argument(&self) -> String {
        match self {
            Self::Known(seed) => seed.to_string(),
            Self::Unknown => UNKNOWN_SEED_ARGUMENT.to_owned(),
        }
    }

    /// Returns the seed value when it is known.
    #[must_use]
    pub const fn known(&self) -> Option<u32> {
        match self {
            Self::Known(seed) => Some(*seed),
            Self::Unknown => None,
        }
    }
}

impl From<Option<u32>> for SeedRead {
    fn from(value: Option<u32>) -> Self {
        value.map_or(Self::Unknown, Self::Known)
    }
}

/// Opaque handle identifying the live player entity inside the game process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerHandle(u64);

impl PlayerHandle {
    /// Creates a new handle wrapping the provided raw value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the raw handle value.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Identifier of a game area (level).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct AreaId(u32);

impl AreaId {
    /// Creates a new area identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Identifier assigned to a live unit by the game.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Class identifier of a non-player character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NpcId(u32);

impl NpcId {
    /// Creates a new NPC identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Name of an interactive object, expressed as its numeric class identifier.
///
/// Live readers and the map generator agree on these identifiers, which is
/// what allows objects from both sources to be matched by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectName(u32);

impl ObjectName {
    /// Creates a new object name from its class identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric class identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location expressed in world coordinates.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Translates a level-local position into absolute coordinates.
    #[must_use]
    pub const fn translated_by(self, origin: Position) -> Self {
        Self {
            x: self.x.wrapping_add(origin.x),
            y: self.y.wrapping_add(origin.y),
        }
    }

    /// Chebyshev distance between two positions.
    #[must_use]
    pub fn chebyshev_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

/// Live player unit resolved from the game process.
///
/// The zero value stands for "no player resolvable".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerUnit {
    /// Identifier assigned to the unit by the game.
    pub unit_id: UnitId,
    /// Character name.
    pub name: String,
    /// Area the player currently stands in.
    pub area: AreaId,
    /// Absolute position of the player.
    pub position: Position,
}

/// Monster read from the live game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monster {
    /// Identifier assigned to the unit by the game.
    pub unit_id: UnitId,
    /// Monster name.
    pub name: String,
    /// Absolute position of the monster.
    pub position: Position,
}

/// Item read from the live game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Identifier assigned to the unit by the game.
    pub unit_id: UnitId,
    /// Item name.
    pub name: String,
    /// Absolute position of the item.
    pub position: Position,
}

/// Interactive object, either scanned live or known from static level data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Object {
    /// Class identifier used to match objects across sources.
    pub name: ObjectName,
    /// Absolute position of the object.
    pub position: Position,
}

/// Non-player character known from static level data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Npc {
    /// Class identifier of the NPC.
    pub id: NpcId,
    /// Display name reported by the map generator, possibly empty.
    pub name: String,
    /// Absolute positions at which the NPC is placed.
    pub positions: Vec<Position>,
}

/// Exit leading into an adjacent level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdjacentLevel {
    /// Area reached through the exit.
    pub area: AreaId,
    /// Absolute position of the exit.
    pub position: Position,
}

/// Rectangular room inside a level, in level-local coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Room {
    /// Upper-left corner of the room.
    pub position: Position,
    /// Width of the room in cells.
    pub width: i32,
    /// Height of the room in cells.
    pub height: i32,
}

/// Flags describing which in-game menus are open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpenMenus {
    /// Inventory panel is open.
    pub inventory: bool,
    /// An NPC dialogue is open.
    pub npc_interact: bool,
    /// An NPC shop is open.
    pub npc_shop: bool,
    /// The stash is open.
    pub stash: bool,
    /// The waypoint list is open.
    pub waypoint: bool,
    /// The automap overlay is shown.
    pub map_shown: bool,
}

/// Dense walkability grid of a single area, stored in row-major order.
///
/// Cells are addressed locally from the area origin; absolute lookups are
/// translated through [`CollisionGrid::origin`]. `true` marks a walkable cell.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionGrid {
    origin: Position,
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl CollisionGrid {
    /// Creates a grid from row-major cells.
    ///
    /// Missing cells are padded as blocked and surplus cells are dropped so
    /// the grid always holds exactly `width * height` entries.
    #[must_use]
    pub fn from_cells(origin: Position, width: u32, height: u32, mut cells: Vec<bool>) -> Self {
        let len = (width as usize).saturating_mul(height as usize);
        cells.resize(len, false);
        Self {
            origin,
            width,
            height,
            cells,
        }
    }

    /// Absolute origin of the area covered by the grid.
    #[must_use]
    pub const fn origin(&self) -> Position {
        self.origin
    }

    /// Provides the `(width, height)` of the grid in cells.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Reports whether the grid holds no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Row of cells at the provided local row index.
    #[must_use]
    pub fn row(&self, y: u32) -> Option<&[bool]> {
        if y >= self.height {
            return None;
        }
        let width = self.width as usize;
        let start = (y as usize).checked_mul(width)?;
        self.cells.get(start..start + width)
    }

    /// Iterator over all rows from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        (0..self.height).filter_map(move |y| self.row(y))
    }

    /// Walkability of a cell addressed relative to the area origin.
    ///
    /// Cells outside the grid are reported as blocked.
    #[must_use]
    pub fn is_walkable_local(&self, x: i32, y: i32) -> bool {
        let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
            return false;
        };
        if x >= self.width {
            return false;
        }
        self.row(y)
            .and_then(|row| row.get(x as usize).copied())
            .unwrap_or(false)
    }

    /// Walkability of a cell addressed in absolute world coordinates.
    #[must_use]
    pub fn is_walkable(&self, position: Position) -> bool {
        self.is_walkable_local(
            position.x().wrapping_sub(self.origin.x()),
            position.y().wrapping_sub(self.origin.y()),
        )
    }
}

/// Consistent view of the world assembled from live and static sources.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Player unit, zero-valued when no player could be resolved.
    pub player: PlayerUnit,
    /// Absolute origin of the player's current area.
    pub area_origin: Position,
    /// Walkability grid of the player's current area.
    pub collision_grid: CollisionGrid,
    /// Monsters scanned around the player.
    pub monsters: Vec<Monster>,
    /// NPCs placed in the current area.
    pub npcs: Vec<Npc>,
    /// Live objects merged with statically known ones.
    pub objects: Vec<Object>,
    /// Exits leading out of the current area.
    pub adjacent_levels: Vec<AdjacentLevel>,
    /// Rooms of the current area, in level-local coordinates.
    pub rooms: Vec<Room>,
    /// Menus open at the time of the read.
    pub open_menus: OpenMenus,
    /// Items read from the live game.
    pub items: Vec<Item>,
}

/// Read access to the running game's dynamic state.
///
/// Implementations wrap process-memory readers. Every method is expected to
/// return promptly; failures surface as `None`, empty collections or
/// [`SeedRead::Unknown`] rather than errors.
pub trait LiveEntitySource {
    /// Resolves the handle of the live player, or `None` when no game is ready.
    fn player_handle(&self) -> Option<PlayerHandle>;

    /// Resolves the player unit behind a previously obtained handle.
    fn player_unit(&self, handle: PlayerHandle) -> Option<PlayerUnit>;

    /// Reads the world seed through the player handle.
    fn map_seed(&self, handle: PlayerHandle) -> SeedRead;

    /// Enumerates monsters around the provided position.
    fn monsters(&self, near: Position) -> Vec<Monster>;

    /// Enumerates items known to the game.
    fn items(&self) -> Vec<Item>;

    /// Enumerates interactive objects around the provided position.
    ///
    /// The scan may miss objects that are far away from `near`.
    fn objects(&self, near: Position) -> Vec<Object>;

    /// Reads the open-menu flags.
    fn open_menus(&self) -> OpenMenus;

    /// Recomputes memory offsets after the game changed underneath the reader.
    fn recalibrate(&mut self) {}
}

/// Commands that express all permissible mutations of a scripted game session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Starts a new game session with a freshly spawned player.
    EnterGame {
        /// World seed, or `None` when the seed should be unreadable.
        #[serde(default)]
        seed: Option<u32>,
        /// Character name.
        player: String,
        /// Area the player spawns in.
        area: AreaId,
        /// Absolute spawn position.
        position: Position,
    },
    /// Ends the current game session.
    LeaveGame,
    /// Moves the player within the current area.
    MovePlayer {
        /// Absolute destination.
        position: Position,
    },
    /// Moves the player into another area.
    ChangeArea {
        /// Destination area.
        area: AreaId,
        /// Absolute position inside the destination area.
        position: Position,
    },
    /// Places a monster into the session.
    SpawnMonster {
        /// Monster name.
        name: String,
        /// Absolute position.
        position: Position,
    },
    /// Places an item into the session.
    DropItem {
        /// Item name.
        name: String,
        /// Absolute position.
        position: Position,
    },
    /// Places an interactive object into the session.
    PlaceObject {
        /// Object class identifier.
        name: ObjectName,
        /// Absolute position.
        position: Position,
    },
    /// Replaces the open-menu flags.
    SetOpenMenus {
        /// New menu state.
        menus: OpenMenus,
    },
}

/// Events broadcast after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A new game session started.
    GameEntered {
        /// Handle of the newly spawned player.
        handle: PlayerHandle,
    },
    /// The game session ended.
    GameLeft,
    /// The player moved inside its area.
    PlayerMoved {
        /// Position before the move.
        from: Position,
        /// Position after the move.
        to: Position,
    },
    /// The player entered another area.
    AreaChanged {
        /// Area left behind.
        from: AreaId,
        /// Area entered.
        to: AreaId,
    },
    /// A unit was added to the session.
    UnitSpawned {
        /// Identifier allocated to the unit.
        unit_id: UnitId,
    },
    /// A command could not be applied.
    CommandRejected {
        /// Specific reason the command failed.
        reason: RejectionReason,
    },
}

/// Reasons a command may be rejected by the scripted world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    /// The command requires an active game session.
    NotInGame,
}

#[cfg(test)]
mod tests {
    use super::{CollisionGrid, Difficulty, Position, SeedRead, Snapshot};

    #[test]
    fn difficulty_codes_match_generator_contract() {
        assert_eq!(Difficulty::Normal.generator_code(), 0);
        assert_eq!(Difficulty::Nightmare.generator_code(), 1);
        assert_eq!(Difficulty::Hell.generator_code(), 2);
    }

    #[test]
    fn unknown_seed_degrades_to_zero_argument() {
        assert_eq!(SeedRead::Known(12345).generator_argument(), "12345");
        assert_eq!(SeedRead::Unknown.generator_argument(), "0");
        assert_eq!(SeedRead::from(None), SeedRead::Unknown);
        assert_eq!(SeedRead::from(Some(0)), SeedRead::Known(0));
    }

    #[test]
    fn translation_adds_origin() {
        let local = Position::new(3, -4);
        let origin = Position::new(5000, 1200);
        assert_eq!(local.translated_by(origin), Position::new(5003, 1196));
    }

    #[test]
    fn collision_grid_translates_absolute_lookups() {
        let grid = CollisionGrid::from_cells(
            Position::new(100, 200),
            2,
            2,
            vec![false, true, true, false],
        );

        assert!(grid.is_walkable(Position::new(101, 200)));
        assert!(grid.is_walkable(Position::new(100, 201)));
        assert!(!grid.is_walkable(Position::new(100, 200)));
        assert!(!grid.is_walkable(Position::new(99, 200)));
        assert!(!grid.is_walkable(Position::new(102, 201)));
        assert_eq!(grid.rows().count(), 2);
    }

    #[test]
    fn collision_grid_pads_short_cell_lists() {
        let grid = CollisionGrid::from_cells(Position::default(), 3, 2, vec![true]);
        assert_eq!(grid.row(1), Some(&[false, false, false][..]));
        assert_eq!(grid.row(2), None);
    }

    #[test]
    fn difficulty_parses_lowercase_names() {
        #[derive(serde::Deserialize)]
        struct Wrapper {
            difficulty: Difficulty,
        }

        let parsed: Wrapper = serde_json::from_str(r#"{"difficulty":"nightmare"}"#)
            .expect("difficulty deserializes");
        assert_eq!(parsed.difficulty, Difficulty::Nightmare);
    }

    #[test]
    fn snapshot_round_trips_through_bincode() {
        let snapshot = Snapshot {
            area_origin: Position::new(10, 20),
            collision_grid: CollisionGrid::from_cells(Position::new(10, 20), 2, 1, vec![true, false]),
            ..Snapshot::default()
        };

        let bytes = bincode::serialize(&snapshot).expect("serialize");
        let restored: Snapshot = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, snapshot);
    }
}
