//! Wire shape of the level records emitted by the map generator.

use serde::{Deserialize, Deserializer};

// Explicit `null` decodes like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Static description of a single level as emitted by the map generator.
///
/// Keys are matched in lowercase and in their capitalised spelling. Missing
/// or `null` fields fall back to zero values so partially populated lines
/// still decode.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LevelRecord {
    /// Category tag of the level; empty tags mark noise lines.
    #[serde(rename = "type", alias = "Type", deserialize_with = "null_as_default")]
    pub kind: String,
    /// Area identifier of the level.
    #[serde(alias = "ID", alias = "Id")]
    pub id: u32,
    /// Display name of the level.
    #[serde(alias = "Name", deserialize_with = "null_as_default")]
    pub name: String,
    /// Absolute origin of the level.
    #[serde(alias = "Offset", deserialize_with = "null_as_default")]
    pub offset: LevelOffset,
    /// Grid dimensions of the level.
    #[serde(alias = "Size", deserialize_with = "null_as_default")]
    pub size: LevelSize,
    /// Run-length encoded walkability rows.
    #[serde(rename = "map", alias = "Map", deserialize_with = "null_as_default")]
    pub grid_rows: Vec<Vec<i32>>,
    /// Rooms in level-local coordinates.
    #[serde(alias = "Rooms", deserialize_with = "null_as_default")]
    pub rooms: Vec<RoomRecord>,
    /// Static NPCs, exits and objects in level-local coordinates.
    #[serde(
        rename = "objects",
        alias = "Objects",
        alias = "entities",
        deserialize_with = "null_as_default"
    )]
    pub entities: Vec<EntityRecord>,
}

impl LevelRecord {
    /// Zero-valued record returned for areas absent from a result set.
    pub(crate) const EMPTY: LevelRecord = LevelRecord {
        kind: String::new(),
        id: 0,
        name: String::new(),
        offset: LevelOffset { x: 0, y: 0 },
        size: LevelSize {
            width: 0,
            height: 0,
        },
        grid_rows: Vec::new(),
        rooms: Vec::new(),
        entities: Vec::new(),
    };

    /// Reports whether the record carries level data rather than noise.
    #[must_use]
    pub fn is_level(&self) -> bool {
        !self.kind.is_empty() && !self.grid_rows.is_empty()
    }
}

/// Absolute origin of a level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LevelOffset {
    /// Horizontal origin.
    #[serde(alias = "X")]
    pub x: i32,
    /// Vertical origin.
    #[serde(alias = "Y")]
    pub y: i32,
}

/// Dimensions of a level's collision grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LevelSize {
    /// Number of columns.
    #[serde(alias = "Width")]
    pub width: u32,
    /// Number of rows.
    #[serde(alias = "Height")]
    pub height: u32,
}

/// Rectangular room reported by the generator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RoomRecord {
    /// Level-local horizontal position.
    #[serde(alias = "X")]
    pub x: i32,
    /// Level-local vertical position.
    #[serde(alias = "Y")]
    pub y: i32,
    /// Room width.
    #[serde(alias = "Width")]
    pub width: i32,
    /// Room height.
    #[serde(alias = "Height")]
    pub height: i32,
}

/// Tag distinguishing the kinds of static entities.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Non-player character.
    Npc,
    /// Exit into an adjacent level.
    Exit,
    /// Interactive object.
    Object,
    /// Any tag the decoder does not understand.
    #[default]
    #[serde(other)]
    Other,
}

/// Static entity placed inside a level.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EntityRecord {
    /// Kind of entity.
    #[serde(rename = "type", alias = "Type")]
    pub kind: EntityKind,
    /// NPC class, destination area or object class depending on `kind`.
    #[serde(alias = "ID", alias = "Id")]
    pub id: u32,
    /// Level-local horizontal position.
    #[serde(alias = "X")]
    pub x: i32,
    /// Level-local vertical position.
    #[serde(alias = "Y")]
    pub y: i32,
    /// Optional display name.
    #[serde(alias = "Name", deserialize_with = "null_as_default")]
    pub name: String,
}
