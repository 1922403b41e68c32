#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Scripted game world that stands in for a process-memory reader.
//!
//! The world is driven exclusively through [`apply`], which mutates the
//! session deterministically and reports what happened as [`Event`] values.
//! Reads go through the [`LiveEntitySource`] implementation, which mirrors
//! the limits of a real memory reader: stale player handles stop resolving
//! once a new game starts, and entity scans only reach a bounded radius.

use waypoint_core::{
    Command, Event, Item, LiveEntitySource, Monster, Object, OpenMenus, PlayerHandle, PlayerUnit,
    Position, RejectionReason, SeedRead, UnitId,
};

/// Chebyshev radius covered by the live object scan.
pub const OBJECT_SCAN_RADIUS: u32 = 40;

/// Chebyshev radius covered by the live monster scan.
pub const MONSTER_SCAN_RADIUS: u32 = 60;

const PLAYER_HANDLE_BASE: u64 = 0x7ff6_0000_1000;
const PLAYER_HANDLE_STRIDE: u64 = 0x200;

/// Represents the scripted game process.
#[derive(Debug, Default)]
pub struct World {
    session: Option<Session>,
    games_started: u64,
    next_unit: u32,
    calibrations: u32,
}

#[derive(Debug)]
struct Session {
    handle: PlayerHandle,
    seed: SeedRead,
    player: PlayerUnit,
    monsters: Vec<Monster>,
    items: Vec<Item>,
    objects: Vec<Object>,
    menus: OpenMenus,
}

impl World {
    /// Creates a world with no game running.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_unit(&mut self) -> UnitId {
        self.next_unit = self.next_unit.wrapping_add(1);
        UnitId::new(self.next_unit)
    }

    fn session_for(&self, handle: PlayerHandle) -> Option<&Session> {
        self.session
            .as_ref()
            .filter(|session| session.handle == handle)
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::EnterGame {
            seed,
            player,
            area,
            position,
        } => {
            world.games_started = world.games_started.wrapping_add(1);
            let stride = world.games_started.wrapping_mul(PLAYER_HANDLE_STRIDE);
            let handle = PlayerHandle::new(PLAYER_HANDLE_BASE.wrapping_add(stride));
            let unit_id = world.allocate_unit();
            world.session = Some(Session {
                handle,
                seed: SeedRead::from(seed),
                player: PlayerUnit {
                    unit_id,
                    name: player,
                    area,
                    position,
                },
                monsters: Vec::new(),
                items: Vec::new(),
                objects: Vec::new(),
                menus: OpenMenus::default(),
            });
            out_events.push(Event::GameEntered { handle });
        }
        Command::LeaveGame => {
            if world.session.take().is_some() {
                out_events.push(Event::GameLeft);
            } else {
                reject(out_events);
            }
        }
        Command::MovePlayer { position } => match world.session.as_mut() {
            Some(session) => {
                let from = session.player.position;
                session.player.position = position;
                out_events.push(Event::PlayerMoved { from, to: position });
            }
            None => reject(out_events),
        },
        Command::ChangeArea { area, position } => match world.session.as_mut() {
            Some(session) => {
                let from = session.player.area;
                session.player.area = area;
                session.player.position = position;
                // Units of the previous area are out of reach after a transition.
                session.monsters.clear();
                session.objects.clear();
                out_events.push(Event::AreaChanged { from, to: area });
            }
            None => reject(out_events),
        },
        Command::SpawnMonster { name, position } => {
            if world.session.is_none() {
                reject(out_events);
                return;
            }
            let unit_id = world.allocate_unit();
            if let Some(session) = world.session.as_mut() {
                session.monsters.push(Monster {
                    unit_id,
                    name,
                    position,
                });
            }
            out_events.push(Event::UnitSpawned { unit_id });
        }
        Command::DropItem { name, position } => {
            if world.session.is_none() {
                reject(out_events);
                return;
            }
            let unit_id = world.allocate_unit();
            if let Some(session) = world.session.as_mut() {
                session.items.push(Item {
                    unit_id,
                    name,
                    position,
                });
            }
            out_events.push(Event::UnitSpawned { unit_id });
        }
        Command::PlaceObject { name, position } => match world.session.as_mut() {
            Some(session) => session.objects.push(Object { name, position }),
            None => reject(out_events),
        },
        Command::SetOpenMenus { menus } => match world.session.as_mut() {
            Some(session) => session.menus = menus,
            None => reject(out_events),
        },
    }
}

fn reject(out_events: &mut Vec<Event>) {
    out_events.push(Event::CommandRejected {
        reason: RejectionReason::NotInGame,
    });
}

impl LiveEntitySource for World {
    fn player_handle(&self) -> Option<PlayerHandle> {
        self.session.as_ref().map(|session| session.handle)
    }

    fn player_unit(&self, handle: PlayerHandle) -> Option<PlayerUnit> {
        self.session_for(handle).map(|session| session.player.clone())
    }

    fn map_seed(&self, handle: PlayerHandle) -> SeedRead {
        self.session_for(handle)
            .map_or(SeedRead::Unknown, |session| session.seed)
    }

    fn monsters(&self, near: Position) -> Vec<Monster> {
        self.session
            .as_ref()
            .map(|session| {
                session
                    .monsters
                    .iter()
                    .filter(|monster| {
                        monster.position.chebyshev_distance(near) <= MONSTER_SCAN_RADIUS
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn items(&self) -> Vec<Item> {
        self.session
            .as_ref()
            .map(|session| session.items.clone())
            .unwrap_or_default()
    }

    fn objects(&self, near: Position) -> Vec<Object> {
        self.session
            .as_ref()
            .map(|session| {
                session
                    .objects
                    .iter()
                    .filter(|object| {
                        object.position.chebyshev_distance(near) <= OBJECT_SCAN_RADIUS
                    })
                    .copied()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn open_menus(&self) -> OpenMenus {
        self.session
            .as_ref()
            .map(|session| session.menus)
            .unwrap_or_default()
    }

    fn recalibrate(&mut self) {
        self.calibrations = self.calibrations.saturating_add(1);
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use waypoint_core::{PlayerHandle, PlayerUnit};

    /// Reports whether a game session is running.
    #[must_use]
    pub fn in_game(world: &World) -> bool {
        world.session.is_some()
    }

    /// Handle of the current player, if a game is running.
    #[must_use]
    pub fn player_handle(world: &World) -> Option<PlayerHandle> {
        world.session.as_ref().map(|session| session.handle)
    }

    /// Player unit of the current game, if any.
    #[must_use]
    pub fn player(world: &World) -> Option<&PlayerUnit> {
        world.session.as_ref().map(|session| &session.player)
    }

    /// Number of times a reader asked the world to recompute its offsets.
    #[must_use]
    pub fn calibrations(world: &World) -> u32 {
        world.calibrations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_core::{AreaId, ObjectName};

    fn enter(world: &mut World, seed: Option<u32>) -> PlayerHandle {
        let mut events = Vec::new();
        apply(
            world,
            Command::EnterGame {
                seed,
                player: "Sorc".to_owned(),
                area: AreaId::new(1),
                position: Position::new(100, 100),
            },
            &mut events,
        );
        match events.as_slice() {
            [Event::GameEntered { handle }] => *handle,
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn entering_a_new_game_retires_the_previous_handle() {
        let mut world = World::new();
        let first = enter(&mut world, Some(7));
        let second = enter(&mut world, Some(8));

        assert_ne!(first, second);
        assert!(world.player_unit(first).is_none());
        assert_eq!(world.map_seed(first), SeedRead::Unknown);
        assert_eq!(world.map_seed(second), SeedRead::Known(8));
        assert_eq!(query::player_handle(&world), Some(second));
    }

    #[test]
    fn unreadable_seed_is_reported_as_unknown() {
        let mut world = World::new();
        let handle = enter(&mut world, None);
        assert_eq!(world.map_seed(handle), SeedRead::Unknown);
    }

    #[test]
    fn commands_outside_a_game_are_rejected() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MovePlayer {
                position: Position::new(1, 1),
            },
            &mut events,
        );
        apply(&mut world, Command::LeaveGame, &mut events);

        assert_eq!(
            events,
            vec![
                Event::CommandRejected {
                    reason: RejectionReason::NotInGame,
                },
                Event::CommandRejected {
                    reason: RejectionReason::NotInGame,
                },
            ]
        );
        assert!(!query::in_game(&world));
    }

    #[test]
    fn object_scan_is_limited_to_radius() {
        let mut world = World::new();
        let _ = enter(&mut world, Some(1));
        let mut events = Vec::new();
        let near = Object {
            name: ObjectName::new(1),
            position: Position::new(110, 90),
        };
        let far = Object {
            name: ObjectName::new(2),
            position: Position::new(100 + OBJECT_SCAN_RADIUS as i32 + 1, 100),
        };
        for object in [near, far] {
            apply(
                &mut world,
                Command::PlaceObject {
                    name: object.name,
                    position: object.position,
                },
                &mut events,
            );
        }

        assert_eq!(world.objects(Position::new(100, 100)), vec![near]);
        assert!(events.is_empty());
    }

    #[test]
    fn area_change_clears_local_units() {
        let mut world = World::new();
        let _ = enter(&mut world, Some(1));
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnMonster {
                name: "Fallen".to_owned(),
                position: Position::new(101, 101),
            },
            &mut events,
        );
        assert_eq!(world.monsters(Position::new(100, 100)).len(), 1);

        apply(
            &mut world,
            Command::ChangeArea {
                area: AreaId::new(2),
                position: Position::new(500, 500),
            },
            &mut events,
        );

        assert!(world.monsters(Position::new(101, 101)).is_empty());
        assert_eq!(
            events.last(),
            Some(&Event::AreaChanged {
                from: AreaId::new(1),
                to: AreaId::new(2),
            })
        );
        assert_eq!(
            query::player(&world).map(|player| player.position),
            Some(Position::new(500, 500))
        );
    }
}
