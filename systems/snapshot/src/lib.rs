#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Snapshot builder that merges live game reads with generated level data.
//!
//! The builder caches the static map data of the current world seed and only
//! regenerates it when the game changed underneath it: on request, when the
//! live player cannot be resolved, or after [`SnapshotBuilder::invalidate`].
//! Every [`SnapshotBuilder::build`] call then combines the cached level of the
//! player's area with fresh live reads.

mod reconcile;

use thiserror::Error;
use tracing::{debug, info, warn};
use waypoint_core::{
    Difficulty, LiveEntitySource, PlayerHandle, SeedRead, Snapshot, UNKNOWN_SEED_ARGUMENT,
};
use waypoint_system_map_data::{GeneratorError, MapData, StaticMapProvider};

pub use reconcile::reconcile_objects;

/// Failures that prevent a snapshot from being built.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Static map data could not be generated for the current seed.
    #[error("static map data could not be generated")]
    MapData(#[from] GeneratorError),
}

// Seed, player handle and level data describe one game and are only ever
// replaced together.
#[derive(Debug)]
struct MapCache {
    seed: SeedRead,
    player: Option<PlayerHandle>,
    difficulty: Difficulty,
    map_data: MapData,
}

impl MapCache {
    fn serves(&self, seed: SeedRead, difficulty: Difficulty) -> bool {
        matches!(seed, SeedRead::Known(_)) && self.seed == seed && self.difficulty == difficulty
    }
}

/// Builds world snapshots for a single driving caller.
#[derive(Debug)]
pub struct SnapshotBuilder<S, P> {
    source: S,
    provider: P,
    difficulty: Difficulty,
    cache: Option<MapCache>,
    stale: bool,
}

impl<S, P> SnapshotBuilder<S, P>
where
    S: LiveEntitySource,
    P: StaticMapProvider,
{
    /// Creates a builder with an empty cache.
    #[must_use]
    pub fn new(source: S, provider: P, difficulty: Difficulty) -> Self {
        Self {
            source,
            provider,
            difficulty,
            cache: None,
            stale: false,
        }
    }

    /// Live source the builder reads from.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the live source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Difficulty static data is generated for.
    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Seed of the cached static data, if any has been generated.
    #[must_use]
    pub fn cached_seed(&self) -> Option<SeedRead> {
        self.cache.as_ref().map(|cache| cache.seed)
    }

    /// Player handle captured during the last refresh.
    #[must_use]
    pub fn cached_player(&self) -> Option<PlayerHandle> {
        self.cache.as_ref().and_then(|cache| cache.player)
    }

    /// Reports whether a player is currently resolvable.
    #[must_use]
    pub fn in_game(&self) -> bool {
        self.source.player_handle().is_some()
    }

    /// Forces the next [`build`](Self::build) to refresh the cache.
    ///
    /// The cached data stays in place until the refresh succeeds.
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    /// Re-reads the player and seed and regenerates static data if needed.
    ///
    /// A generator failure is returned before the cache is touched, so the
    /// previous data stays in place.
    pub fn refresh(&mut self) -> Result<(), SnapshotError> {
        let cache = self.refreshed_cache()?;
        self.cache = Some(cache);
        Ok(())
    }

    /// Builds a snapshot of the current world state.
    ///
    /// A player that cannot be resolved yields a zero-valued player unit
    /// rather than an error; use [`in_game`](Self::in_game) to detect it.
    pub fn build(&mut self, force_refresh: bool) -> Result<Snapshot, SnapshotError> {
        let needs_refresh =
            force_refresh || self.stale || self.source.player_handle().is_none();

        let cache = match self.cache.take() {
            Some(cache) if !needs_refresh => cache,
            previous => {
                self.cache = previous;
                self.refreshed_cache()?
            }
        };

        let snapshot = self.assemble(&cache);
        self.cache = Some(cache);
        Ok(snapshot)
    }

    // Produces the cache for the current game without installing it. On
    // failure `self.cache` still holds the previous cache.
    fn refreshed_cache(&mut self) -> Result<MapCache, SnapshotError> {
        self.source.recalibrate();

        let player = self.source.player_handle();
        let seed = player.map_or(SeedRead::Unknown, |handle| self.source.map_seed(handle));
        if seed == SeedRead::Unknown {
            warn!(
                fallback = UNKNOWN_SEED_ARGUMENT,
                "world seed unavailable, generating static data best-effort"
            );
        }

        let map_data = match self.cache.take() {
            Some(cache) if cache.serves(seed, self.difficulty) => {
                debug!(?seed, "reusing static map data");
                cache.map_data
            }
            previous => {
                self.cache = previous;
                self.provider
                    .decode(&seed.generator_argument(), self.difficulty)?
            }
        };

        info!(?seed, ?player, levels = map_data.len(), "refreshed map cache");
        self.stale = false;
        Ok(MapCache {
            seed,
            player,
            difficulty: self.difficulty,
            map_data,
        })
    }

    fn assemble(&self, cache: &MapCache) -> Snapshot {
        let player = cache
            .player
            .and_then(|handle| self.source.player_unit(handle))
            .unwrap_or_default();

        let map_data = &cache.map_data;
        let area_origin = map_data.origin(player.area);
        let entities = map_data.npcs_exits_objects_rooms(area_origin, player.area);

        // The live scan misses far-away objects such as waypoints, so the
        // static placements fill the gaps.
        let live_objects = self.source.objects(player.position);
        let objects = reconcile_objects(live_objects, &entities.objects);

        Snapshot {
            area_origin,
            collision_grid: map_data.collision_grid(player.area),
            monsters: self.source.monsters(player.position),
            npcs: entities.npcs,
            objects,
            adjacent_levels: entities.exits,
            rooms: entities.rooms,
            open_menus: self.source.open_menus(),
            items: self.source.items(),
            player,
        }
    }
}
