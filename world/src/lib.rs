#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative level state and the tick driver.
//!
//! A level owns the tile grid, the sprites parsed from its map file, the
//! all-pairs tile distance matrix, and the pairwise interaction rules. One
//! call to [`step`] runs a complete tick: input delivery or idle
//! processing, distance and observation refresh, pairwise then unilateral
//! interaction resolution, and finally one draw request per sprite.
//!
//! Everything the level needs from the outside world arrives through the
//! [`AssetCatalog`], [`BehaviorSource`] and [`InteractionSource`] traits,
//! so the simulation never touches files, images, or input devices itself.

mod sprite;

pub use sprite::Sprite;

use pondlife_core::{
    distance, Animation, AnimationError, Behavior, Command, CommandError, CommandSet, DrawQueue,
    FrameHandle, GameTime, InputQueue, Interaction, PairInteraction, PixelPoint, QueueOverflow,
    SpriteId, SpriteObservation,
};
use thiserror::Error;

/// Error raised by an [`AssetCatalog`] when an asset cannot be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("asset {path:?} could not be loaded: {reason}")]
pub struct AssetError {
    /// Path of the asset that failed to load.
    pub path: String,
    /// Human-readable cause.
    pub reason: String,
}

/// Error raised while building a [`Level`] from its map and descriptors.
#[derive(Debug, Error)]
pub enum LevelError {
    /// The level file defines no tiles at all.
    #[error("level defines no tiles")]
    NoTiles,
    /// A tile's artwork size differs from the first tile's.
    #[error("tile {symbol:?} has size {size}, expected {expected}")]
    MismatchedTileSizes {
        /// Symbol of the offending tile.
        symbol: char,
        /// Its artwork size in pixels.
        size: u32,
        /// Size established by the first tile.
        expected: u32,
    },
    /// The shared tile size is not a power of two, so shift-based
    /// coordinate conversion is impossible.
    #[error("tile size {size} is not a power of two")]
    TileSizeNotPowerOfTwo {
        /// The offending size.
        size: u32,
    },
    /// A map row's width differs from the first row's.
    #[error("map row {row} has a different width than the first row")]
    RaggedMap {
        /// Zero-based index of the offending row.
        row: usize,
    },
    /// The map references a symbol no tile definition introduced.
    #[error("map uses undefined tile symbol {symbol:?}")]
    UnknownTileSymbol {
        /// The offending symbol.
        symbol: char,
    },
    /// A `sprite:` entry carries no descriptor path.
    #[error("malformed sprite entry {line:?}")]
    MalformedSpriteLine {
        /// The offending line.
        line: String,
    },
    /// A descriptor lacks a required key.
    #[error("descriptor {path:?} is missing required key {key:?}")]
    MissingDescriptorKey {
        /// Descriptor path.
        path: String,
        /// The missing key.
        key: String,
    },
    /// A descriptor entry's value does not parse.
    #[error("descriptor entry {key:?} has malformed value {value:?}")]
    MalformedDescriptorEntry {
        /// The offending key.
        key: String,
        /// The offending value.
        value: String,
    },
    /// An animation binding names a command the sprite never registered.
    #[error("animation binding refers to unknown command {command:?}")]
    UnknownCommandBinding {
        /// The unregistered command name.
        command: String,
    },
    /// A descriptor selects a behavior the registry does not provide.
    #[error("descriptor names unknown behavior {0:?}")]
    UnknownBehavior(String),
    /// A descriptor selects no behaviors at all.
    #[error("descriptor {path:?} selects no behaviors")]
    NoBehaviors {
        /// Descriptor path.
        path: String,
    },
    /// A descriptor binds no animations at all.
    #[error("descriptor {path:?} binds no animations")]
    NoAnimations {
        /// Descriptor path.
        path: String,
    },
    /// An asset failed to load.
    #[error(transparent)]
    Asset(#[from] AssetError),
    /// A command description failed to parse or register.
    #[error(transparent)]
    Command(#[from] CommandError),
    /// An animation schedule was inconsistent.
    #[error(transparent)]
    Animation(#[from] AnimationError),
}

/// Error raised while running a tick.
#[derive(Debug, Error)]
pub enum StepError {
    /// The draw channel refused a frame; the consumer has stalled.
    #[error("draw channel rejected a frame: {0}")]
    DrawChannelFull(#[from] QueueOverflow),
}

/// Resolved artwork for one tile type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileArt {
    /// Frame handle owned by the rendering collaborator.
    pub handle: FrameHandle,
    /// Edge length of the square artwork in pixels.
    pub size: u32,
}

/// Supplies externally owned assets to the level loader.
pub trait AssetCatalog {
    /// Resolves the artwork for one tile type.
    fn tile_art(&self, path: &str) -> Result<TileArt, AssetError>;
    /// Loads a sprite descriptor as ordered key/value entries.
    fn sprite_descriptor(&self, path: &str) -> Result<Vec<(String, String)>, AssetError>;
    /// Loads an animation with its frame schedule.
    fn animation(&self, path: &str) -> Result<Animation, AssetError>;
}

/// Supplies behavior implementations by registered name.
pub trait BehaviorSource {
    /// A fresh behavior instance for the provided name, if registered.
    fn behavior(&self, name: &str) -> Option<Box<dyn Behavior>>;
}

/// Supplies unilateral interactions applicable to a role tag.
pub trait InteractionSource {
    /// Fresh interaction instances for sprites carrying `role`.
    fn interactions(&self, role: &str) -> Vec<Box<dyn Interaction>>;
}

/// One tile type: its map symbol and artwork.
#[derive(Debug, Clone, Copy)]
struct Tile {
    symbol: char,
    art: TileArt,
}

/// The level's tile map with shift-based pixel/tile conversion.
#[derive(Debug)]
pub struct TileGrid {
    tiles: Vec<Tile>,
    map: Vec<Vec<usize>>,
    tile_size: u32,
    tile_size_bits: u32,
}

impl TileGrid {
    fn new(tiles: Vec<Tile>, map: Vec<Vec<usize>>) -> Result<Self, LevelError> {
        let first = tiles.first().ok_or(LevelError::NoTiles)?;
        let tile_size = first.art.size;
        for tile in &tiles {
            if tile.art.size != tile_size {
                return Err(LevelError::MismatchedTileSizes {
                    symbol: tile.symbol,
                    size: tile.art.size,
                    expected: tile_size,
                });
            }
        }
        if !tile_size.is_power_of_two() {
            return Err(LevelError::TileSizeNotPowerOfTwo { size: tile_size });
        }
        Ok(Self {
            tiles,
            map,
            tile_size,
            tile_size_bits: tile_size.trailing_zeros(),
        })
    }

    /// Edge length of every tile in pixels.
    #[must_use]
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Map width in tiles.
    #[must_use]
    pub fn width_tiles(&self) -> i32 {
        self.map.first().map_or(0, |row| row.len() as i32)
    }

    /// Map height in tiles.
    #[must_use]
    pub fn height_tiles(&self) -> i32 {
        self.map.len() as i32
    }

    /// Converts a pixel measure to whole tiles, rounding toward negative
    /// infinity.
    #[must_use]
    pub fn pixels_to_tiles(&self, pixels: i32) -> i32 {
        pixels >> self.tile_size_bits
    }

    /// Converts a tile measure to pixels.
    #[must_use]
    pub fn tiles_to_pixels(&self, tiles: i32) -> i32 {
        tiles << self.tile_size_bits
    }

    /// Whether the tile coordinates fall inside the map.
    #[must_use]
    pub fn contains(&self, tile_x: i32, tile_y: i32) -> bool {
        tile_y >= 0
            && tile_y < self.height_tiles()
            && tile_x >= 0
            && tile_x < self.width_tiles()
    }

    /// Map symbol at the provided tile coordinates.
    #[must_use]
    pub fn symbol_at(&self, tile_x: i32, tile_y: i32) -> Option<char> {
        if !self.contains(tile_x, tile_y) {
            return None;
        }
        let slot = self.map[tile_y as usize][tile_x as usize];
        Some(self.tiles[slot].symbol)
    }

    /// Walks tile by tile from `origin` along `direction`'s displacement,
    /// looking for the nearest tile with the provided symbol.
    ///
    /// The search covers at most `ceil(max_tiles)` steps and stops the
    /// moment it leaves the map, so a sprite near an edge simply finds
    /// nothing in that direction. The returned point is the matching
    /// tile's top-left corner in pixels.
    #[must_use]
    pub fn find_tile(
        &self,
        origin: PixelPoint,
        direction: &Command,
        symbol: char,
        max_tiles: f32,
    ) -> Option<PixelPoint> {
        let mut tile_x = self.pixels_to_tiles(origin.x());
        let mut tile_y = self.pixels_to_tiles(origin.y());
        let steps = max_tiles.ceil() as i32;
        for _ in 0..steps {
            tile_x += direction.grid_dx();
            tile_y += direction.grid_dy();
            match self.symbol_at(tile_x, tile_y) {
                None => return None,
                Some(found) if found == symbol => {
                    return Some(PixelPoint::new(
                        self.tiles_to_pixels(tile_x),
                        self.tiles_to_pixels(tile_y),
                    ));
                }
                Some(_) => {}
            }
        }
        None
    }

    fn art_at(&self, tile_x: i32, tile_y: i32) -> Option<TileArt> {
        if !self.contains(tile_x, tile_y) {
            return None;
        }
        let slot = self.map[tile_y as usize][tile_x as usize];
        Some(self.tiles[slot].art)
    }
}

const COMMENT_PREFIX: &str = "==";
const SPRITE_PREFIX: &str = "sprite:";

/// The authoritative simulation state for one loaded level.
pub struct Level {
    grid: TileGrid,
    sprites: Vec<Sprite>,
    distances: Vec<Vec<u32>>,
    observations: Vec<SpriteObservation>,
    pair_interactions: Vec<Box<dyn PairInteraction>>,
}

impl Level {
    /// Builds a level from map lines.
    ///
    /// Three line forms are recognized: `<symbol>:<path>` introduces a
    /// tile type, `sprite:<path>` places a sprite at its descriptor's
    /// starting position, and lines opening with `==` are comments. Every
    /// other non-empty line is a map row of tile symbols. Sprites receive
    /// dense identifiers in declaration order.
    pub fn load(
        lines: &[&str],
        catalog: &dyn AssetCatalog,
        behaviors: &dyn BehaviorSource,
        interactions: &dyn InteractionSource,
        pair_interactions: Vec<Box<dyn PairInteraction>>,
        base_commands: &CommandSet,
    ) -> Result<Self, LevelError> {
        let mut tiles: Vec<Tile> = Vec::new();
        let mut symbols: Vec<char> = Vec::new();
        let mut sprite_entries: Vec<String> = Vec::new();
        let mut rows: Vec<&str> = Vec::new();

        for line in lines {
            let line = line.trim_end();
            if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
                continue;
            }
            if let Some(path) = line.strip_prefix(SPRITE_PREFIX) {
                if path.is_empty() {
                    return Err(LevelError::MalformedSpriteLine {
                        line: line.to_owned(),
                    });
                }
                sprite_entries.push(path.to_owned());
            } else if line.chars().nth(1) == Some(':') {
                let mut chars = line.chars();
                let symbol = chars.next().unwrap_or_default();
                let _ = chars.next();
                let path: String = chars.collect();
                let art = catalog.tile_art(&path)?;
                tiles.push(Tile { symbol, art });
                symbols.push(symbol);
            } else {
                rows.push(line);
            }
        }

        let mut map: Vec<Vec<usize>> = Vec::with_capacity(rows.len());
        let width = rows.first().map_or(0, |row| row.chars().count());
        for (index, row) in rows.iter().enumerate() {
            let mut slots = Vec::with_capacity(width);
            for symbol in row.chars() {
                let slot = symbols
                    .iter()
                    .position(|s| *s == symbol)
                    .ok_or(LevelError::UnknownTileSymbol { symbol })?;
                slots.push(slot);
            }
            if slots.len() != width {
                return Err(LevelError::RaggedMap { row: index });
            }
            map.push(slots);
        }

        let grid = TileGrid::new(tiles, map)?;

        let mut sprites = Vec::with_capacity(sprite_entries.len());
        for (index, path) in sprite_entries.iter().enumerate() {
            let entries = catalog.sprite_descriptor(path)?;
            let sprite = Sprite::from_descriptor(
                SpriteId::new(index as u32),
                path,
                &entries,
                catalog,
                behaviors,
                interactions,
                base_commands,
            )?;
            sprites.push(sprite);
        }

        let count = sprites.len();
        let observations = sprites.iter().map(Sprite::observe).collect();
        Ok(Self {
            grid,
            sprites,
            distances: vec![vec![0; count]; count],
            observations,
            pair_interactions,
        })
    }

    /// The level's tile grid.
    #[must_use]
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Number of sprites in the level.
    #[must_use]
    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }
}

/// Runs one complete tick at `now`.
///
/// Queued input events are drained and broadcast to every sprite in
/// arrival order; with no input, every sprite receives an idle tick
/// instead. The tile distance matrix and observation snapshots are then
/// refreshed from the post-movement positions, pairwise interactions
/// resolve for in-range role pairs, unilateral interactions run per
/// sprite, and finally one draw request per sprite lands on the draw
/// channel.
pub fn step(
    level: &mut Level,
    inputs: &mut InputQueue,
    now: GameTime,
    draws: &mut DrawQueue,
) -> Result<(), StepError> {
    if inputs.is_empty() {
        for sprite in &mut level.sprites {
            sprite.process_game_tick(now, &level.grid);
        }
    } else {
        while let Some(event) = inputs.pop() {
            for sprite in &mut level.sprites {
                sprite.process_message(event, now, &level.grid);
            }
        }
    }

    refresh_proximity(level);

    let count = level.sprites.len();
    for interaction in &level.pair_interactions {
        let [role_a, role_b] = interaction.interacting_roles();
        for i in 0..count {
            for j in (i + 1)..count {
                let forward =
                    level.sprites[i].has_role(role_a) && level.sprites[j].has_role(role_b);
                let reverse =
                    level.sprites[i].has_role(role_b) && level.sprites[j].has_role(role_a);
                if !forward && !reverse {
                    continue;
                }
                if level.distances[i][j] > interaction.interaction_distance() {
                    continue;
                }
                let (head, tail) = level.sprites.split_at_mut(j);
                interaction.interact(
                    head[i].pair_participant(),
                    tail[0].pair_participant(),
                    now,
                );
            }
        }
    }

    for (index, sprite) in level.sprites.iter_mut().enumerate() {
        sprite.run_interactions(&level.observations, &level.distances[index], now);
    }

    for sprite in &level.sprites {
        sprite.queue_draw(draws, now)?;
    }
    Ok(())
}

/// Recomputes the all-pairs tile distance matrix and the observation
/// snapshots from current positions. Distances are the ceiling of the
/// pixel distance converted to tiles; the matrix stays symmetric with a
/// zero diagonal.
fn refresh_proximity(level: &mut Level) {
    let count = level.sprites.len();
    for i in 0..count {
        level.distances[i][i] = 0;
        for j in (i + 1)..count {
            let pixels = distance(
                level.sprites[i].state().current(),
                level.sprites[j].state().current(),
            );
            let tiles = level.grid.pixels_to_tiles(pixels.ceil() as i32).max(0) as u32;
            level.distances[i][j] = tiles;
            level.distances[j][i] = tiles;
        }
    }
    level.observations.clear();
    level
        .observations
        .extend(level.sprites.iter().map(Sprite::observe));
}

/// Read-only views over a level for drivers, renderers and tests.
pub mod query {
    use super::Level;
    use pondlife_core::{DrawRequest, SpriteId, SpriteObservation, SpriteState};

    /// Top-left corner of the visible map region in pixels.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Viewport {
        /// Horizontal offset into the map.
        pub x: i32,
        /// Vertical offset into the map.
        pub y: i32,
    }

    /// Kinematic state of one sprite, if the identifier is valid.
    #[must_use]
    pub fn sprite_state(level: &Level, id: SpriteId) -> Option<&SpriteState> {
        level.sprites.get(id.index()).map(super::Sprite::state)
    }

    /// The observation snapshots taken during the most recent tick.
    #[must_use]
    pub fn observations(level: &Level) -> &[SpriteObservation] {
        &level.observations
    }

    /// Identifier of the first sprite carrying the provided role tag.
    #[must_use]
    pub fn find_role(level: &Level, role: &str) -> Option<SpriteId> {
        level
            .sprites
            .iter()
            .find(|sprite| sprite.has_role(role))
            .map(super::Sprite::id)
    }

    /// One sprite's row of the tile distance matrix, in sprite order.
    #[must_use]
    pub fn distances(level: &Level, id: SpriteId) -> Option<&[u32]> {
        level.distances.get(id.index()).map(Vec::as_slice)
    }

    /// Viewport that keeps the anchor sprite centred while never showing
    /// territory beyond the map edges. A screen larger than the map pins
    /// the viewport to the origin.
    #[must_use]
    pub fn viewport(
        level: &Level,
        anchor: SpriteId,
        screen_width: i32,
        screen_height: i32,
    ) -> Viewport {
        let grid = level.grid();
        let map_width = grid.tiles_to_pixels(grid.width_tiles());
        let map_height = grid.tiles_to_pixels(grid.height_tiles());
        let centre = sprite_state(level, anchor)
            .map(SpriteState::current)
            .unwrap_or_default();
        let x = (centre.x() - screen_width / 2).clamp(0, (map_width - screen_width).max(0));
        let y = (centre.y() - screen_height / 2).clamp(0, (map_height - screen_height).max(0));
        Viewport { x, y }
    }

    /// Draw requests for every tile intersecting the viewport, in
    /// row-major order at absolute map positions.
    #[must_use]
    pub fn visible_tiles(
        level: &Level,
        viewport: Viewport,
        screen_width: i32,
        screen_height: i32,
    ) -> Vec<DrawRequest> {
        let grid = level.grid();
        let first_x = grid.pixels_to_tiles(viewport.x).max(0);
        let first_y = grid.pixels_to_tiles(viewport.y).max(0);
        let last_x = grid
            .pixels_to_tiles(viewport.x + screen_width - 1)
            .min(grid.width_tiles() - 1);
        let last_y = grid
            .pixels_to_tiles(viewport.y + screen_height - 1)
            .min(grid.height_tiles() - 1);

        let mut requests = Vec::new();
        for tile_y in first_y..=last_y {
            for tile_x in first_x..=last_x {
                if let Some(art) = grid.art_at(tile_x, tile_y) {
                    requests.push(DrawRequest {
                        frame: art.handle,
                        x: grid.tiles_to_pixels(tile_x),
                        y: grid.tiles_to_pixels(tile_y),
                    });
                }
            }
        }
        requests
    }
}

#[cfg(test)]
mod tests {
    use super::{LevelError, Tile, TileArt, TileGrid};
    use pondlife_core::{Command, FrameHandle, PixelPoint};

    fn tile(symbol: char, handle: u32, size: u32) -> Tile {
        Tile {
            symbol,
            art: TileArt {
                handle: FrameHandle::new(handle),
                size,
            },
        }
    }

    fn water_and_grass() -> TileGrid {
        // 4x3 map, 16px tiles: a water column at x = 2.
        let tiles = vec![tile('G', 0, 16), tile('W', 1, 16)];
        let map = vec![
            vec![0, 0, 1, 0],
            vec![0, 0, 1, 0],
            vec![0, 0, 1, 0],
        ];
        TileGrid::new(tiles, map).expect("grid")
    }

    fn right() -> Command {
        Command::new("RIGHT", 1, 0, false, None)
    }

    #[test]
    fn shift_conversion_rounds_toward_negative_infinity() {
        let grid = water_and_grass();
        assert_eq!(grid.pixels_to_tiles(0), 0);
        assert_eq!(grid.pixels_to_tiles(15), 0);
        assert_eq!(grid.pixels_to_tiles(16), 1);
        assert_eq!(grid.pixels_to_tiles(-1), -1);
        assert_eq!(grid.tiles_to_pixels(3), 48);
    }

    #[test]
    fn rejects_grids_without_tiles() {
        assert!(matches!(
            TileGrid::new(Vec::new(), Vec::new()),
            Err(LevelError::NoTiles)
        ));
    }

    #[test]
    fn rejects_mixed_tile_sizes() {
        let result = TileGrid::new(vec![tile('G', 0, 16), tile('W', 1, 32)], Vec::new());
        assert!(matches!(
            result,
            Err(LevelError::MismatchedTileSizes {
                symbol: 'W',
                size: 32,
                expected: 16,
            })
        ));
    }

    #[test]
    fn rejects_non_power_of_two_tile_sizes() {
        let result = TileGrid::new(vec![tile('G', 0, 24)], Vec::new());
        assert!(matches!(
            result,
            Err(LevelError::TileSizeNotPowerOfTwo { size: 24 })
        ));
    }

    #[test]
    fn find_tile_reports_the_nearest_match_in_pixels() {
        let grid = water_and_grass();
        let found = grid.find_tile(PixelPoint::new(0, 16), &right(), 'W', 5.0);
        assert_eq!(found, Some(PixelPoint::new(32, 16)));
    }

    #[test]
    fn find_tile_respects_the_step_budget() {
        let grid = water_and_grass();
        let found = grid.find_tile(PixelPoint::new(0, 16), &right(), 'W', 1.0);
        assert_eq!(found, None);
        let found = grid.find_tile(PixelPoint::new(0, 16), &right(), 'W', 1.5);
        assert_eq!(found, Some(PixelPoint::new(32, 16)));
    }

    #[test]
    fn find_tile_stops_at_the_map_edge() {
        let grid = water_and_grass();
        let left = Command::new("LEFT", -1, 0, false, None);
        assert_eq!(grid.find_tile(PixelPoint::new(0, 0), &left, 'W', 10.0), None);
    }
}
