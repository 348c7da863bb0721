//! Grid geometry and the immutable tile model.
//!
//! A room is a rectangular grid of [`Tile`]s addressed by integer
//! coordinates. Tiles are immutable once the room is loaded; everything that
//! moves (actors, loot) is layered on top by [`crate::room::Room`].
//!
//! Coordinate convention follows the map files: `x` grows to the right,
//! `y` grows downward, so [`Direction::North`] is `(0, -1)`.

mod crown_ring;

pub use crown_ring::crown;

use std::fmt;

/// Discrete grid position expressed in tile coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset `other - self` as a raw vector.
    pub fn offset_to(self, other: Position) -> (i32, i32) {
        (other.x - self.x, other.y - self.y)
    }

    /// Straight-line distance to `other` in grid units.
    pub fn euclid_units(self, other: Position) -> f32 {
        let (dx, dy) = self.offset_to(other);
        ((dx * dx + dy * dy) as f32).sqrt()
    }

    /// Chebyshev ring radius relative to `other`.
    pub fn ring_radius(self, other: Position) -> i32 {
        let (dx, dy) = self.offset_to(other);
        dx.abs().max(dy.abs())
    }

    pub fn step(self, direction: Direction) -> Position {
        let (dx, dy) = direction.delta();
        Position::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Rectangular grid extent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct MapDimensions {
    pub width: u32,
    pub height: u32,
}

impl MapDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.x < self.width as i32
            && position.y < self.height as i32
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// The eight compass bearings used for facing, movement, and perception.
///
/// `angle_deg` is measured from north, increasing clockwise, so east is 90.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[derive(strum::Display, strum::EnumString, strum::AsRefStr)]
#[derive(serde::Serialize, serde::Deserialize)]
#[strum(ascii_case_insensitive)]
pub enum Direction {
    #[strum(serialize = "north", serialize = "n")]
    North,
    #[strum(serialize = "northeast", serialize = "ne")]
    NorthEast,
    #[strum(serialize = "east", serialize = "e")]
    East,
    #[strum(serialize = "southeast", serialize = "se")]
    SouthEast,
    #[strum(serialize = "south", serialize = "s")]
    South,
    #[strum(serialize = "southwest", serialize = "sw")]
    SouthWest,
    #[strum(serialize = "west", serialize = "w")]
    West,
    #[strum(serialize = "northwest", serialize = "nw")]
    NorthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Unit step on the grid; north is up (negative y).
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
        }
    }

    /// Bearing angle in degrees, north = 0, clockwise.
    pub fn angle_deg(self) -> f32 {
        match self {
            Direction::North => 0.0,
            Direction::NorthEast => 45.0,
            Direction::East => 90.0,
            Direction::SouthEast => 135.0,
            Direction::South => 180.0,
            Direction::SouthWest => 225.0,
            Direction::West => 270.0,
            Direction::NorthWest => 315.0,
        }
    }

    /// Snaps an arbitrary grid vector to the nearest 45-degree bearing.
    ///
    /// Returns `None` for the zero vector, which has no bearing.
    pub fn from_offset(dx: i32, dy: i32) -> Option<Direction> {
        if dx == 0 && dy == 0 {
            return None;
        }
        // Angle from north, clockwise: x is east, -y is north.
        let angle = (dx as f64).atan2(-(dy as f64)).to_degrees();
        let angle = if angle < 0.0 { angle + 360.0 } else { angle };
        let bin = (angle / 45.0).round() as usize % 8;
        Some(Direction::ALL[bin])
    }
}

/// Immutable per-load description of one tile of terrain.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Tile {
    /// Theme symbol this tile was built from.
    pub symbol: char,
    /// Movement cost multiplier; [`Tile::IMPASSABLE`] marks a tile that can
    /// never be entered.
    pub difficulty: f32,
    /// Height of whatever stands on the tile (wall, tree, crate), in meters.
    pub obstacle_height: f32,
    /// Height an actor must clear to cross the tile by climbing, in meters.
    pub climb_height: f32,
    /// Base terrain elevation, in meters.
    pub elevation: f32,
    /// Fractional visibility lost per meter of fog/smoke on this tile.
    pub opacity: f32,
    /// Short label used in perception reports ("wall", "ravine").
    pub description: String,
}

impl Tile {
    /// Difficulty sentinel for tiles that can never be entered.
    pub const IMPASSABLE: f32 = f32::INFINITY;

    /// Open floor with no obstacle, unit difficulty, no fog.
    pub fn floor(symbol: char, description: impl Into<String>) -> Self {
        Self {
            symbol,
            difficulty: 1.0,
            obstacle_height: 0.0,
            climb_height: 0.0,
            elevation: 0.0,
            opacity: 0.0,
            description: description.into(),
        }
    }

    pub fn is_passable(&self) -> bool {
        self.difficulty.is_finite()
    }

    /// Top-of-surface height: terrain elevation plus obstacle.
    pub fn surface_height(&self) -> f32 {
        self.elevation + self.obstacle_height
    }
}

/// Errors for grid construction and checked coordinate access.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum GridError {
    #[error("position {0} is outside the {1}x{2} grid")]
    OutOfBounds(Position, u32, u32),

    #[error("tile row {row} has {got} tiles, expected {expected}")]
    RaggedRow { row: usize, got: usize, expected: usize },
}

/// Row-major storage for all tiles of one room.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct TileMap {
    dimensions: MapDimensions,
    tiles: Vec<Tile>,
}

impl TileMap {
    /// Builds a map from rows of tiles. Every row must have the same width.
    pub fn from_rows(rows: Vec<Vec<Tile>>) -> Result<Self, GridError> {
        let height = rows.len() as u32;
        let width = rows.first().map(|r| r.len()).unwrap_or(0) as u32;
        let mut tiles = Vec::with_capacity((width * height) as usize);
        for (row, cells) in rows.into_iter().enumerate() {
            if cells.len() != width as usize {
                return Err(GridError::RaggedRow {
                    row,
                    got: cells.len(),
                    expected: width as usize,
                });
            }
            tiles.extend(cells);
        }
        Ok(Self {
            dimensions: MapDimensions::new(width, height),
            tiles,
        })
    }

    /// Fills a whole map with copies of one tile. Test and tooling helper.
    pub fn filled(width: u32, height: u32, tile: Tile) -> Self {
        Self {
            dimensions: MapDimensions::new(width, height),
            tiles: vec![tile; (width * height) as usize],
        }
    }

    pub fn dimensions(&self) -> MapDimensions {
        self.dimensions
    }

    pub fn contains(&self, position: Position) -> bool {
        self.dimensions.contains(position)
    }

    pub fn tile(&self, position: Position) -> Option<&Tile> {
        if !self.contains(position) {
            return None;
        }
        let idx = position.y as usize * self.dimensions.width as usize + position.x as usize;
        self.tiles.get(idx)
    }

    /// Checked lookup for callers that must never go out of bounds.
    pub fn tile_checked(&self, position: Position) -> Result<&Tile, GridError> {
        self.tile(position).ok_or(GridError::OutOfBounds(
            position,
            self.dimensions.width,
            self.dimensions.height,
        ))
    }

    /// Mutable access for room-load tooling (gate markers stamp symbols).
    pub fn tile_mut(&mut self, position: Position) -> Option<&mut Tile> {
        if !self.contains(position) {
            return None;
        }
        let idx = position.y as usize * self.dimensions.width as usize + position.x as usize;
        self.tiles.get_mut(idx)
    }

    /// Bare terrain symbols, one `String` per row, without entity overlays.
    pub fn symbol_grid(&self) -> Vec<String> {
        (0..self.dimensions.height as i32)
            .map(|y| {
                (0..self.dimensions.width as i32)
                    .map(|x| {
                        self.tile(Position::new(x, y))
                            .map(|t| t.symbol)
                            .unwrap_or(' ')
                    })
                    .collect()
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, &Tile)> {
        let width = self.dimensions.width as i32;
        self.tiles.iter().enumerate().map(move |(i, tile)| {
            let x = i as i32 % width;
            let y = i as i32 / width;
            (Position::new(x, y), tile)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn direction_round_trips_through_strings() {
        for dir in Direction::ALL {
            let text = dir.to_string();
            assert_eq!(Direction::from_str(&text).unwrap(), dir);
        }
        // Short compass codes from map files parse too.
        assert_eq!(Direction::from_str("NE").unwrap(), Direction::NorthEast);
        assert_eq!(Direction::from_str("s").unwrap(), Direction::South);
    }

    #[test]
    fn from_offset_snaps_to_nearest_bearing() {
        assert_eq!(Direction::from_offset(0, -3), Some(Direction::North));
        assert_eq!(Direction::from_offset(5, 0), Some(Direction::East));
        assert_eq!(Direction::from_offset(4, 4), Some(Direction::SouthEast));
        // 5 east, 1 south is still east once snapped to 45-degree bins.
        assert_eq!(Direction::from_offset(5, 1), Some(Direction::East));
        assert_eq!(Direction::from_offset(-1, -5), Some(Direction::North));
        assert_eq!(Direction::from_offset(0, 0), None);
    }

    #[test]
    fn steps_move_one_tile() {
        let p = Position::new(3, 3);
        assert_eq!(p.step(Direction::North), Position::new(3, 2));
        assert_eq!(p.step(Direction::SouthWest), Position::new(2, 4));
    }

    #[test]
    fn tilemap_rejects_ragged_rows() {
        let rows = vec![
            vec![Tile::floor(' ', "floor"), Tile::floor(' ', "floor")],
            vec![Tile::floor(' ', "floor")],
        ];
        assert!(matches!(
            TileMap::from_rows(rows),
            Err(GridError::RaggedRow { row: 1, .. })
        ));
    }

    #[test]
    fn out_of_bounds_lookup_is_none() {
        let map = TileMap::filled(4, 3, Tile::floor(' ', "floor"));
        assert!(map.tile(Position::new(3, 2)).is_some());
        assert!(map.tile(Position::new(4, 0)).is_none());
        assert!(map.tile(Position::new(0, -1)).is_none());
        assert!(map.tile_checked(Position::new(9, 9)).is_err());
    }
}
