//! Themes: the symbol → tile-spec table applied to room maps.

use std::collections::HashMap;
use std::path::Path;

use skirmish_core::Tile;

use crate::ContentError;

/// Per-symbol terrain definition.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct TileSpec {
    pub name: String,
    /// Short label used in perception reports.
    pub description: String,
    #[serde(default)]
    pub long_description: Option<String>,
    /// Whether actors can enter the tile at all.
    #[serde(default = "default_traversable")]
    pub traversable: bool,
    /// Movement cost multiplier for traversable tiles.
    #[serde(default = "default_difficulty")]
    pub difficulty: f32,
    #[serde(default)]
    pub obstacle_height: f32,
    #[serde(default)]
    pub climb_height: f32,
    #[serde(default)]
    pub elevation: f32,
    #[serde(default)]
    pub opacity: f32,
    #[serde(default)]
    pub color: Option<String>,
}

fn default_traversable() -> bool {
    true
}

fn default_difficulty() -> f32 {
    1.0
}

impl TileSpec {
    /// Materializes the spec into a tile carrying its source symbol.
    pub fn to_tile(&self, symbol: char) -> Tile {
        Tile {
            symbol,
            difficulty: if self.traversable {
                self.difficulty
            } else {
                Tile::IMPASSABLE
            },
            obstacle_height: self.obstacle_height,
            climb_height: self.climb_height,
            elevation: self.elevation,
            opacity: self.opacity,
            description: self.description.clone(),
        }
    }
}

/// A named set of tile specs plus ambience metadata.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Theme {
    pub name: String,
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default = "default_lighting")]
    pub default_lighting: f32,
    pub tiles: HashMap<char, TileSpec>,
}

fn default_environment() -> String {
    "outdoor".to_string()
}

fn default_lighting() -> f32 {
    1.0
}

impl Theme {
    pub fn spec(&self, symbol: char) -> Option<&TileSpec> {
        self.tiles.get(&symbol)
    }

    /// Resolves a map symbol to a tile. Unknown symbols fall back to the
    /// theme's floor entry with a warning; a theme without a floor entry
    /// is unusable.
    pub fn tile_for(&self, symbol: char) -> Result<Tile, ContentError> {
        if let Some(spec) = self.tiles.get(&symbol) {
            return Ok(spec.to_tile(symbol));
        }
        tracing::warn!(
            theme = %self.name,
            symbol = %symbol,
            "symbol not in theme, interpreted as floor"
        );
        let floor = self
            .tiles
            .get(&' ')
            .ok_or_else(|| ContentError::MissingFloor(self.name.clone()))?;
        Ok(floor.to_tile(symbol))
    }
}

/// Loads a theme file.
pub fn load_theme(path: &Path) -> Result<Theme, ContentError> {
    crate::read_yaml(path)
}
