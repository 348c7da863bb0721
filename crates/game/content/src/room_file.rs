//! Room map files: an ASCII grid plus entity placements.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use skirmish_core::{
    Actor, CharacterSheet, ControlMode, Direction, Loot, Position, Room, SheetLibrary, Tile,
    TileMap,
};

use crate::{ContentError, Theme};

/// `ascii_map` is written either as one block string or as a list of rows.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum AsciiMap {
    Block(String),
    Lines(Vec<String>),
}

impl AsciiMap {
    fn lines(&self) -> Vec<&str> {
        match self {
            AsciiMap::Block(text) => text.lines().collect(),
            AsciiMap::Lines(lines) => lines.iter().map(String::as_str).collect(),
        }
    }
}

/// One actor entry in a room file.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct ActorPlacement {
    pub position: (i32, i32),
    #[serde(default = "default_facing")]
    pub facing: String,
    #[serde(default = "default_actor_symbol")]
    pub symbol: char,
    #[serde(default = "default_height")]
    pub height_m: f32,
    #[serde(default)]
    pub control: ControlMode,
}

fn default_facing() -> String {
    "n".to_string()
}

fn default_actor_symbol() -> char {
    '@'
}

fn default_height() -> f32 {
    1.7
}

/// One loot entry in a room file.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct LootPlacement {
    pub position: (i32, i32),
    #[serde(default = "default_loot_symbol")]
    pub symbol: char,
    #[serde(default = "default_loot_height")]
    pub height_m: f32,
    #[serde(default = "default_loot_weight")]
    pub weight_kg: f32,
}

fn default_loot_symbol() -> char {
    'l'
}

fn default_loot_height() -> f32 {
    0.5
}

fn default_loot_weight() -> f32 {
    1.0
}

/// Parsed room definition, not yet bound to a theme.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct RoomFile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub theme: String,
    pub ascii_map: AsciiMap,
    #[serde(default)]
    pub actors: BTreeMap<String, ActorPlacement>,
    #[serde(default)]
    pub loots: BTreeMap<String, LootPlacement>,
}

impl RoomFile {
    /// Builds only the terrain: tiles through the theme's symbol table,
    /// no entities. Used when a snapshot re-seeds the live dictionaries.
    pub fn build_terrain(&self, theme: &Theme) -> Result<Room, ContentError> {
        let lines = self.ascii_map.lines();
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);

        let mut rows: Vec<Vec<Tile>> = Vec::with_capacity(lines.len());
        for line in &lines {
            let mut row: Vec<Tile> = Vec::with_capacity(width);
            for symbol in line.chars() {
                row.push(theme.tile_for(symbol)?);
            }
            while row.len() < width {
                row.push(theme.tile_for(' ')?);
            }
            rows.push(row);
        }

        let map = TileMap::from_rows(rows).map_err(|source| ContentError::Map {
            room: self.name.clone(),
            source,
        })?;
        Ok(Room::new(self.name.clone(), self.description.clone(), map))
    }

    /// Builds the live room: terrain, then actors (sheets taken from the
    /// library, default commoners when absent) and loot placed under the
    /// room's invariants.
    pub fn build(&self, theme: &Theme, sheets: &SheetLibrary) -> Result<Room, ContentError> {
        let mut room = self.build_terrain(theme)?;

        for (name, placement) in &self.actors {
            let facing = Direction::from_str(&placement.facing).map_err(|_| {
                ContentError::BadFacing {
                    room: self.name.clone(),
                    name: name.clone(),
                    facing: placement.facing.clone(),
                }
            })?;
            let sheet = sheets
                .get(name)
                .cloned()
                .unwrap_or_else(|| CharacterSheet::named(name.clone()));
            let (x, y) = placement.position;
            let mut actor = Actor::new(sheet, placement.symbol, Position::new(x, y))
                .with_facing(facing)
                .with_control(placement.control);
            actor.name = name.clone();
            actor.height_m = placement.height_m;
            room.add_actor(actor).map_err(|source| ContentError::Placement {
                room: self.name.clone(),
                name: name.clone(),
                source,
            })?;
        }

        for (name, placement) in &self.loots {
            let (x, y) = placement.position;
            let loot = Loot {
                name: name.clone(),
                symbol: placement.symbol,
                position: Position::new(x, y),
                height_m: placement.height_m,
                weight_kg: placement.weight_kg,
            };
            room.add_loot(loot).map_err(|source| ContentError::Placement {
                room: self.name.clone(),
                name: name.clone(),
                source,
            })?;
        }

        Ok(room)
    }
}

/// Loads a room file (without binding it to a theme yet).
pub fn load_room(path: &Path) -> Result<RoomFile, ContentError> {
    crate::read_yaml(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const THEME: &str = r#"
name: forest
tiles:
  " ":
    name: floor
    description: grass
  "W":
    name: wall
    description: a wall
    traversable: false
    obstacle_height: 3.0
"#;

    const ROOM: &str = r#"
name: clearing
description: an open clearing in the woods
theme: forest
ascii_map: |
  WWWWW
  W   W
  W   W
  WWWWW
actors:
  liora:
    position: [1, 1]
    facing: se
    control: manual
loots:
  coin:
    position: [3, 2]
    weight_kg: 0.1
"#;

    fn theme() -> Theme {
        serde_yaml::from_str(THEME).unwrap()
    }

    #[test]
    fn builds_tiles_actors_and_loot() {
        let file: RoomFile = serde_yaml::from_str(ROOM).unwrap();
        let room = file.build(&theme(), &SheetLibrary::new()).unwrap();

        assert_eq!(room.name(), "clearing");
        assert_eq!(room.map().dimensions().width, 5);
        assert_eq!(room.map().dimensions().height, 4);
        assert!(!room.map().tile(Position::new(0, 0)).unwrap().is_passable());
        assert!(room.map().tile(Position::new(2, 2)).unwrap().is_passable());

        let liora = room.actor("liora").unwrap();
        assert_eq!(liora.position, Position::new(1, 1));
        assert_eq!(liora.facing, Direction::SouthEast);
        assert_eq!(liora.control, ControlMode::Manual);

        let coin = room.loot("coin").unwrap();
        assert_eq!(coin.position, Position::new(3, 2));
    }

    #[test]
    fn library_sheets_are_bound_by_actor_name() {
        let file: RoomFile = serde_yaml::from_str(ROOM).unwrap();
        let mut sheets = SheetLibrary::new();
        let mut liora = CharacterSheet::named("liora");
        liora.level = 3;
        liora.class = "ranger".to_string();
        sheets.insert("liora".to_string(), liora);

        let room = file.build(&theme(), &sheets).unwrap();
        assert_eq!(room.actor("liora").unwrap().sheet.level, 3);
        assert_eq!(room.actor("liora").unwrap().sheet.class, "ranger");
    }

    #[test]
    fn placing_an_actor_in_a_wall_fails() {
        let bad = r#"
name: clearing
theme: forest
ascii_map: |
  WWW
  W W
  WWW
actors:
  liora:
    position: [0, 0]
"#;
        let file: RoomFile = serde_yaml::from_str(bad).unwrap();
        assert!(matches!(
            file.build(&theme(), &SheetLibrary::new()),
            Err(ContentError::Placement { .. })
        ));
    }

    #[test]
    fn list_form_maps_parse_like_blocks() {
        let listed = r#"
name: strip
theme: forest
ascii_map:
  - "W W"
  - "W W"
"#;
        let file: RoomFile = serde_yaml::from_str(listed).unwrap();
        let room = file.build(&theme(), &SheetLibrary::new()).unwrap();
        assert_eq!(room.map().dimensions().width, 3);
        assert_eq!(room.map().dimensions().height, 2);
    }

    #[test]
    fn short_rows_are_padded_with_floor() {
        let ragged = r#"
name: ragged
theme: forest
ascii_map: |
  WWWWW
  W
"#;
        let file: RoomFile = serde_yaml::from_str(ragged).unwrap();
        let room = file.build(&theme(), &SheetLibrary::new()).unwrap();
        assert!(room.map().tile(Position::new(4, 1)).unwrap().is_passable());
    }

    #[test]
    fn bad_facing_is_reported() {
        let bad = r#"
name: clearing
theme: forest
ascii_map: "   "
actors:
  liora:
    position: [0, 0]
    facing: up
"#;
        let file: RoomFile = serde_yaml::from_str(bad).unwrap();
        assert!(matches!(
            file.build(&theme(), &SheetLibrary::new()),
            Err(ContentError::BadFacing { .. })
        ));
    }
}
