//! A live room: immutable terrain plus the mutable entity dictionaries.
//!
//! The room is constructed from a map definition at room-entry time and
//! discarded wholesale when the party moves on; actors are transplanted,
//! tiles are not. Derived elevation/opacity fields are rebuilt here so
//! visibility queries never recompute them per call.

use std::collections::BTreeMap;

use crate::actor::{Actor, Loot};
use crate::config::GameConfig;
use crate::gate::GateMarker;
use crate::grid::{Position, TileMap};
use crate::path::Path;
use crate::vision::{
    ElevationField, OpacityField, Visibility, compute_occlusion, compute_transparency,
};

/// Entity bookkeeping failures surfaced to the caller as narrative or
/// propagated as bugs, depending on the operation.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum RoomError {
    #[error("actor '{0}' is already in the room")]
    DuplicateActor(String),

    #[error("loot '{0}' is already in the room")]
    DuplicateLoot(String),

    #[error("no actor named '{0}' in the room")]
    UnknownActor(String),

    #[error("no loot named '{0}' in the room")]
    UnknownLoot(String),

    #[error("no gate named '{0}' in the room")]
    UnknownGate(String),

    #[error("tile {0} does not exist in the room")]
    NoSuchTile(Position),

    #[error("tile {0} cannot be entered")]
    Impassable(Position),

    #[error("tile {0} is already occupied")]
    Occupied(Position),
}

/// One map instance with its live actors, loot, and gate faces.
pub struct Room {
    name: String,
    description: String,
    map: TileMap,
    elevation: ElevationField,
    opacity: OpacityField,
    actors: BTreeMap<String, Actor>,
    loots: BTreeMap<String, Loot>,
    gate_markers: BTreeMap<String, GateMarker>,
}

impl Room {
    pub fn new(name: impl Into<String>, description: impl Into<String>, map: TileMap) -> Self {
        let elevation = ElevationField::from_map(&map);
        let opacity = OpacityField::from_map(&map);
        Self {
            name: name.into(),
            description: description.into(),
            map,
            elevation,
            opacity,
            actors: BTreeMap::new(),
            loots: BTreeMap::new(),
            gate_markers: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn map(&self) -> &TileMap {
        &self.map
    }

    pub fn elevation(&self) -> &ElevationField {
        &self.elevation
    }

    pub fn opacity(&self) -> &OpacityField {
        &self.opacity
    }

    // ------------------------------------------------------------------
    // Actors
    // ------------------------------------------------------------------

    /// Places an actor, enforcing the room invariants: unique name, an
    /// existing passable tile, at most one actor per tile.
    pub fn add_actor(&mut self, actor: Actor) -> Result<(), RoomError> {
        if self.actors.contains_key(&actor.name) {
            return Err(RoomError::DuplicateActor(actor.name));
        }
        let tile = self
            .map
            .tile(actor.position)
            .ok_or(RoomError::NoSuchTile(actor.position))?;
        if !tile.is_passable() {
            return Err(RoomError::Impassable(actor.position));
        }
        if self.occupant_of(actor.position).is_some() {
            return Err(RoomError::Occupied(actor.position));
        }
        self.actors.insert(actor.name.clone(), actor);
        Ok(())
    }

    /// Removes and returns an actor, for transplant through a gate.
    pub fn remove_actor(&mut self, name: &str) -> Result<Actor, RoomError> {
        self.actors
            .remove(name)
            .ok_or_else(|| RoomError::UnknownActor(name.to_string()))
    }

    pub fn actor(&self, name: &str) -> Option<&Actor> {
        self.actors.get(name)
    }

    pub fn actor_mut(&mut self, name: &str) -> Option<&mut Actor> {
        self.actors.get_mut(name)
    }

    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values()
    }

    pub fn actor_names(&self) -> Vec<String> {
        self.actors.keys().cloned().collect()
    }

    /// The actor standing on `position`, if any.
    pub fn occupant_of(&self, position: Position) -> Option<&Actor> {
        self.actors.values().find(|a| a.position == position)
    }

    /// Occupancy test excluding one actor (the one that is moving).
    pub fn is_occupied_by_other(&self, position: Position, moving: &str) -> bool {
        self.actors
            .values()
            .any(|a| a.position == position && a.name != moving)
    }

    /// Applies a walked path: relocates the actor and faces it along the
    /// last step taken. Stationary paths only burn budget, handled by the
    /// turn engine.
    pub fn apply_path(&mut self, name: &str, path: &Path) -> Result<(), RoomError> {
        let destination = path.destination();
        if self.is_occupied_by_other(destination, name) {
            return Err(RoomError::Occupied(destination));
        }
        let facing = path
            .positions
            .iter()
            .rev()
            .nth(1)
            .and_then(|prev| {
                let (dx, dy) = prev.offset_to(destination);
                crate::grid::Direction::from_offset(dx, dy)
            });
        let actor = self
            .actors
            .get_mut(name)
            .ok_or_else(|| RoomError::UnknownActor(name.to_string()))?;
        actor.position = destination;
        if let Some(facing) = facing {
            actor.facing = facing;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Loot
    // ------------------------------------------------------------------

    pub fn add_loot(&mut self, loot: Loot) -> Result<(), RoomError> {
        if self.loots.contains_key(&loot.name) {
            return Err(RoomError::DuplicateLoot(loot.name));
        }
        if !self.map.contains(loot.position) {
            return Err(RoomError::NoSuchTile(loot.position));
        }
        self.loots.insert(loot.name.clone(), loot);
        Ok(())
    }

    pub fn remove_loot(&mut self, name: &str) -> Result<Loot, RoomError> {
        self.loots
            .remove(name)
            .ok_or_else(|| RoomError::UnknownLoot(name.to_string()))
    }

    pub fn loot(&self, name: &str) -> Option<&Loot> {
        self.loots.get(name)
    }

    pub fn loots(&self) -> impl Iterator<Item = &Loot> {
        self.loots.values()
    }

    /// Loot lying on a given tile.
    pub fn loot_at(&self, position: Position) -> Vec<&Loot> {
        self.loots.values().filter(|l| l.position == position).collect()
    }

    // ------------------------------------------------------------------
    // Gates
    // ------------------------------------------------------------------

    pub fn set_gate_markers(&mut self, markers: Vec<GateMarker>) {
        self.gate_markers = markers
            .into_iter()
            .map(|m| (m.name.clone(), m))
            .collect();
    }

    pub fn gate_markers(&self) -> impl Iterator<Item = &GateMarker> {
        self.gate_markers.values()
    }

    pub fn gate_marker(&self, name: &str) -> Option<&GateMarker> {
        self.gate_markers.get(name)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Per-observer visibility fields for an actor in this room.
    pub fn visibility_for(&self, observer: &Actor, config: &GameConfig) -> Visibility {
        let occlusion = compute_occlusion(
            &self.elevation,
            observer.position,
            observer.eye_height_m(),
            config,
        );
        let transparency = compute_transparency(&self.opacity, observer.position, config);
        Visibility::new(occlusion, transparency, config)
    }

    /// Terrain symbols overlaid with loot, then actors on top.
    pub fn symbol_grid(&self) -> Vec<String> {
        let mut rows: Vec<Vec<char>> = self
            .map
            .symbol_grid()
            .into_iter()
            .map(|row| row.chars().collect())
            .collect();
        for loot in self.loots.values() {
            if let Some(cell) = cell_mut(&mut rows, loot.position) {
                *cell = loot.symbol;
            }
        }
        for actor in self.actors.values() {
            if let Some(cell) = cell_mut(&mut rows, actor.position) {
                *cell = actor.symbol;
            }
        }
        rows.into_iter().map(|row| row.into_iter().collect()).collect()
    }
}

fn cell_mut(rows: &mut [Vec<char>], position: Position) -> Option<&mut char> {
    rows.get_mut(position.y as usize)?.get_mut(position.x as usize)
}
