//! Deterministic tactical game logic shared across the runtime and tools.
//!
//! `skirmish-core` defines the canonical rules of the grid simulation: the
//! tile model, elevation-aware visibility, cost-aware pathfinding, the
//! perception query layer, and the turn/round engine. Everything here is
//! pure state + functions; I/O, decision sources, and persistence live in
//! the runtime and content crates, which depend on the types re-exported
//! here.
pub mod action;
pub mod actor;
pub mod character;
pub mod config;
pub mod dice;
pub mod gate;
pub mod grid;
pub mod path;
pub mod perception;
pub mod room;
pub mod tables;
pub mod turn;
pub mod vision;

pub use action::{ActionCommand, ActionOption, command_goal, legal_actions, resolve_label};
pub use actor::{Actor, ControlMode, Loot};
pub use character::{
    Attributes, CharacterSheet, Conditions, Equipped, Faction, Mastery, SheetLibrary,
    WeaponMastery,
};
pub use config::GameConfig;
pub use dice::{DiceError, DiceExpr, DiceRoller, RandomRoller, Roll};
pub use gate::{Gate, GateDirectory, GateError, GateMarker, Passage};
pub use grid::{Direction, GridError, MapDimensions, Position, Tile, TileMap, crown};
pub use path::{Path, PathError, bearing_goal, find_path};
pub use perception::{
    DistanceBand, Perception, Sighting, SightingKind, bearing, distance_m, perceive,
};
pub use room::{Room, RoomError};
pub use tables::{Armory, ArmorStats, EmptyArmory, SpellStats, WeaponCategory, WeaponStats};
pub use turn::{
    ActionOutcome, ClimbCheck, ClimbDirection, ClimbOutcome, InitiativeEntry, MAX_CLIMB_M,
    TurnEngine, TurnError, active_actors, initiative_order,
};
pub use vision::{
    ElevationField, OcclusionField, OpacityField, TransparencyField, Visibility,
    compute_occlusion, compute_transparency,
};
