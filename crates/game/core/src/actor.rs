//! Room-bound entities: actors and loot.

use crate::character::CharacterSheet;
use crate::grid::{Direction, Position};

/// Who decides this actor's moves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[derive(strum::Display, strum::EnumString)]
#[derive(serde::Serialize, serde::Deserialize)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum ControlMode {
    /// A human at the terminal.
    Manual,
    /// An automatic decision source (random or external model).
    #[default]
    Auto,
    /// No objective; skipped by initiative until reactivated.
    Idle,
}

/// An actor inside one room: the live shell around a character sheet.
///
/// The sheet is the persistent template; the actor adds the room-scoped
/// state (position, facing, per-turn budgets) and is rebuilt whenever the
/// party changes rooms.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Actor {
    /// Unique name; actors are keyed by name across the whole session.
    pub name: String,
    pub symbol: char,
    pub position: Position,
    pub facing: Direction,
    /// Standing height in meters, used by visibility checks.
    pub height_m: f32,
    pub control: ControlMode,

    /// Meters of movement left this turn.
    pub movement_left_m: f32,
    /// Action-economy units left this turn; every action consumes one.
    pub actions_left: u8,
    /// Last executed action label, echoed into decision context.
    pub last_action: Option<String>,

    pub sheet: CharacterSheet,
}

impl Actor {
    pub fn new(sheet: CharacterSheet, symbol: char, position: Position) -> Self {
        Self {
            name: sheet.name.clone(),
            symbol,
            position,
            facing: Direction::North,
            height_m: 1.7,
            control: ControlMode::Auto,
            movement_left_m: 0.0,
            actions_left: 0,
            last_action: None,
            sheet,
        }
    }

    pub fn with_facing(mut self, facing: Direction) -> Self {
        self.facing = facing;
        self
    }

    pub fn with_control(mut self, control: ControlMode) -> Self {
        self.control = control;
        self
    }

    pub fn turn_toward(&mut self, direction: Direction) {
        self.facing = direction;
    }

    /// Whether this actor takes part in a round right now.
    pub fn is_active(&self) -> bool {
        self.control != ControlMode::Idle && !self.sheet.is_incapacitated()
    }

    /// Eye height above the tile surface.
    pub fn eye_height_m(&self) -> f32 {
        self.height_m
    }
}

/// An item lying in the room.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Loot {
    pub name: String,
    pub symbol: char,
    pub position: Position,
    /// Physical height in meters; small objects hide behind low cover.
    pub height_m: f32,
    pub weight_kg: f32,
}

impl Loot {
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        Self {
            name: name.into(),
            symbol: 'l',
            position,
            height_m: 0.5,
            weight_kg: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::Conditions;

    #[test]
    fn idle_and_incapacitated_actors_are_inactive() {
        let mut actor = Actor::new(CharacterSheet::named("liora"), '@', Position::ORIGIN);
        assert!(actor.is_active());

        actor.control = ControlMode::Idle;
        assert!(!actor.is_active());

        actor.control = ControlMode::Auto;
        actor.sheet.conditions.insert(Conditions::UNCONSCIOUS);
        assert!(!actor.is_active());
    }
}
