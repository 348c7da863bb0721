//! Gates: bidirectional links between rooms.
//!
//! Travelers queue into a gate during play; once the whole party has
//! entered, the session resolves the gate and everyone arrives together at
//! the far side after the gate's travel time.

use std::collections::BTreeMap;

use crate::grid::Position;

/// Resolution errors. Asking a gate about a room it does not connect is a
/// programming error and aborts the round.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    #[error("gate '{gate}' does not connect room '{room}'")]
    NotConnected { gate: String, room: String },

    #[error("no gate named '{0}'")]
    UnknownGate(String),

    #[error("no gate has travelers to resolve")]
    NoActiveGate,
}

/// One side of a gate as seen from inside a room.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct GateMarker {
    pub name: String,
    pub position: Position,
    /// Physical height of the gate structure, for visibility checks.
    pub height_m: f32,
    pub description: String,
    /// Objective text handed to actors that travel through from this side.
    pub objective: String,
}

/// A link between two rooms.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct Gate {
    pub name: String,
    pub room_a: String,
    pub pos_a: Position,
    /// Objective given to a party arriving in `room_b` (traveled from a).
    pub objective_from_a: String,
    pub room_b: String,
    pub pos_b: Position,
    /// Objective given to a party arriving in `room_a` (traveled from b).
    pub objective_from_b: String,
    pub travelers: Vec<String>,
    /// Travel time in hours.
    pub duration_hours: u32,
    pub oneway: bool,
    pub description: String,
}

impl Gate {
    fn connects(&self, room: &str) -> bool {
        self.room_a == room || self.room_b == room
    }
}

/// Where a resolved gate delivers its travelers.
#[derive(Clone, Debug, PartialEq)]
pub struct Passage {
    pub travelers: Vec<String>,
    pub destination_room: String,
    pub destination_pos: Position,
    pub objective: String,
    pub duration_hours: u32,
}

/// All gates of the campaign, keyed by name.
#[derive(Clone, Debug, Default, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct GateDirectory {
    gates: BTreeMap<String, Gate>,
}

impl GateDirectory {
    pub fn new(gates: impl IntoIterator<Item = Gate>) -> Self {
        Self {
            gates: gates.into_iter().map(|g| (g.name.clone(), g)).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Gate> {
        self.gates.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Gate> {
        self.gates.values()
    }

    /// Markers for every gate face inside `room`. A one-way gate shows no
    /// marker on its exit side.
    pub fn markers_in(&self, room: &str) -> Vec<GateMarker> {
        let mut markers = Vec::new();
        for gate in self.gates.values() {
            if gate.room_a == room {
                markers.push(GateMarker {
                    name: gate.name.clone(),
                    position: gate.pos_a,
                    height_m: 2.0,
                    description: gate.description.clone(),
                    objective: gate.objective_from_a.clone(),
                });
            }
            if gate.room_b == room && !gate.oneway {
                markers.push(GateMarker {
                    name: gate.name.clone(),
                    position: gate.pos_b,
                    height_m: 2.0,
                    description: gate.description.clone(),
                    objective: gate.objective_from_b.clone(),
                });
            }
        }
        markers
    }

    /// Queues a traveler into a gate.
    pub fn enter(&mut self, gate: &str, traveler: impl Into<String>) -> Result<(), GateError> {
        let gate = self
            .gates
            .get_mut(gate)
            .ok_or_else(|| GateError::UnknownGate(gate.to_string()))?;
        let traveler = traveler.into();
        if !gate.travelers.contains(&traveler) {
            gate.travelers.push(traveler);
        }
        Ok(())
    }

    /// The gate currently holding travelers, if any.
    pub fn active_gate(&self) -> Option<&Gate> {
        self.gates.values().find(|g| !g.travelers.is_empty())
    }

    /// Travelers queued in the active gate.
    pub fn traveler_count(&self) -> usize {
        self.active_gate().map(|g| g.travelers.len()).unwrap_or(0)
    }

    /// Resolves the active gate from inside `room`: drains its travelers
    /// and reports where they arrive.
    pub fn resolve(&mut self, room: &str) -> Result<Passage, GateError> {
        let gate = self
            .gates
            .values_mut()
            .find(|g| !g.travelers.is_empty())
            .ok_or(GateError::NoActiveGate)?;

        if !gate.connects(room) {
            return Err(GateError::NotConnected {
                gate: gate.name.clone(),
                room: room.to_string(),
            });
        }

        let (destination_room, destination_pos, objective) = if room == gate.room_a {
            (gate.room_b.clone(), gate.pos_b, gate.objective_from_a.clone())
        } else {
            (gate.room_a.clone(), gate.pos_a, gate.objective_from_b.clone())
        };

        Ok(Passage {
            travelers: std::mem::take(&mut gate.travelers),
            destination_room,
            destination_pos,
            objective,
            duration_hours: gate.duration_hours,
        })
    }
}
