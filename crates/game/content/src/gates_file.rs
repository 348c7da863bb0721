//! Gate link files.

use std::collections::BTreeMap;
use std::path::Path;

use skirmish_core::{Gate, GateDirectory, Position};

use crate::ContentError;

/// One gate entry; the map key is the gate name.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
struct GateBody {
    room_a: String,
    pos_a: (i32, i32),
    objective_from_a: String,
    room_b: String,
    pos_b: (i32, i32),
    objective_from_b: String,
    #[serde(default)]
    travelers: Vec<String>,
    #[serde(default = "default_duration")]
    duration_hours: u32,
    #[serde(default)]
    oneway: bool,
    #[serde(default = "default_description")]
    description: String,
}

fn default_duration() -> u32 {
    1
}

fn default_description() -> String {
    "a narrow path through dense vegetation".to_string()
}

/// Loads the campaign's gate directory.
pub fn load_gates(path: &Path) -> Result<GateDirectory, ContentError> {
    let bodies: BTreeMap<String, GateBody> = crate::read_yaml(path)?;
    let gates = bodies.into_iter().map(|(name, body)| Gate {
        name,
        room_a: body.room_a,
        pos_a: Position::new(body.pos_a.0, body.pos_a.1),
        objective_from_a: body.objective_from_a,
        room_b: body.room_b,
        pos_b: Position::new(body.pos_b.0, body.pos_b.1),
        objective_from_b: body.objective_from_b,
        travelers: body.travelers,
        duration_hours: body.duration_hours,
        oneway: body.oneway,
        description: body.description,
    });
    Ok(GateDirectory::new(gates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const GATES: &str = r#"
ravine_path:
  room_a: clearing
  pos_a: [0, 3]
  objective_from_a: find the hermit
  room_b: hermitage
  pos_b: [7, 7]
  objective_from_b: return to camp
  duration_hours: 2
old_stair:
  room_a: hermitage
  pos_a: [1, 1]
  objective_from_a: descend
  room_b: catacombs
  pos_b: [4, 0]
  objective_from_b: climb out
  oneway: true
"#;

    #[test]
    fn gates_load_with_defaults_applied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gates.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(GATES.as_bytes()).unwrap();

        let gates = load_gates(&path).unwrap();
        let ravine = gates.get("ravine_path").unwrap();
        assert_eq!(ravine.room_b, "hermitage");
        assert_eq!(ravine.pos_b, Position::new(7, 7));
        assert_eq!(ravine.duration_hours, 2);
        assert!(!ravine.oneway);
        assert!(ravine.travelers.is_empty());

        let stair = gates.get("old_stair").unwrap();
        assert!(stair.oneway);
        assert_eq!(stair.duration_hours, 1);

        // Marker sides resolve per room.
        assert_eq!(gates.markers_in("hermitage").len(), 2);
        assert_eq!(gates.markers_in("catacombs").len(), 0);
    }
}
