//! Perception queries: what an actor can currently see and act on.
//!
//! Combines the occlusion and fog fields (one sweep each per observer)
//! with distance banding and compass bearings to produce the concrete
//! entity lists the turn engine builds its action menu from. The textual
//! report is a thin formatting layer used as decision-provider context.

use crate::actor::Actor;
use crate::config::GameConfig;
use crate::grid::{Direction, Position};
use crate::room::{Room, RoomError};
use crate::vision::ElevationField;

/// Coarse distance classification used in reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum DistanceBand {
    Close,
    Mid,
    Far,
}

impl DistanceBand {
    /// Bands over rounded unit distances: close is `<= close_max_units`,
    /// far is `>= far_min_units`, everything else (including the gap the
    /// original thresholds leave between close and mid) is mid.
    pub fn from_units(units: u32, config: &GameConfig) -> Self {
        if units <= config.close_max_units {
            DistanceBand::Close
        } else if units >= config.far_min_units {
            DistanceBand::Far
        } else {
            DistanceBand::Mid
        }
    }
}

/// Compass bearing from `from` to `to`, `None` when they share a tile.
pub fn bearing(from: Position, to: Position) -> Option<Direction> {
    let (dx, dy) = from.offset_to(to);
    Direction::from_offset(dx, dy)
}

/// 3D straight-line distance in meters: planar grid distance scaled to
/// meters, combined with the terrain-surface height difference.
pub fn distance_m(
    config: &GameConfig,
    elevation: &ElevationField,
    from: Position,
    to: Position,
) -> f32 {
    let planar = config.units_to_m(from.euclid_units(to));
    let dz = elevation.surface(to).unwrap_or(0.0) - elevation.surface(from).unwrap_or(0.0);
    (planar * planar + dz * dz).sqrt()
}

/// What kind of entity a sighting refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[derive(strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SightingKind {
    Actor,
    Loot,
    Gate,
}

/// One visible entity, tagged for the action menu and the report.
#[derive(Clone, Debug, PartialEq)]
pub struct Sighting {
    pub name: String,
    pub kind: SightingKind,
    pub distance_m: u32,
    /// `None` means "same place" (standing on the observer's tile).
    pub bearing: Option<Direction>,
    pub band: DistanceBand,
}

/// Everything an observer can currently perceive, nearest first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Perception {
    pub actors: Vec<Sighting>,
    pub loots: Vec<Sighting>,
    pub gates: Vec<Sighting>,
}

impl Perception {
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty() && self.loots.is_empty() && self.gates.is_empty()
    }

    fn all(&self) -> impl Iterator<Item = &Sighting> {
        self.actors.iter().chain(&self.loots).chain(&self.gates)
    }

    /// Multi-line report grouped by band then bearing, for human players
    /// and model prompts alike.
    pub fn report(&self, observer: &Actor, config: &GameConfig) -> String {
        let mut lines = vec![format!("{} is facing {}.", observer.name, observer.facing)];

        for band in [DistanceBand::Close, DistanceBand::Mid, DistanceBand::Far] {
            let mut band_lines = Vec::new();
            let mut bearings: Vec<Option<Direction>> =
                vec![None];
            bearings.extend(Direction::ALL.map(Some));

            for slot in bearings {
                let mut here: Vec<&Sighting> = self
                    .all()
                    .filter(|s| s.band == band && s.bearing == slot)
                    .collect();
                if here.is_empty() {
                    continue;
                }
                here.sort_by_key(|s| s.distance_m);

                let mut parts = Vec::new();
                for kind in [SightingKind::Actor, SightingKind::Loot, SightingKind::Gate] {
                    let of_kind: Vec<&&Sighting> =
                        here.iter().filter(|s| s.kind == kind).collect();
                    if of_kind.is_empty() {
                        continue;
                    }
                    if of_kind.len() > config.plural_threshold {
                        parts.push(format!("several {kind}s"));
                    } else {
                        for sighting in of_kind {
                            parts.push(format!("{} ({}m)", sighting.name, sighting.distance_m));
                        }
                    }
                }

                let place = match slot {
                    Some(direction) => format!("to the {direction}"),
                    None => "right here".to_string(),
                };
                band_lines.push(format!("  {place}, you see {}", parts.join(", ")));
            }

            if !band_lines.is_empty() {
                lines.push(format!("{}:", capitalize(&band.to_string())));
                lines.extend(band_lines);
            }
        }

        if lines.len() == 1 {
            lines.push("You see only empty floor ahead.".to_string());
        }
        lines.join("\n")
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Computes the full perception of one actor: visibility fields once, then
/// every other actor, loot, and gate filtered by occlusion, fog, and scan
/// range.
pub fn perceive(room: &Room, observer: &str, config: &GameConfig) -> Result<Perception, RoomError> {
    let observer = room
        .actor(observer)
        .ok_or_else(|| RoomError::UnknownActor(observer.to_string()))?;
    let visibility = room.visibility_for(observer, config);
    let origin = observer.position;

    let sight = |pos: Position, height: f32, name: &str, kind: SightingKind| -> Option<Sighting> {
        let units = origin.euclid_units(pos);
        if units > config.max_scan_units as f32 {
            return None;
        }
        if !visibility.can_see(pos, height) {
            return None;
        }
        let meters = distance_m(config, room.elevation(), origin, pos);
        let rounded = meters.round().max(0.0) as u32;
        Some(Sighting {
            name: name.to_string(),
            kind,
            distance_m: rounded,
            bearing: bearing(origin, pos),
            band: DistanceBand::from_units(units.round() as u32, config),
        })
    };

    let mut perception = Perception::default();
    for actor in room.actors() {
        if actor.name == observer.name {
            continue;
        }
        if let Some(s) = sight(actor.position, actor.height_m, &actor.name, SightingKind::Actor) {
            perception.actors.push(s);
        }
    }
    for loot in room.loots() {
        if let Some(s) = sight(loot.position, loot.height_m, &loot.name, SightingKind::Loot) {
            perception.loots.push(s);
        }
    }
    for marker in room.gate_markers() {
        if let Some(s) = sight(marker.position, marker.height_m, &marker.name, SightingKind::Gate) {
            perception.gates.push(s);
        }
    }

    perception.actors.sort_by_key(|s| s.distance_m);
    perception.loots.sort_by_key(|s| s.distance_m);
    perception.gates.sort_by_key(|s| s.distance_m);
    Ok(perception)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Loot;
    use crate::character::CharacterSheet;
    use crate::gate::GateMarker;
    use crate::grid::{Tile, TileMap};

    fn room_with(width: u32, height: u32) -> Room {
        Room::new(
            "clearing",
            "",
            TileMap::filled(width, height, Tile::floor(' ', "floor")),
        )
    }

    fn place(room: &mut Room, name: &str, pos: Position) {
        room.add_actor(Actor::new(CharacterSheet::named(name), '@', pos))
            .unwrap();
    }

    #[test]
    fn bands_follow_the_unit_thresholds() {
        let config = GameConfig::default();
        assert_eq!(DistanceBand::from_units(0, &config), DistanceBand::Close);
        assert_eq!(DistanceBand::from_units(6, &config), DistanceBand::Close);
        assert_eq!(DistanceBand::from_units(7, &config), DistanceBand::Mid);
        assert_eq!(DistanceBand::from_units(20, &config), DistanceBand::Mid);
        assert_eq!(DistanceBand::from_units(21, &config), DistanceBand::Far);
    }

    #[test]
    fn bearing_snaps_and_detects_same_place() {
        assert_eq!(bearing(Position::new(2, 2), Position::new(2, 2)), None);
        assert_eq!(
            bearing(Position::new(2, 2), Position::new(2, 0)),
            Some(Direction::North)
        );
        assert_eq!(
            bearing(Position::new(0, 0), Position::new(5, 1)),
            Some(Direction::East)
        );
    }

    #[test]
    fn perceive_lists_entities_with_rounded_distances() {
        let mut room = room_with(12, 12);
        place(&mut room, "liora", Position::new(0, 0));
        place(&mut room, "selra", Position::new(4, 0));
        room.add_loot(Loot::new("coin", Position::new(0, 2))).unwrap();
        room.set_gate_markers(vec![GateMarker {
            name: "ravine_path".to_string(),
            position: Position::new(9, 9),
            height_m: 2.0,
            description: "a narrow path".to_string(),
            objective: "leave".to_string(),
        }]);

        let config = GameConfig::default();
        let perception = perceive(&room, "liora", &config).unwrap();

        assert_eq!(perception.actors.len(), 1);
        // 4 units east at 1.5 m/unit.
        assert_eq!(perception.actors[0].distance_m, 6);
        assert_eq!(perception.actors[0].bearing, Some(Direction::East));
        assert_eq!(perception.actors[0].band, DistanceBand::Close);

        assert_eq!(perception.loots.len(), 1);
        assert_eq!(perception.loots[0].distance_m, 3);

        assert_eq!(perception.gates.len(), 1);
        assert_eq!(perception.gates[0].bearing, Some(Direction::SouthEast));
    }

    #[test]
    fn observer_never_sees_itself() {
        let mut room = room_with(5, 5);
        place(&mut room, "liora", Position::new(2, 2));
        let perception = perceive(&room, "liora", &GameConfig::default()).unwrap();
        assert!(perception.is_empty());
    }

    #[test]
    fn wall_blocks_sight_but_not_distance() {
        let mut map = TileMap::filled(5, 1, Tile::floor(' ', "floor"));
        let wall = map.tile_mut(Position::new(1, 0)).unwrap();
        wall.difficulty = Tile::IMPASSABLE;
        wall.obstacle_height = 3.0;
        let mut room = Room::new("corridor", "", map);
        place(&mut room, "liora", Position::new(0, 0));
        place(&mut room, "selra", Position::new(2, 0));

        let config = GameConfig::default();
        let perception = perceive(&room, "liora", &config).unwrap();
        // Two units apart, but the wall swallows the sighting.
        assert!(perception.actors.is_empty());
        // Distance-only proximity is unaffected by occlusion.
        let liora = room.actor("liora").unwrap().position;
        let selra = room.actor("selra").unwrap().position;
        let d = distance_m(&config, room.elevation(), liora, selra);
        assert!((d - 3.0).abs() < 1e-3);
    }

    #[test]
    fn elevation_contributes_to_distance() {
        let mut map = TileMap::filled(2, 1, Tile::floor(' ', "floor"));
        map.tile_mut(Position::new(1, 0)).unwrap().elevation = 2.0;
        let room = Room::new("ledge", "", map);
        let config = GameConfig::default();
        let d = distance_m(
            &config,
            room.elevation(),
            Position::new(0, 0),
            Position::new(1, 0),
        );
        assert!((d - (1.5f32 * 1.5 + 4.0).sqrt()).abs() < 1e-3);
    }

    #[test]
    fn report_groups_by_band_and_bearing() {
        let mut room = room_with(30, 30);
        place(&mut room, "liora", Position::new(0, 0));
        place(&mut room, "selra", Position::new(4, 0));
        place(&mut room, "brog", Position::new(0, 25));
        let config = GameConfig::default();
        let perception = perceive(&room, "liora", &config).unwrap();
        let observer = room.actor("liora").unwrap();
        let report = perception.report(observer, &config);

        assert!(report.contains("liora is facing"));
        assert!(report.contains("Close:"));
        assert!(report.contains("to the east, you see selra (6m)"));
        assert!(report.contains("Far:"));
        assert!(report.contains("to the south, you see brog (38m)"));
    }

    #[test]
    fn empty_view_reports_empty_floor() {
        let mut room = room_with(3, 3);
        place(&mut room, "liora", Position::new(1, 1));
        let config = GameConfig::default();
        let perception = perceive(&room, "liora", &config).unwrap();
        let report = perception.report(room.actor("liora").unwrap(), &config);
        assert!(report.contains("You see only empty floor ahead."));
    }
}
