//! Structured action commands and legal-action enumeration.
//!
//! Decision providers deal in human-readable option strings; the engine
//! deals in this closed command enum. Each enumerated option carries both,
//! the provider echoes the label back verbatim, and the label is resolved
//! to its command exactly once at the boundary. A label that matches no
//! option is a fatal engine error, never silently ignored.

use std::fmt;

use crate::actor::Actor;
use crate::config::GameConfig;
use crate::grid::{Direction, Position};
use crate::perception::Perception;
use crate::room::Room;
use crate::tables::Armory;

/// Everything an actor can do with one decision.
#[derive(Clone, Debug, PartialEq)]
pub enum ActionCommand {
    EndTurn,
    LookAround,
    Rest,
    MoveDirection(Direction),
    MoveToActor(String),
    MoveToLoot(String),
    MoveToGate(String),
    Attack { target: String, weapon: String },
    PickUp(String),
    Talk(String),
    ClimbOver(Direction),
}

impl fmt::Display for ActionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionCommand::EndTurn => write!(f, "end turn"),
            ActionCommand::LookAround => write!(f, "look around"),
            ActionCommand::Rest => write!(f, "rest"),
            ActionCommand::MoveDirection(d) => write!(f, "move {d}"),
            ActionCommand::MoveToActor(name) => write!(f, "move toward {name}"),
            ActionCommand::MoveToLoot(name) => write!(f, "move to {name}"),
            ActionCommand::MoveToGate(name) => write!(f, "head for {name}"),
            ActionCommand::Attack { target, weapon } => {
                write!(f, "attack {target} with {weapon}")
            }
            ActionCommand::PickUp(name) => write!(f, "pick up {name}"),
            ActionCommand::Talk(name) => write!(f, "talk to {name}"),
            ActionCommand::ClimbOver(d) => write!(f, "climb over the obstacle {d}"),
        }
    }
}

/// One entry of the action menu: the structured command plus the exact
/// label shown to (and echoed by) the decision provider.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionOption {
    pub command: ActionCommand,
    pub label: String,
}

impl ActionOption {
    fn new(command: ActionCommand) -> Self {
        let label = command.to_string();
        Self { command, label }
    }
}

/// Enumerates the legal actions for an actor given its current position,
/// budgets, and what it can see.
pub fn legal_actions(
    room: &Room,
    actor: &Actor,
    perception: &Perception,
    armory: &dyn Armory,
    config: &GameConfig,
) -> Vec<ActionOption> {
    let mut options = vec![
        ActionOption::new(ActionCommand::LookAround),
        ActionOption::new(ActionCommand::EndTurn),
    ];

    let can_move = actor.movement_left_m >= config.meters_per_unit;
    let has_action = actor.actions_left > 0;

    if can_move {
        for direction in Direction::ALL {
            let next = actor.position.step(direction);
            let Some(tile) = room.map().tile(next) else {
                continue;
            };
            if tile.is_passable() && room.occupant_of(next).is_none() {
                options.push(ActionOption::new(ActionCommand::MoveDirection(direction)));
            }
        }
        for sighting in &perception.actors {
            options.push(ActionOption::new(ActionCommand::MoveToActor(
                sighting.name.clone(),
            )));
        }
        for sighting in &perception.loots {
            options.push(ActionOption::new(ActionCommand::MoveToLoot(
                sighting.name.clone(),
            )));
        }
        for sighting in &perception.gates {
            options.push(ActionOption::new(ActionCommand::MoveToGate(
                sighting.name.clone(),
            )));
        }
    }

    if has_action {
        if let Some(weapon_name) = actor.sheet.wielded_weapon() {
            if let Some(weapon) = armory.weapon(weapon_name) {
                for sighting in &perception.actors {
                    if sighting.distance_m as f32 <= weapon.range_m {
                        options.push(ActionOption::new(ActionCommand::Attack {
                            target: sighting.name.clone(),
                            weapon: weapon_name.to_string(),
                        }));
                    }
                }
            }
        }

        for loot in room.loot_at(actor.position) {
            options.push(ActionOption::new(ActionCommand::PickUp(loot.name.clone())));
        }

        for other in room.actors() {
            if other.name != actor.name && other.position.ring_radius(actor.position) <= 1 {
                options.push(ActionOption::new(ActionCommand::Talk(other.name.clone())));
            }
        }

        for direction in Direction::ALL {
            let next = actor.position.step(direction);
            let climbable = room
                .map()
                .tile(next)
                .is_some_and(|t| t.climb_height > 0.0 && t.is_passable());
            if climbable && room.occupant_of(next).is_none() {
                options.push(ActionOption::new(ActionCommand::ClimbOver(direction)));
            }
        }

        options.push(ActionOption::new(ActionCommand::Rest));
    }

    options
}

/// Resolves an echoed label back to its command. Exact match only.
pub fn resolve_label<'a>(options: &'a [ActionOption], label: &str) -> Option<&'a ActionCommand> {
    options
        .iter()
        .find(|option| option.label == label)
        .map(|option| &option.command)
}

/// Convenience for tests and AI scoring: where a move command is headed.
pub fn command_goal(room: &Room, actor: &Actor, command: &ActionCommand) -> Option<Position> {
    match command {
        ActionCommand::MoveDirection(d) => Some(actor.position.step(*d)),
        ActionCommand::MoveToActor(name) => room.actor(name).map(|a| a.position),
        ActionCommand::MoveToLoot(name) => room.loot(name).map(|l| l.position),
        ActionCommand::MoveToGate(name) => room.gate_marker(name).map(|g| g.position),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::CharacterSheet;
    use crate::grid::{Tile, TileMap};
    use crate::perception::perceive;
    use crate::tables::EmptyArmory;

    fn ready_actor(name: &str, pos: Position) -> Actor {
        let mut actor = Actor::new(CharacterSheet::named(name), '@', pos);
        actor.movement_left_m = 9.0;
        actor.actions_left = 1;
        actor
    }

    fn setup(width: u32, height: u32) -> (Room, GameConfig) {
        let room = Room::new(
            "clearing",
            "",
            TileMap::filled(width, height, Tile::floor(' ', "floor")),
        );
        (room, GameConfig::default())
    }

    #[test]
    fn corner_actor_gets_three_move_directions() {
        let (mut room, config) = setup(5, 5);
        room.add_actor(ready_actor("liora", Position::new(0, 0))).unwrap();
        let perception = perceive(&room, "liora", &config).unwrap();
        let options = legal_actions(
            &room,
            room.actor("liora").unwrap(),
            &perception,
            &EmptyArmory,
            &config,
        );

        let moves: Vec<_> = options
            .iter()
            .filter(|o| matches!(o.command, ActionCommand::MoveDirection(_)))
            .collect();
        assert_eq!(moves.len(), 3); // east, southeast, south
    }

    #[test]
    fn spent_budgets_remove_whole_categories() {
        let (mut room, config) = setup(5, 5);
        let mut actor = ready_actor("liora", Position::new(2, 2));
        actor.movement_left_m = 0.5;
        actor.actions_left = 0;
        room.add_actor(actor).unwrap();

        let perception = perceive(&room, "liora", &config).unwrap();
        let options = legal_actions(
            &room,
            room.actor("liora").unwrap(),
            &perception,
            &EmptyArmory,
            &config,
        );

        // Only the always-available options remain.
        assert!(options.iter().all(|o| matches!(
            o.command,
            ActionCommand::LookAround | ActionCommand::EndTurn
        )));
    }

    #[test]
    fn adjacency_enables_talk_and_pickup() {
        let (mut room, config) = setup(5, 5);
        room.add_actor(ready_actor("liora", Position::new(1, 1))).unwrap();
        room.add_actor(ready_actor("selra", Position::new(2, 2))).unwrap();
        room.add_loot(crate::actor::Loot::new("coin", Position::new(1, 1)))
            .unwrap();

        let perception = perceive(&room, "liora", &config).unwrap();
        let options = legal_actions(
            &room,
            room.actor("liora").unwrap(),
            &perception,
            &EmptyArmory,
            &config,
        );

        assert!(options
            .iter()
            .any(|o| o.command == ActionCommand::Talk("selra".to_string())));
        assert!(options
            .iter()
            .any(|o| o.command == ActionCommand::PickUp("coin".to_string())));
    }

    #[test]
    fn labels_resolve_exactly_or_not_at_all() {
        let (mut room, config) = setup(5, 5);
        room.add_actor(ready_actor("liora", Position::new(2, 2))).unwrap();
        let perception = perceive(&room, "liora", &config).unwrap();
        let options = legal_actions(
            &room,
            room.actor("liora").unwrap(),
            &perception,
            &EmptyArmory,
            &config,
        );

        assert_eq!(
            resolve_label(&options, "end turn"),
            Some(&ActionCommand::EndTurn)
        );
        assert_eq!(resolve_label(&options, "END TURN"), None);
        assert_eq!(resolve_label(&options, "dance"), None);
    }
}
