//! Per-actor turn execution.
//!
//! The [`TurnEngine`] applies one structured command at a time, mutating
//! room/actor/character state and decrementing the right budget. The round
//! driver (initiative, the explicit round loop, persistence checkpoints)
//! lives in the runtime crate; everything it needs per action is here.

mod climb;
mod initiative;

pub use climb::{ClimbCheck, ClimbDirection, ClimbOutcome, MAX_CLIMB_M};
pub use initiative::{InitiativeEntry, active_actors, initiative_order};

use crate::action::ActionCommand;
use crate::config::GameConfig;
use crate::dice::{DiceExpr, DiceRoller};
use crate::grid::{Direction, Position};
use crate::path::{PathError, bearing_goal, find_path};
use crate::perception::{bearing, distance_m, perceive};
use crate::room::{Room, RoomError};
use crate::tables::Armory;

/// Turn-engine failures. Everything here is a programming or data error;
/// ordinary gameplay setbacks ("blocked", "too heavy", "misses") come back
/// as narration inside [`ActionOutcome`] instead.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    /// The decision layer echoed a label the engine never offered.
    #[error("unrecognized action '{0}'")]
    UnknownAction(String),

    #[error("unknown weapon '{0}' in the equipment tables")]
    UnknownWeapon(String),

    #[error(transparent)]
    Room(#[from] RoomError),

    #[error(transparent)]
    Path(#[from] PathError),
}

/// Result of applying one action.
#[derive(Clone, Debug, Default)]
pub struct ActionOutcome {
    /// Narrative lines for the frontend, in order.
    pub narration: Vec<String>,
    /// The actor's turn is finished (explicitly or budgets ran dry).
    pub turn_over: bool,
    /// The actor stepped onto a gate tile and queued as a traveler.
    pub entered_gate: Option<String>,
    /// An actor died from this action.
    pub slain: Option<String>,
}

/// Applies structured commands for the actor whose turn it is.
pub struct TurnEngine<'a> {
    room: &'a mut Room,
    armory: &'a dyn Armory,
    config: &'a GameConfig,
}

impl<'a> TurnEngine<'a> {
    pub fn new(room: &'a mut Room, armory: &'a dyn Armory, config: &'a GameConfig) -> Self {
        Self {
            room,
            armory,
            config,
        }
    }

    pub fn room(&self) -> &Room {
        &*self.room
    }

    /// Charges the per-turn budgets: full movement allowance (reduced by
    /// encumbrance) and one action-economy unit.
    pub fn begin_turn(&mut self, name: &str) -> Result<(), TurnError> {
        let armory = self.armory;
        let actor = self
            .room
            .actor_mut(name)
            .ok_or_else(|| RoomError::UnknownActor(name.to_string()))?;
        actor.movement_left_m = actor.sheet.movement_budget_m(armory);
        actor.actions_left = 1;
        Ok(())
    }

    /// Applies one command for `name` and reports what happened.
    ///
    /// The turn is over when the actor ended it explicitly, its movement
    /// budget fell below one grid unit, or its action counter reached
    /// zero.
    pub fn take_action(
        &mut self,
        name: &str,
        command: &ActionCommand,
        roller: &mut dyn DiceRoller,
    ) -> Result<ActionOutcome, TurnError> {
        // The actor must exist before any dispatch.
        self.actor(name)?;

        let mut outcome = match command {
            ActionCommand::EndTurn => self.end_turn(name)?,
            ActionCommand::LookAround => self.look_around(name)?,
            ActionCommand::Rest => self.rest(name, roller)?,
            ActionCommand::MoveDirection(direction) => {
                let goal = bearing_goal(
                    self.room.map(),
                    self.actor(name)?.position,
                    *direction,
                    self.config.max_scan_units,
                );
                self.walk(name, goal)?
            }
            ActionCommand::MoveToActor(target) => {
                // The goal is the target's live tile, re-derived per call.
                let goal = self
                    .actor(target)?
                    .position;
                self.walk(name, goal)?
            }
            ActionCommand::MoveToLoot(target) => {
                let goal = self
                    .room
                    .loot(target)
                    .ok_or_else(|| RoomError::UnknownLoot(target.to_string()))?
                    .position;
                self.walk(name, goal)?
            }
            ActionCommand::MoveToGate(target) => self.walk_to_gate(name, target)?,
            ActionCommand::Attack { target, weapon } => {
                self.attack(name, target, weapon, roller)?
            }
            ActionCommand::PickUp(loot) => self.pick_up(name, loot)?,
            ActionCommand::Talk(other) => self.talk(name, other)?,
            ActionCommand::ClimbOver(direction) => self.climb(name, *direction, roller)?,
        };

        let min_move = self.config.meters_per_unit;
        let actor = self
            .room
            .actor_mut(name)
            .ok_or_else(|| RoomError::UnknownActor(name.to_string()))?;
        actor.last_action = Some(command.to_string());
        if !outcome.turn_over {
            outcome.turn_over = actor.movement_left_m < min_move || actor.actions_left == 0;
        }
        Ok(outcome)
    }

    fn actor(&self, name: &str) -> Result<&crate::actor::Actor, TurnError> {
        self.room
            .actor(name)
            .ok_or_else(|| TurnError::Room(RoomError::UnknownActor(name.to_string())))
    }

    // ------------------------------------------------------------------
    // Handlers
    // ------------------------------------------------------------------

    fn end_turn(&mut self, name: &str) -> Result<ActionOutcome, TurnError> {
        Ok(ActionOutcome {
            narration: vec![format!("{name} ends the turn.")],
            turn_over: true,
            ..Default::default()
        })
    }

    fn look_around(&mut self, name: &str) -> Result<ActionOutcome, TurnError> {
        let perception = perceive(self.room, name, self.config)?;
        let observer = self.actor(name)?;
        Ok(ActionOutcome {
            narration: vec![perception.report(observer, self.config)],
            ..Default::default()
        })
    }

    fn rest(&mut self, name: &str, roller: &mut dyn DiceRoller) -> Result<ActionOutcome, TurnError> {
        let hit_dice = self.actor(name)?.sheet.hit_dice;
        let recovered = roller.roll(hit_dice, 0).total.max(0);
        let actor = self.room.actor_mut(name).expect("actor checked above");
        actor.sheet.heal(recovered);
        actor.actions_left = actor.actions_left.saturating_sub(1);
        Ok(ActionOutcome {
            narration: vec![format!(
                "{name} catches their breath and recovers {recovered} HP ({}/{}).",
                actor.sheet.current_hp, actor.sheet.max_hp
            )],
            ..Default::default()
        })
    }

    /// Shared movement core: path toward `goal` under the remaining
    /// budget, best partial path when the goal is out of reach. A fully
    /// blocked move still deducts one grid unit of budget so a stubborn
    /// decision source cannot loop forever.
    fn walk(&mut self, name: &str, goal: Position) -> Result<ActionOutcome, TurnError> {
        let (start, budget) = {
            let actor = self.actor(name)?;
            (actor.position, actor.movement_left_m)
        };

        let path = find_path(
            self.room.map(),
            |pos| self.room.is_occupied_by_other(pos, name),
            start,
            goal,
            Some(budget),
            self.config,
        )?;

        let min_move = self.config.meters_per_unit;
        if path.is_stationary() {
            let actor = self.room.actor_mut(name).expect("actor checked above");
            actor.movement_left_m = (actor.movement_left_m - min_move).max(0.0);
            return Ok(ActionOutcome {
                narration: vec![format!("{name}'s movement is blocked by an obstacle.")],
                ..Default::default()
            });
        }

        self.room.apply_path(name, &path)?;
        let destination = path.destination();
        let spent = path.distance_m;
        let heading = bearing(start, destination)
            .map(|d| d.to_string())
            .unwrap_or_else(|| "nowhere".to_string());

        let actor = self.room.actor_mut(name).expect("actor checked above");
        actor.movement_left_m = (budget - spent).max(0.0);

        Ok(ActionOutcome {
            narration: vec![format!("{name} moves {spent:.1}m to the {heading}.")],
            ..Default::default()
        })
    }

    fn walk_to_gate(&mut self, name: &str, gate: &str) -> Result<ActionOutcome, TurnError> {
        let marker_pos = self
            .room
            .gate_marker(gate)
            .ok_or_else(|| RoomError::UnknownGate(gate.to_string()))?
            .position;

        let mut outcome = self.walk(name, marker_pos)?;
        if self.actor(name)?.position == marker_pos {
            outcome.entered_gate = Some(gate.to_string());
            outcome
                .narration
                .push(format!("{name} steps into {gate} and waits for the others."));
            // Standing in the gate ends the turn.
            outcome.turn_over = true;
        }
        Ok(outcome)
    }

    fn attack(
        &mut self,
        name: &str,
        target: &str,
        weapon: &str,
        roller: &mut dyn DiceRoller,
    ) -> Result<ActionOutcome, TurnError> {
        let stats = self
            .armory
            .weapon(weapon)
            .ok_or_else(|| TurnError::UnknownWeapon(weapon.to_string()))?
            .clone();

        let (attacker_pos, attack_bonus) = {
            let attacker = self.actor(name)?;
            (attacker.position, attacker.sheet.attack_bonus(&stats))
        };
        let (target_pos, target_ac) = {
            let victim = self.actor(target)?;
            (victim.position, victim.sheet.armor_class)
        };

        let mut outcome = ActionOutcome::default();
        let distance = distance_m(self.config, self.room.elevation(), attacker_pos, target_pos);

        // Face the target either way; a wasted swing is still a turn spent.
        if let Some(direction) = bearing(attacker_pos, target_pos) {
            self.room
                .actor_mut(name)
                .expect("actor checked above")
                .turn_toward(direction);
        }

        if distance > stats.range_m {
            outcome.narration.push(format!(
                "{name} cannot reach {target} with the {weapon} ({distance:.0}m away)."
            ));
        } else {
            let hit_roll = roller.roll(DiceExpr::D20, 0);
            let total = hit_roll.total + attack_bonus;
            if total >= target_ac {
                let critical = hit_roll.quality >= 1.0;
                let mut damage = roller.roll(stats.damage, 0).total.max(0);
                if critical {
                    damage += roller.roll(stats.damage, 0).total.max(0);
                }
                let victim = self
                    .room
                    .actor_mut(target)
                    .expect("target checked above");
                let died = victim.sheet.apply_damage(damage);
                if critical {
                    outcome
                        .narration
                        .push(format!("{name} lands a critical hit on {target}!"));
                }
                outcome.narration.push(format!(
                    "{name} hits {target} with the {weapon} for {damage} damage ({} HP left).",
                    victim.sheet.current_hp
                ));
                if died {
                    outcome.narration.push(format!("{target} collapses."));
                    outcome.slain = Some(target.to_string());
                }
            } else {
                outcome.narration.push(format!(
                    "{name} swings at {target} and misses ({total} vs AC {target_ac})."
                ));
            }
        }

        let attacker = self.room.actor_mut(name).expect("actor checked above");
        attacker.actions_left = attacker.actions_left.saturating_sub(1);
        Ok(outcome)
    }

    fn pick_up(&mut self, name: &str, loot_name: &str) -> Result<ActionOutcome, TurnError> {
        let mut outcome = ActionOutcome::default();

        let Some(loot) = self.room.loot(loot_name).cloned() else {
            return Err(TurnError::Room(RoomError::UnknownLoot(
                loot_name.to_string(),
            )));
        };

        let (position, carried, capacity) = {
            let actor = self.actor(name)?;
            (
                actor.position,
                actor.sheet.carried_weight_kg(self.armory),
                actor.sheet.max_carry_kg(),
            )
        };

        if loot.position != position {
            outcome
                .narration
                .push(format!("{name} reaches for {loot_name}, but it is out of reach."));
        } else if carried + loot.weight_kg > capacity {
            outcome.narration.push(format!(
                "{name} cannot carry {loot_name}: too heavy ({:.1}kg over {:.1}kg capacity).",
                carried + loot.weight_kg,
                capacity
            ));
        } else {
            self.room.remove_loot(loot_name)?;
            let actor = self.room.actor_mut(name).expect("actor checked above");
            actor.sheet.equipment.push(loot.name.clone());
            outcome
                .narration
                .push(format!("{name} picks up {loot_name}."));
        }

        let actor = self.room.actor_mut(name).expect("actor checked above");
        actor.actions_left = actor.actions_left.saturating_sub(1);
        Ok(outcome)
    }

    fn talk(&mut self, name: &str, other: &str) -> Result<ActionOutcome, TurnError> {
        let mut outcome = ActionOutcome::default();
        let here = self.actor(name)?.position;
        let there = self.actor(other)?.position;

        if here.ring_radius(there) > 1 {
            outcome
                .narration
                .push(format!("{other} is too far away for {name} to talk to."));
        } else {
            outcome
                .narration
                .push(format!("{name} exchanges a few words with {other}."));
        }

        let actor = self.room.actor_mut(name).expect("actor checked above");
        actor.actions_left = actor.actions_left.saturating_sub(1);
        Ok(outcome)
    }

    fn climb(
        &mut self,
        name: &str,
        direction: Direction,
        roller: &mut dyn DiceRoller,
    ) -> Result<ActionOutcome, TurnError> {
        let mut outcome = ActionOutcome::default();
        let start = self.actor(name)?.position;
        let target = start.step(direction);

        let here_elevation = self
            .room
            .map()
            .tile(start)
            .ok_or(RoomError::NoSuchTile(start))?
            .elevation;
        let tile = self
            .room
            .map()
            .tile(target)
            .ok_or(RoomError::NoSuchTile(target))?
            .clone();

        let consume_action = |engine: &mut Self| {
            let actor = engine.room.actor_mut(name).expect("actor checked above");
            actor.actions_left = actor.actions_left.saturating_sub(1);
        };

        if tile.climb_height > MAX_CLIMB_M {
            outcome.narration.push(format!(
                "{name} cannot climb here: the gap is too large ({:.1}m).",
                tile.climb_height
            ));
            consume_action(self);
            return Ok(outcome);
        }
        if self.room.occupant_of(target).is_some() {
            outcome
                .narration
                .push(format!("{name} cannot climb over: someone is in the way."));
            consume_action(self);
            return Ok(outcome);
        }

        let climb_direction = ClimbDirection::from_height_gap(tile.elevation - here_elevation);
        let check = ClimbCheck::new(climb_direction, tile.climb_height);
        let strength_mod = self.actor(name)?.sheet.attributes.strength_mod();
        let mut roll = roller.roll(DiceExpr::D20, 0);
        roll.total += strength_mod;

        let (dx, dy) = direction.delta();
        let step_m = if dx != 0 && dy != 0 {
            self.config.units_to_m(std::f32::consts::SQRT_2)
        } else {
            self.config.meters_per_unit
        };

        match check.outcome(&roll) {
            ClimbOutcome::Success => {
                let actor = self.room.actor_mut(name).expect("actor checked above");
                actor.position = target;
                actor.turn_toward(direction);
                actor.movement_left_m = (actor.movement_left_m - step_m).max(0.0);
                outcome.narration.push(format!(
                    "{name} climbs {climb_direction} over the {} cleanly.",
                    tile.description
                ));
            }
            ClimbOutcome::Partial => {
                let actor = self.room.actor_mut(name).expect("actor checked above");
                actor.position = target;
                actor.turn_toward(direction);
                actor.movement_left_m = 0.0;
                outcome.narration.push(format!(
                    "{name} scrambles {climb_direction} over the {}, losing momentum.",
                    tile.description
                ));
            }
            ClimbOutcome::CriticalFail => {
                let damage = roller.roll(check.fall_damage(), 0).total.max(0);
                let actor = self.room.actor_mut(name).expect("actor checked above");
                let died = actor.sheet.apply_damage(damage);
                outcome.narration.push(format!(
                    "{name} slips off the {} and falls, taking {damage} damage.",
                    tile.description
                ));
                if died {
                    outcome.narration.push(format!("{name} collapses."));
                    outcome.slain = Some(name.to_string());
                }
            }
        }

        consume_action(self);
        Ok(outcome)
    }
}
