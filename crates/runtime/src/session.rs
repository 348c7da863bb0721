//! The session: an explicit round loop over one live room.
//!
//! Round flow: filter the roster, roll initiative, drive each actor's turn
//! (enumerate options → ask the decision provider → apply), advance the
//! clock, checkpoint the save, run the end-of-round rest pass, then
//! resolve a gate transition once the whole party has funneled into one.
//! The loop is iterative by construction — long campaigns must not grow
//! the call stack.

use std::collections::HashMap;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use skirmish_content::{DataTables, RoomFile, Theme};
use skirmish_core::{
    Actor, Conditions, ControlMode, DiceRoller, Faction, GameConfig, GateDirectory, Position,
    RandomRoller, Room, SheetLibrary, TurnEngine, active_actors, crown, initiative_order,
    legal_actions, perceive, resolve_label,
};

use crate::error::RuntimeError;
use crate::providers::DecisionProvider;
use crate::repository::{SaveGame, SaveRepository};
use crate::GameClock;

/// Frontend surface for narration and the round-end prompt.
///
/// This is presentation only; skipping output never changes game state.
pub trait Console {
    fn banner(&mut self, text: &str);
    fn line(&mut self, text: &str);
    /// Renders the current room overlay; the default drops it.
    fn map(&mut self, _rows: &[String]) {}
    /// Round-end gate: return false to end the session.
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Headless console for tests and tools: swallows output, runs a fixed
/// number of rounds.
pub struct SilentConsole {
    pub rounds_to_play: u32,
}

impl Console for SilentConsole {
    fn banner(&mut self, _text: &str) {}
    fn line(&mut self, _text: &str) {}
    fn confirm(&mut self, _prompt: &str) -> bool {
        if self.rounds_to_play == 0 {
            return false;
        }
        self.rounds_to_play -= 1;
        true
    }
}

/// Builder for [`Session`]; rooms, themes, and sheets are registered by
/// name, then `start_in` picks the opening room.
pub struct SessionBuilder {
    config: GameConfig,
    tables: DataTables,
    themes: HashMap<String, Theme>,
    room_files: HashMap<String, RoomFile>,
    sheets: SheetLibrary,
    gates: GateDirectory,
    start_room: Option<String>,
    repository: Option<Box<dyn SaveRepository>>,
    manual: Option<Box<dyn DecisionProvider>>,
    auto: Option<Box<dyn DecisionProvider>>,
    roller: Option<Box<dyn DiceRoller>>,
    tiebreak_seed: Option<u64>,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self {
            config: GameConfig::default(),
            tables: DataTables::default(),
            themes: HashMap::new(),
            room_files: HashMap::new(),
            sheets: SheetLibrary::new(),
            gates: GateDirectory::default(),
            start_room: None,
            repository: None,
            manual: None,
            auto: None,
            roller: None,
            tiebreak_seed: None,
        }
    }

    pub fn config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    pub fn tables(mut self, tables: DataTables) -> Self {
        self.tables = tables;
        self
    }

    pub fn theme(mut self, theme: Theme) -> Self {
        self.themes.insert(theme.name.clone(), theme);
        self
    }

    pub fn room(mut self, room: RoomFile) -> Self {
        self.room_files.insert(room.name.clone(), room);
        self
    }

    pub fn sheets(mut self, sheets: SheetLibrary) -> Self {
        self.sheets = sheets;
        self
    }

    pub fn gates(mut self, gates: GateDirectory) -> Self {
        self.gates = gates;
        self
    }

    pub fn start_in(mut self, room: impl Into<String>) -> Self {
        self.start_room = Some(room.into());
        self
    }

    pub fn repository(mut self, repository: Box<dyn SaveRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn manual_provider(mut self, provider: Box<dyn DecisionProvider>) -> Self {
        self.manual = Some(provider);
        self
    }

    pub fn auto_provider(mut self, provider: Box<dyn DecisionProvider>) -> Self {
        self.auto = Some(provider);
        self
    }

    pub fn roller(mut self, roller: Box<dyn DiceRoller>) -> Self {
        self.roller = Some(roller);
        self
    }

    /// Seeds the initiative tiebreak draw; defaults to entropy.
    pub fn tiebreak_seed(mut self, seed: u64) -> Self {
        self.tiebreak_seed = Some(seed);
        self
    }

    pub fn build(self, console: Box<dyn Console>) -> Result<Session, RuntimeError> {
        let start = self
            .start_room
            .ok_or_else(|| RuntimeError::UnknownRoom("<unset>".to_string()))?;
        let room = build_room(&self.room_files, &self.themes, &self.sheets, &self.gates, &start)?;

        let auto = self
            .auto
            .unwrap_or_else(|| Box::new(crate::providers::RandomProvider::new()));
        // Without a terminal frontend, manual actors fall back to the
        // automatic source too.
        let manual = self.manual.unwrap_or_else(|| {
            Box::new(crate::providers::RandomProvider::new())
        });

        Ok(Session {
            config: self.config,
            tables: self.tables,
            themes: self.themes,
            room_files: self.room_files,
            sheets: self.sheets,
            room,
            gates: self.gates,
            clock: GameClock::default(),
            round: 0,
            repository: self.repository,
            manual,
            auto,
            roller: self
                .roller
                .unwrap_or_else(|| Box::new(RandomRoller::new())),
            tiebreak_rng: match self.tiebreak_seed {
                Some(seed) => SmallRng::seed_from_u64(seed),
                None => SmallRng::from_entropy(),
            },
            console,
        })
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn build_room(
    room_files: &HashMap<String, RoomFile>,
    themes: &HashMap<String, Theme>,
    sheets: &SheetLibrary,
    gates: &GateDirectory,
    name: &str,
) -> Result<Room, RuntimeError> {
    let file = room_files
        .get(name)
        .ok_or_else(|| RuntimeError::UnknownRoom(name.to_string()))?;
    let theme = themes
        .get(&file.theme)
        .ok_or_else(|| RuntimeError::UnknownTheme(file.theme.clone()))?;
    let mut room = file.build(theme, sheets)?;
    room.set_gate_markers(gates.markers_in(name));
    Ok(room)
}

/// One running game.
pub struct Session {
    config: GameConfig,
    tables: DataTables,
    themes: HashMap<String, Theme>,
    room_files: HashMap<String, RoomFile>,
    sheets: SheetLibrary,
    room: Room,
    gates: GateDirectory,
    clock: GameClock,
    round: u32,
    repository: Option<Box<dyn SaveRepository>>,
    manual: Box<dyn DecisionProvider>,
    auto: Box<dyn DecisionProvider>,
    roller: Box<dyn DiceRoller>,
    tiebreak_rng: SmallRng,
    console: Box<dyn Console>,
}

impl Session {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn clock(&self) -> GameClock {
        self.clock
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    /// Runs rounds until the console declines to continue.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        loop {
            self.run_round()?;
            if !self.console.confirm("Continue to the next round? (y/n)") {
                tracing::info!(round = self.round, "session ended at round boundary");
                return Ok(());
            }
        }
    }

    /// One complete round: initiative, every turn, checkpoint, rest pass,
    /// and a possible room transition.
    pub fn run_round(&mut self) -> Result<(), RuntimeError> {
        self.round += 1;
        self.console.banner(&format!(
            "=== ROUND {} — {}, {} ===",
            self.round,
            self.room.name(),
            self.clock
        ));
        self.console.map(&self.room.symbol_grid());

        let names = active_actors(&self.room);
        let refs: Vec<&Actor> = names
            .iter()
            .filter_map(|name| self.room.actor(name))
            .collect();
        let order = initiative_order(&refs, self.roller.as_mut(), || {
            self.tiebreak_rng.r#gen::<f64>()
        });
        for entry in &order {
            self.console
                .line(&format!("{} initiative: {}", entry.name, entry.score));
        }

        for entry in order {
            // Actors can die or leave mid-round.
            let still_active = self
                .room
                .actor(&entry.name)
                .is_some_and(|a| a.is_active());
            if !still_active {
                continue;
            }
            self.run_turn(&entry.name)?;
            self.clock.advance_seconds(self.config.base_turn_seconds);
        }

        self.checkpoint()?;
        self.rest_pass();

        if self.party_in_transit() {
            self.resolve_transition()?;
        }
        Ok(())
    }

    /// One actor's turn: budgets up, then the decide/apply loop until the
    /// engine reports the turn over.
    fn run_turn(&mut self, name: &str) -> Result<(), RuntimeError> {
        self.console.banner(&format!("--- {name}'s turn ---"));
        {
            let mut engine = TurnEngine::new(&mut self.room, &self.tables, &self.config);
            engine.begin_turn(name)?;
        }

        loop {
            let perception = perceive(&self.room, name, &self.config)?;
            let actor = self
                .room
                .actor(name)
                .ok_or_else(|| {
                    RuntimeError::Room(skirmish_core::RoomError::UnknownActor(name.to_string()))
                })?;
            let options = legal_actions(&self.room, actor, &perception, &self.tables, &self.config);
            let context = turn_context(actor, &perception, &self.config);

            let provider = match actor.control {
                ControlMode::Manual => self.manual.as_mut(),
                _ => self.auto.as_mut(),
            };
            let decision = provider.choose(&context, &options)?;

            let command = resolve_label(&options, &decision.label)
                .ok_or_else(|| RuntimeError::UnknownAction(decision.label.clone()))?
                .clone();
            tracing::debug!(actor = name, action = %command, "applying action");

            if let Some(comment) = &decision.comment {
                self.console.line(&format!("{name}: \"{comment}\""));
            }

            let outcome = {
                let mut engine = TurnEngine::new(&mut self.room, &self.tables, &self.config);
                engine.take_action(name, &command, self.roller.as_mut())?
            };

            for line in &outcome.narration {
                self.console.line(line);
            }
            if let Some(gate) = &outcome.entered_gate {
                self.gates.enter(gate, name)?;
            }
            if outcome.turn_over {
                return Ok(());
            }
        }
    }

    fn checkpoint(&mut self) -> Result<(), RuntimeError> {
        let Some(repository) = &self.repository else {
            return Ok(());
        };
        let snapshot = self.snapshot();
        repository.save(&snapshot)?;
        tracing::info!(round = self.round, "checkpoint saved");
        Ok(())
    }

    /// Current state as a round-boundary snapshot.
    pub fn snapshot(&self) -> SaveGame {
        SaveGame {
            round: self.round,
            clock: self.clock,
            room_name: self.room.name().to_string(),
            actors: self
                .room
                .actors()
                .map(|a| (a.name.clone(), a.clone()))
                .collect(),
            loots: self
                .room
                .loots()
                .map(|l| (l.name.clone(), l.clone()))
                .collect(),
            gates: self.gates.clone(),
        }
    }

    /// Restores a snapshot: terrain from the room definition, entities
    /// from the save. On failure the previous state is left untouched.
    pub fn restore(&mut self, snapshot: SaveGame) -> Result<(), RuntimeError> {
        let file = self
            .room_files
            .get(&snapshot.room_name)
            .ok_or_else(|| RuntimeError::UnknownRoom(snapshot.room_name.clone()))?;
        let theme = self
            .themes
            .get(&file.theme)
            .ok_or_else(|| RuntimeError::UnknownTheme(file.theme.clone()))?;

        let mut room = file.build_terrain(theme)?;
        for (_, actor) in snapshot.actors {
            room.add_actor(actor)?;
        }
        for (_, loot) in snapshot.loots {
            room.add_loot(loot)?;
        }
        room.set_gate_markers(snapshot.gates.markers_in(&snapshot.room_name));

        self.room = room;
        self.gates = snapshot.gates;
        self.clock = snapshot.clock;
        self.round = snapshot.round;
        tracing::info!(round = self.round, room = %self.room.name(), "snapshot restored");
        Ok(())
    }

    /// End-of-round recovery: resting actors spend their flag to heal one
    /// hit die.
    fn rest_pass(&mut self) {
        let resting: Vec<String> = self
            .room
            .actors()
            .filter(|a| a.sheet.conditions.contains(Conditions::RESTING))
            .map(|a| a.name.clone())
            .collect();
        for name in resting {
            let hit_dice = self.room.actor(&name).map(|a| a.sheet.hit_dice);
            let Some(hit_dice) = hit_dice else { continue };
            let recovered = self.roller.roll(hit_dice, 0).total.max(0);
            if let Some(actor) = self.room.actor_mut(&name) {
                actor.sheet.heal(recovered);
                actor.sheet.conditions.remove(Conditions::RESTING);
                self.console
                    .line(&format!("{name} rests and recovers {recovered} HP."));
            }
        }
    }

    /// The party is in transit when every living player-faction actor is
    /// queued in the active gate.
    fn party_in_transit(&self) -> bool {
        let Some(gate) = self.gates.active_gate() else {
            return false;
        };
        let mut party = self
            .room
            .actors()
            .filter(|a| a.sheet.faction == Faction::Player && a.is_active())
            .peekable();
        if party.peek().is_none() {
            return false;
        }
        party.all(|a| gate.travelers.contains(&a.name))
    }

    /// Swaps the active room: travelers are pulled out of the old room,
    /// the destination is built fresh, and the clock jumps by the travel
    /// time.
    fn resolve_transition(&mut self) -> Result<(), RuntimeError> {
        let passage = self.gates.resolve(self.room.name())?;
        self.clock.advance_hours(passage.duration_hours);
        self.console.banner(&format!(
            "At {}, {} arrived in {}",
            self.clock,
            passage.travelers.join(", "),
            passage.destination_room
        ));

        let mut next = build_room(
            &self.room_files,
            &self.themes,
            &self.sheets,
            &self.gates,
            &passage.destination_room,
        )?;

        for name in &passage.travelers {
            let mut actor = self.room.remove_actor(name)?;
            let landing = free_tile_near(&next, passage.destination_pos)
                .ok_or(RuntimeError::NoArrivalTile(passage.destination_pos))?;
            actor.position = landing;
            actor.sheet.objective = Some(passage.objective.clone());
            next.add_actor(actor)?;
        }

        self.room = next;
        tracing::info!(room = %self.room.name(), "room transition resolved");
        Ok(())
    }
}

/// Nearest passable, unoccupied tile to `origin`, scanning outward crown
/// by crown.
fn free_tile_near(room: &Room, origin: Position) -> Option<Position> {
    let dims = room.map().dimensions();
    for radius in 0..dims.width.max(dims.height) as i32 {
        let ring = crown(origin, dims, radius);
        if radius > 0 && ring.is_empty() {
            return None;
        }
        for pos in ring {
            let passable = room.map().tile(pos).is_some_and(|t| t.is_passable());
            if passable && room.occupant_of(pos).is_none() {
                return Some(pos);
            }
        }
    }
    None
}

/// Context string handed to decision providers: who you are, what you
/// see, what you have left.
fn turn_context(
    actor: &Actor,
    perception: &skirmish_core::Perception,
    config: &GameConfig,
) -> String {
    let mut context = String::new();
    context.push_str(&actor.sheet.summary());
    context.push('\n');
    if let Some(objective) = &actor.sheet.objective {
        context.push_str(&format!("Objective: {objective}\n"));
    }
    if let Some(last) = &actor.last_action {
        context.push_str(&format!("Last action: {last}\n"));
    }
    context.push_str(&perception.report(actor, config));
    context.push_str(&format!(
        "\nRemaining moves: {:.0}m, actions: {}\n",
        actor.movement_left_m, actor.actions_left
    ));
    context
}
