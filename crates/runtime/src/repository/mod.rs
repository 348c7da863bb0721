//! Save-game persistence.
//!
//! Snapshots are written at round boundaries only; there is no
//! partial-round recovery, and a reload always restores to the last
//! completed round. Terrain is not persisted — rooms are rebuilt from
//! their definition files and the snapshot re-seeds the live entities.

mod file;

pub use file::FileSaveRepository;

use std::collections::BTreeMap;

use skirmish_core::{Actor, GateDirectory, Loot};

use crate::clock::GameClock;

/// One durable checkpoint of a session, taken at a round boundary.
#[derive(Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct SaveGame {
    pub round: u32,
    pub clock: GameClock,
    pub room_name: String,
    pub actors: BTreeMap<String, Actor>,
    pub loots: BTreeMap<String, Loot>,
    pub gates: GateDirectory,
}

/// Repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("no save found{}", .0.as_ref().map(|r| format!(" for round {r}")).unwrap_or_default())]
    NotFound(Option<u32>),

    #[error("save I/O failed")]
    Io(#[from] std::io::Error),

    #[error("save (de)serialization failed")]
    Serialization(#[from] serde_yaml::Error),
}

/// Storage for session checkpoints.
pub trait SaveRepository {
    fn save(&self, snapshot: &SaveGame) -> Result<(), RepositoryError>;
    fn load_round(&self, round: u32) -> Result<SaveGame, RepositoryError>;
    fn load_latest(&self) -> Result<SaveGame, RepositoryError>;
    fn rounds(&self) -> Result<Vec<u32>, RepositoryError>;
}
