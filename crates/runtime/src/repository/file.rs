//! File-based save repository.
//!
//! One YAML file per round, `round_<n>.yaml`, written atomically through
//! a temp file + rename so a crash mid-write never corrupts the previous
//! checkpoint.

use std::fs;
use std::path::{Path, PathBuf};

use super::{RepositoryError, SaveGame, SaveRepository};

pub struct FileSaveRepository {
    base_dir: PathBuf,
}

impl FileSaveRepository {
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self, RepositoryError> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn round_path(&self, round: u32) -> PathBuf {
        self.base_dir.join(format!("round_{round}.yaml"))
    }
}

impl SaveRepository for FileSaveRepository {
    fn save(&self, snapshot: &SaveGame) -> Result<(), RepositoryError> {
        let path = self.round_path(snapshot.round);
        let temp_path = path.with_extension("yaml.tmp");

        let text = serde_yaml::to_string(snapshot)?;
        fs::write(&temp_path, text)?;
        fs::rename(&temp_path, &path)?;

        tracing::debug!("saved round {} to {}", snapshot.round, path.display());
        Ok(())
    }

    fn load_round(&self, round: u32) -> Result<SaveGame, RepositoryError> {
        let path = self.round_path(round);
        if !path.exists() {
            return Err(RepositoryError::NotFound(Some(round)));
        }
        let text = fs::read_to_string(&path)?;
        let snapshot = serde_yaml::from_str(&text)?;
        tracing::debug!("loaded round {round} from {}", path.display());
        Ok(snapshot)
    }

    fn load_latest(&self) -> Result<SaveGame, RepositoryError> {
        let latest = self
            .rounds()?
            .into_iter()
            .max()
            .ok_or(RepositoryError::NotFound(None))?;
        self.load_round(latest)
    }

    fn rounds(&self) -> Result<Vec<u32>, RepositoryError> {
        let mut rounds = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(number) = name
                .strip_prefix("round_")
                .and_then(|rest| rest.strip_suffix(".yaml"))
            {
                if let Ok(round) = number.parse() {
                    rounds.push(round);
                }
            }
        }
        rounds.sort_unstable();
        Ok(rounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::{Actor, CharacterSheet, GateDirectory, Position};
    use std::collections::BTreeMap;

    fn snapshot(round: u32) -> SaveGame {
        let mut actors = BTreeMap::new();
        let mut liora = Actor::new(CharacterSheet::named("liora"), '@', Position::new(2, 3));
        liora.sheet.current_hp = 7;
        actors.insert("liora".to_string(), liora);
        SaveGame {
            round,
            clock: crate::clock::GameClock::default(),
            room_name: "clearing".to_string(),
            actors,
            loots: BTreeMap::new(),
            gates: GateDirectory::default(),
        }
    }

    #[test]
    fn snapshots_round_trip_through_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileSaveRepository::new(dir.path()).unwrap();

        let original = snapshot(3);
        repo.save(&original).unwrap();
        let loaded = repo.load_round(3).unwrap();
        assert_eq!(loaded, original);

        let liora = &loaded.actors["liora"];
        assert_eq!(liora.position, Position::new(2, 3));
        assert_eq!(liora.sheet.current_hp, 7);
    }

    #[test]
    fn latest_picks_the_highest_round() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileSaveRepository::new(dir.path()).unwrap();
        repo.save(&snapshot(1)).unwrap();
        repo.save(&snapshot(7)).unwrap();
        repo.save(&snapshot(4)).unwrap();

        assert_eq!(repo.rounds().unwrap(), vec![1, 4, 7]);
        assert_eq!(repo.load_latest().unwrap().round, 7);
    }

    #[test]
    fn missing_saves_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileSaveRepository::new(dir.path()).unwrap();
        assert!(matches!(
            repo.load_round(9),
            Err(RepositoryError::NotFound(Some(9)))
        ));
        assert!(matches!(
            repo.load_latest(),
            Err(RepositoryError::NotFound(None))
        ));
    }
}
