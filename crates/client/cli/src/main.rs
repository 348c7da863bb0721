//! Skirmish terminal client.
//!
//! Composition root: loads the content directory, assembles the session
//! (manual player input, random or model-driven NPCs, file checkpoints),
//! and runs the round loop until the player quits.

mod config;
mod console;
mod logging;
mod manual;

use std::path::Path;

use anyhow::{Context, Result};

use skirmish_content::{load_gates, load_room, load_sheet_library, load_tables, load_theme};
use skirmish_runtime::{
    DecisionProvider, FileSaveRepository, OllamaProvider, RandomProvider, RepositoryError,
    RuntimeError, SaveRepository, Session,
};

use config::CliConfig;
use console::TerminalConsole;
use manual::ManualProvider;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = CliConfig::from_env();
    let _log_guard = logging::setup(&cli.save_dir.join("logs"), &cli.log_filter)?;

    tracing::info!(data = %cli.data_dir.display(), "starting skirmish");

    let mut builder = Session::builder().start_in(cli.start_room.clone());

    // Content: themes and rooms are directories of YAML files; tables,
    // characters, and gates are optional extras.
    for path in yaml_files(&cli.data_dir.join("themes"))? {
        builder = builder.theme(load_theme(&path)?);
    }
    let room_paths = yaml_files(&cli.data_dir.join("rooms"))?;
    if room_paths.is_empty() {
        anyhow::bail!(
            "no room files found under {}",
            cli.data_dir.join("rooms").display()
        );
    }
    for path in room_paths {
        builder = builder.room(load_room(&path)?);
    }

    let characters_dir = cli.data_dir.join("characters");
    if characters_dir.is_dir() {
        builder = builder.sheets(load_sheet_library(&characters_dir)?);
    }
    let tables_path = cli.data_dir.join("tables.yaml");
    if tables_path.is_file() {
        builder = builder.tables(load_tables(&tables_path)?);
    }
    let gates_path = cli.data_dir.join("gates.yaml");
    if gates_path.is_file() {
        builder = builder.gates(load_gates(&gates_path)?);
    }

    let auto: Box<dyn DecisionProvider> = match &cli.model {
        Some(model) => {
            tracing::info!(%model, "NPC decisions via ollama");
            Box::new(OllamaProvider::new(model.clone()))
        }
        None => Box::new(RandomProvider::new()),
    };

    let repository = FileSaveRepository::new(&cli.save_dir)
        .with_context(|| format!("opening save dir {}", cli.save_dir.display()))?;

    let mut session = builder
        .manual_provider(Box::new(ManualProvider))
        .auto_provider(auto)
        .repository(Box::new(FileSaveRepository::new(&cli.save_dir)?))
        .build(Box::new(TerminalConsole))
        .context("assembling the session")?;

    if cli.resume {
        match repository.load_latest() {
            Ok(snapshot) => {
                tracing::info!(round = snapshot.round, "resuming from checkpoint");
                session.restore(snapshot)?;
            }
            Err(RepositoryError::NotFound(_)) => {
                tracing::info!("no checkpoint to resume, starting fresh");
            }
            Err(err) => return Err(err.into()),
        }
    }

    match session.run() {
        Ok(()) => Ok(()),
        Err(RuntimeError::Provider(err)) => {
            // Player closed stdin; leave quietly, the checkpoint is safe.
            tracing::info!(%err, "input ended, shutting down");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

/// All `*.yaml`/`*.yml` files directly inside `dir`, sorted for
/// reproducible load order. A missing directory is just empty.
fn yaml_files(dir: &Path) -> Result<Vec<std::path::PathBuf>> {
    let mut paths = Vec::new();
    if !dir.is_dir() {
        return Ok(paths);
    }
    for entry in std::fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
        if is_yaml {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
