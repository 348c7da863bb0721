//! CLI configuration from environment variables.
use std::env;
use std::path::PathBuf;

use directories::ProjectDirs;

/// Terminal client configuration.
///
/// Environment variables:
/// - `SKIRMISH_DATA` — content directory (themes/, rooms/, characters/,
///   tables.yaml, gates.yaml); defaults to `./data`
/// - `SKIRMISH_SAVES` — save directory; defaults to the platform data dir
/// - `SKIRMISH_START_ROOM` — opening room name (default `clearing`)
/// - `SKIRMISH_MODEL` — ollama model for auto-controlled actors; unset
///   means uniform-random NPC decisions
/// - `SKIRMISH_RESUME` — set to `1` to restore the latest checkpoint
/// - `SKIRMISH_LOG` — tracing filter (default `info`)
#[derive(Clone, Debug)]
pub struct CliConfig {
    pub data_dir: PathBuf,
    pub save_dir: PathBuf,
    pub start_room: String,
    pub model: Option<String>,
    pub resume: bool,
    pub log_filter: String,
}

impl CliConfig {
    pub fn from_env() -> Self {
        let data_dir = env::var("SKIRMISH_DATA")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let save_dir = env::var("SKIRMISH_SAVES").map(PathBuf::from).unwrap_or_else(|_| {
            ProjectDirs::from("", "", "skirmish")
                .map(|dirs| dirs.data_dir().join("saves"))
                .unwrap_or_else(|| PathBuf::from("saves"))
        });

        Self {
            data_dir,
            save_dir,
            start_room: env::var("SKIRMISH_START_ROOM")
                .unwrap_or_else(|_| "clearing".to_string()),
            model: env::var("SKIRMISH_MODEL").ok().filter(|m| !m.is_empty()),
            resume: env::var("SKIRMISH_RESUME").is_ok_and(|v| v == "1"),
            log_filter: env::var("SKIRMISH_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }
}
