//! Data loading for the tactical engine.
//!
//! Everything on disk is YAML: themes (symbol → tile specs), room maps,
//! character sheets, gates, and the equipment/spell tables. Loaders parse
//! into plain structs and build the core types; nothing here is cached in
//! globals — the session constructs one repository of each kind at start
//! and passes references down.
mod error;
mod gates_file;
mod room_file;
mod sheet_file;
mod tables_file;
mod theme;

pub use error::ContentError;
pub use gates_file::load_gates;
pub use room_file::{ActorPlacement, AsciiMap, LootPlacement, RoomFile, load_room};
pub use sheet_file::{load_sheet, load_sheet_library};
pub use tables_file::{DataTables, load_tables};
pub use theme::{Theme, TileSpec, load_theme};

use std::path::Path;

use serde::de::DeserializeOwned;

/// Reads and parses one YAML file, wrapping failures with the path.
pub(crate) fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, ContentError> {
    let text = std::fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value = serde_yaml::from_str(&text).map_err(|source| ContentError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("loaded {}", path.display());
    Ok(value)
}
