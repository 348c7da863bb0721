//! Character sheet files.
//!
//! Sheets serialize field-for-field through the core's serde derives, so
//! a loader is just a typed YAML read plus the directory walk for whole
//! parties.

use std::path::Path;

use skirmish_core::{CharacterSheet, SheetLibrary};

use crate::ContentError;

/// Loads a single character sheet.
pub fn load_sheet(path: &Path) -> Result<CharacterSheet, ContentError> {
    crate::read_yaml(path)
}

/// Loads every `*.yaml`/`*.yml` sheet in a directory into a library keyed
/// by character name.
pub fn load_sheet_library(dir: &Path) -> Result<SheetLibrary, ContentError> {
    let mut library = SheetLibrary::new();
    let entries = std::fs::read_dir(dir).map_err(|source| ContentError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| ContentError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
        if !is_yaml {
            continue;
        }
        let sheet = load_sheet(&path)?;
        library.insert(sheet.name.clone(), sheet);
    }
    tracing::debug!("loaded {} character sheets from {}", library.len(), dir.display());
    Ok(library)
}
