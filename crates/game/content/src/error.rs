//! Content-loading errors.

use std::path::PathBuf;

use skirmish_core::{GridError, RoomError};

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("theme '{0}' has no floor entry (' ') to fall back on")]
    MissingFloor(String),

    #[error("room '{room}' has an invalid tile grid")]
    Map {
        room: String,
        #[source]
        source: GridError,
    },

    #[error("room '{room}' cannot place '{name}'")]
    Placement {
        room: String,
        name: String,
        #[source]
        source: RoomError,
    },

    #[error("room '{room}' references unknown facing '{facing}' for '{name}'")]
    BadFacing {
        room: String,
        name: String,
        facing: String,
    },
}
