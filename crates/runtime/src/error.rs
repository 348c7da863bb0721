//! Runtime error umbrella.

use skirmish_content::ContentError;
use skirmish_core::{GateError, RoomError, TurnError};

use crate::providers::ProviderError;
use crate::repository::RepositoryError;

/// Failures surfaced by the session driver. Unknown actions and gate
/// mismatches are programming errors that abort the round; the rest wrap
/// lower layers.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The decision layer returned a label the engine never offered.
    /// Never ignored: the round aborts.
    #[error("unrecognized action '{0}' from the decision provider")]
    UnknownAction(String),

    #[error("no room named '{0}' is loaded")]
    UnknownRoom(String),

    #[error("no theme named '{0}' is loaded")]
    UnknownTheme(String),

    #[error("no free tile near {0} to place an arriving traveler")]
    NoArrivalTile(skirmish_core::Position),

    #[error(transparent)]
    Turn(#[from] TurnError),

    #[error(transparent)]
    Room(#[from] RoomError),

    #[error(transparent)]
    Gate(#[from] GateError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
