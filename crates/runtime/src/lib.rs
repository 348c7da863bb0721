//! Session orchestration for the tactical engine.
//!
//! This crate wires decision providers, loaded content, and the save-game
//! repository into a [`Session`] that drives rounds: initiative, per-actor
//! turn loops, checkpointing, and gate transitions. Everything is strictly
//! single-threaded and turn-sequential; the only suspension points are the
//! blocking [`DecisionProvider`] calls.
pub mod clock;
pub mod error;
pub mod providers;
pub mod repository;
pub mod session;

pub use clock::GameClock;
pub use error::RuntimeError;
pub use providers::{Decision, DecisionProvider, OllamaProvider, ProviderError, RandomProvider};
pub use repository::{FileSaveRepository, RepositoryError, SaveGame, SaveRepository};
pub use session::{Console, Session, SessionBuilder, SilentConsole};
