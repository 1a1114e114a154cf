//! Errors raised by rule engines and the game registry.

use thiserror::Error;

/// Failure constructing or driving a game machine.
#[derive(Debug, Error)]
pub enum GameError {
    /// Player list length outside the game's supported range.
    #[error("invalid number of players: {count} (expected {min}..={max})")]
    InvalidPlayerCount { count: usize, min: usize, max: usize },

    /// No game is registered under this name.
    #[error("unknown game: {0}")]
    UnknownGame(String),

    /// A stored snapshot does not match the game's data shapes.
    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(#[source] serde_json::Error),

    /// An action payload does not match the game's action type.
    #[error("malformed action: {0}")]
    MalformedAction(#[source] serde_json::Error),

    /// Game data could not be encoded as JSON.
    #[error("failed to encode game data: {0}")]
    Encode(#[source] serde_json::Error),
}
