//! Error type shared by the board, the engine and the worker boundary

use thiserror::Error;

/// Errors surfaced to callers of the engine.
///
/// The type is `Clone` so a failed move request can be sent back across the
/// worker channel unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Coordinates outside the 15x15 grid. Both coordinate variants use `i32`
    /// so off-board input such as `(-1, 4)` can be reported as given.
    #[error("move ({row}, {col}) is off the board")]
    OutOfBounds { row: i32, col: i32 },

    /// Target cell already holds a stone
    #[error("cell ({row}, {col}) is already occupied")]
    Occupied { row: i32, col: i32 },

    /// The candidate set was empty, so there is nothing to search
    #[error("no move available")]
    NoMoveAvailable,

    /// Text board could not be parsed
    #[error("invalid board: {0}")]
    InvalidBoard(String),

    /// Unrecognised side or outcome name
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration file could not be read or parsed
    #[error("configuration error: {0}")]
    Config(String),

    /// The engine thread has exited
    #[error("engine worker disconnected")]
    WorkerDisconnected,
}
