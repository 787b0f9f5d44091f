//! Error types returned at the engine's API boundary.

use thiserror::Error;

/// Why a move was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoveError {
    /// Point is not empty
    #[error("illegal move: point not empty")]
    Occupied,
    /// Move retakes a ko immediately
    #[error("illegal move: retakes ko")]
    Ko,
    /// Move would leave its own string without liberties
    #[error("illegal move: suicide")]
    Suicide,
    /// Move repeats an earlier board position
    #[error("illegal move: positional superko")]
    Superko,
    /// Vertex is not a point of the current board
    #[error("illegal move: vertex {0} is off the board")]
    OffBoard(usize),
}

/// Recoverable engine errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GoError {
    #[error(transparent)]
    Move(#[from] MoveError),
    #[error("unsupported board size {0}")]
    BoardSize(usize),
    #[error("invalid handicap of {stones} stones on a {size}x{size} board")]
    Handicap { stones: usize, size: usize },
    #[error("cannot parse coordinate {0:?}")]
    Coordinate(String),
    #[error("handicap stones must be placed on an empty board")]
    BoardNotEmpty,
}
