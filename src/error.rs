//! Error types for the engine.
//!
//! Rules-level rejections ([`MoveError`]) leave the board untouched. A search
//! started on a finished position is a caller bug and is reported as
//! [`SearchError::TerminalPosition`] rather than answered with a made-up move.

use thiserror::Error;

/// A placement the rules refuse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("illegal move: ({x}, {y}) is outside the {size}x{size} board")]
    OutOfBounds { x: usize, y: usize, size: usize },

    #[error("illegal move: ({x}, {y}) is not empty")]
    Occupied { x: usize, y: usize },

    #[error("illegal move: ({x}, {y}) flips no stones")]
    NoFlips { x: usize, y: usize },
}

/// Failures of a tree search.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("search started on a finished game: neither side has a legal move")]
    TerminalPosition,

    #[error("search needs at least one iteration")]
    NoIterations,

    #[error("search worker panicked before reporting a result")]
    WorkerPanicked,
}

/// Rejected engine configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "invalid board size {size}: must be even and between {min} and {max}",
        min = crate::constants::MIN_BOARD_SIZE,
        max = crate::constants::MAX_BOARD_SIZE
    )]
    InvalidBoardSize { size: usize },

    #[error("iteration budget must be positive")]
    NoSimulations,
}

/// Malformed coordinates or board diagrams.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid coordinate '{input}'")]
    InvalidPoint { input: String },

    #[error("board diagram row {row} has {got} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        got: usize,
        expected: usize,
    },

    #[error("invalid cell character '{character}' in board diagram")]
    InvalidCell { character: char },
}

/// Everything a [`GameSession`](crate::session::GameSession) command can fail with.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error(transparent)]
    Move(#[from] MoveError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("game already over")]
    GameOver,

    #[error("it is not the human player's turn")]
    NotHumanTurn,

    #[error("it is not the computer's turn")]
    NotComputerTurn,

    #[error("a search is still running")]
    SearchInFlight,

    #[error("search result no longer matches the position")]
    StaleSearch,

    #[error("no human move to take back")]
    NothingToUndo,
}
