use thiserror::Error;

/// Why a move was refused. Returning any of these leaves the game untouched.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Cell is not available for this move")]
    CellUnavailable,
    #[error("Column is full")]
    ColumnFull,
    #[error("Waiting for the other player")]
    NotYourTurn,
    #[error("Cannot turn back on yourself")]
    Reversal,
    #[error("Waiting for the flipped pair to settle")]
    PairPending,
    #[error("Word must be {0} letters")]
    WordLength(usize),
    #[error("Not in word list")]
    NotInWordList,
    #[error("Too many mines")]
    TooManyMines,
    #[error("Board is too large")]
    BoardTooLarge,
    #[error("Unknown game identifier")]
    UnknownGame,
    #[error("Game is paused")]
    Paused,
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
}

pub type Result<T> = core::result::Result<T, GameError>;
