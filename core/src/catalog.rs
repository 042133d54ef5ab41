use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Board,
    Puzzle,
    Word,
    Arcade,
}

impl Category {
    pub const ALL: [Category; 4] = [Self::Board, Self::Puzzle, Self::Word, Self::Arcade];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Board => "Board games",
            Self::Puzzle => "Puzzles",
            Self::Word => "Word games",
            Self::Arcade => "Arcade",
        }
    }
}

/// Every playable game, addressable by its identifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameKind {
    TicTacToe,
    Snake,
    FlappyBird,
    Tetris,
    Minesweeper,
    PacMan,
    Memory,
    ConnectFour,
    Wordle,
    Pong,
}

impl GameKind {
    pub const ALL: [GameKind; 10] = [
        Self::TicTacToe,
        Self::Snake,
        Self::FlappyBird,
        Self::Tetris,
        Self::Minesweeper,
        Self::PacMan,
        Self::Memory,
        Self::ConnectFour,
        Self::Wordle,
        Self::Pong,
    ];

    pub const fn id(self) -> &'static str {
        use GameKind::*;
        match self {
            TicTacToe => "tic-tac-toe",
            Snake => "snake",
            FlappyBird => "flappy-bird",
            Tetris => "tetris",
            Minesweeper => "minesweeper",
            PacMan => "pacman",
            Memory => "memory-game",
            ConnectFour => "connect-four",
            Wordle => "wordle",
            Pong => "pong",
        }
    }

    pub const fn title(self) -> &'static str {
        use GameKind::*;
        match self {
            TicTacToe => "Tic Tac Toe",
            Snake => "Snake",
            FlappyBird => "Flappy Bird",
            Tetris => "Tetris",
            Minesweeper => "Minesweeper",
            PacMan => "Pac-Man",
            Memory => "Memory Game",
            ConnectFour => "Connect Four",
            Wordle => "Wordle",
            Pong => "Pong",
        }
    }

    pub const fn description(self) -> &'static str {
        use GameKind::*;
        match self {
            TicTacToe => "Get three in a row before your opponent does.",
            Snake => "Eat the food, grow longer, and don't bite yourself.",
            FlappyBird => "Flap through the gaps between the pipes.",
            Tetris => "Rotate falling blocks and clear full lines.",
            Minesweeper => "Reveal every safe cell without touching a mine.",
            PacMan => "Eat every dot in the maze while dodging the ghosts.",
            Memory => "Flip cards two at a time and find every pair.",
            ConnectFour => "Drop discs and connect four before your opponent.",
            Wordle => "Guess the five-letter word in six tries.",
            Pong => "Keep the ball in play and reach five points first.",
        }
    }

    pub const fn category(self) -> Category {
        use GameKind::*;
        match self {
            TicTacToe | ConnectFour => Category::Board,
            Minesweeper | Memory => Category::Puzzle,
            Wordle => Category::Word,
            Snake | FlappyBird | Tetris | PacMan | Pong => Category::Arcade,
        }
    }

    /// Whether the game runs on the animation clock rather than one
    /// transition per user action.
    pub const fn is_clocked(self) -> bool {
        use GameKind::*;
        matches!(self, Snake | FlappyBird | Tetris | PacMan | Pong)
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }
}

impl FromStr for GameKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_id(s.trim()).ok_or(GameError::UnknownGame)
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
