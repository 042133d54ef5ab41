use serde::{Deserialize, Serialize};

use crate::*;

pub const CELLS: usize = 9;

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub const fn other(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }

    pub const fn symbol(self) -> char {
        match self {
            Self::X => 'X',
            Self::O => 'O',
        }
    }
}

pub type Board = [Option<Mark>; CELLS];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Open,
    Draw,
    Winner { mark: Mark, line: [usize; 3] },
}

/// Scans the eight lines, then fullness. Pure.
pub fn evaluate(board: &Board) -> Verdict {
    for line in LINES {
        let [a, b, c] = line;
        if let Some(mark) = board[a] {
            if board[b] == Some(mark) && board[c] == Some(mark) {
                return Verdict::Winner { mark, line };
            }
        }
    }

    if board.iter().all(Option::is_some) {
        Verdict::Draw
    } else {
        Verdict::Open
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TicTacToeState {
    pub board: Board,
    pub next: Mark,
    pub status: GameStatus,
    pub verdict: Verdict,
}

impl Default for TicTacToeState {
    fn default() -> Self {
        Self {
            board: [None; CELLS],
            next: Mark::X,
            status: GameStatus::NotStarted,
            verdict: Verdict::Open,
        }
    }
}

impl TicTacToeState {
    pub fn winner(&self) -> Option<Mark> {
        match self.verdict {
            Verdict::Winner { mark, .. } => Some(mark),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TicTacToe {
    state: TicTacToeState,
}

impl TicTacToe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places the next mark on cell `index` (row-major, 0..9).
    pub fn place(&mut self, index: usize) -> Result<Verdict> {
        self.state.status.check_not_finished()?;
        let cell = self
            .state
            .board
            .get_mut(index)
            .ok_or(GameError::InvalidCoords)?;
        if cell.is_some() {
            return Err(GameError::CellUnavailable);
        }

        let mark = self.state.next;
        *cell = Some(mark);
        self.state.next = mark.other();
        self.state.status.start();

        let verdict = evaluate(&self.state.board);
        match verdict {
            Verdict::Open => {}
            Verdict::Draw => self.state.status.finish(GameStatus::Draw),
            Verdict::Winner { .. } => self.state.status.finish(GameStatus::Won),
        }
        self.state.verdict = verdict;
        Ok(verdict)
    }
}

impl Engine for TicTacToe {
    type Intent = usize;
    type Outcome = Verdict;
    type Snapshot = TicTacToeState;

    fn submit(&mut self, index: usize) -> Result<Verdict> {
        self.place(index)
    }

    fn snapshot(&self) -> &TicTacToeState {
        &self.state
    }

    fn status(&self) -> GameStatus {
        self.state.status
    }

    fn reset(&mut self) {
        self.state = TicTacToeState::default();
    }
}
