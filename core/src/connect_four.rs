use ndarray::Array2;
use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

pub const COLUMNS: Coord = 7;
pub const ROWS: Coord = 6;
const CONNECT: usize = 4;

const AXES: [(i32, i32); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Disc {
    /// Player one, always the human.
    Red,
    /// Player two, human or computer.
    Yellow,
}

impl Disc {
    pub const fn other(self) -> Self {
        match self {
            Self::Red => Self::Yellow,
            Self::Yellow => Self::Red,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Opponent {
    #[default]
    Human,
    Computer,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectFourConfig {
    pub opponent: Opponent,
}

/// Grid indexed `(column, row)`, row 0 at the top.
pub type Grid = Array2<Option<Disc>>;

/// Lowest empty row of `column`, where a dropped disc would land.
pub fn landing_row(grid: &Grid, column: Coord) -> Option<Coord> {
    (0..ROWS)
        .rev()
        .find(|&row| grid[(column, row).to_nd_index()].is_none())
}

/// Returns the run through `at` when it is at least four long on any axis. Pure.
pub fn find_line(grid: &Grid, at: Coord2) -> Option<Vec<Coord2>> {
    let disc = grid[at.to_nd_index()]?;
    let bounds = (COLUMNS, ROWS);
    let owned = |p: Point| {
        p.to_coords(bounds)
            .filter(|&c| grid[c.to_nd_index()] == Some(disc))
    };

    for (dx, dy) in AXES {
        let mut cells = vec![at];
        for sign in [1, -1] {
            let mut p = Point::from(at);
            loop {
                p = Point::new(p.x + dx * sign, p.y + dy * sign);
                match owned(p) {
                    Some(coords) => cells.push(coords),
                    None => break,
                }
            }
        }
        if cells.len() >= CONNECT {
            return Some(cells);
        }
    }
    None
}

/// The board is full once the top row is.
pub fn is_full(grid: &Grid) -> bool {
    (0..COLUMNS).all(|column| grid[(column, 0).to_nd_index()].is_some())
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConnectFourState {
    pub grid: Grid,
    pub current: Disc,
    pub status: GameStatus,
    pub winner: Option<Disc>,
    pub winning_cells: Vec<Coord2>,
    pub last_drop: Option<Coord2>,
}

impl ConnectFourState {
    fn new() -> Self {
        Self {
            grid: Array2::default((COLUMNS, ROWS).to_nd_index()),
            current: Disc::Red,
            status: GameStatus::NotStarted,
            winner: None,
            winning_cells: Vec::new(),
            last_drop: None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConnectFourMove {
    Drop(Coord),
    /// Lets the computer opponent take its turn.
    Computer,
}

#[derive(Clone, Debug)]
pub struct ConnectFour<R = SmallRng> {
    config: ConnectFourConfig,
    state: ConnectFourState,
    rng: R,
}

impl ConnectFour<SmallRng> {
    pub fn new(config: ConnectFourConfig, seed: u64) -> Self {
        Self::with_rng(config, SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ConnectFour<R> {
    pub fn with_rng(config: ConnectFourConfig, rng: R) -> Self {
        Self {
            config,
            state: ConnectFourState::new(),
            rng,
        }
    }

    pub fn config(&self) -> ConnectFourConfig {
        self.config
    }

    /// Whether the host should schedule a computer turn.
    pub fn awaiting_computer(&self) -> bool {
        self.config.opponent == Opponent::Computer
            && self.state.current == Disc::Yellow
            && !self.state.status.is_finished()
    }

    /// Drops the human's disc into `column`.
    pub fn drop_disc(&mut self, column: Coord) -> Result<Coord2> {
        if self.awaiting_computer() {
            return Err(GameError::NotYourTurn);
        }
        self.place(column)
    }

    /// Immediate win, else block the opponent's immediate win, else random.
    pub fn computer_move(&mut self) -> Result<Coord2> {
        self.state.status.check_not_finished()?;
        if !self.awaiting_computer() {
            return Err(GameError::NotYourTurn);
        }

        let me = self.state.current;
        let column = self
            .column_completing_line(me)
            .or_else(|| self.column_completing_line(me.other()))
            .or_else(|| {
                let open: Vec<Coord> = (0..COLUMNS)
                    .filter(|&c| landing_row(&self.state.grid, c).is_some())
                    .collect();
                open.choose(&mut self.rng).copied()
            })
            .ok_or(GameError::ColumnFull)?;

        log::debug!("computer drops into column {}", column);
        self.place(column)
    }

    fn column_completing_line(&self, disc: Disc) -> Option<Coord> {
        let mut grid = self.state.grid.clone();
        (0..COLUMNS).find(|&column| {
            let Some(row) = landing_row(&grid, column) else {
                return false;
            };
            let at = (column, row);
            grid[at.to_nd_index()] = Some(disc);
            let wins = find_line(&grid, at).is_some();
            grid[at.to_nd_index()] = None;
            wins
        })
    }

    fn place(&mut self, column: Coord) -> Result<Coord2> {
        self.state.status.check_not_finished()?;
        if column >= COLUMNS {
            return Err(GameError::InvalidCoords);
        }
        let row = landing_row(&self.state.grid, column).ok_or(GameError::ColumnFull)?;
        let at = (column, row);
        let disc = self.state.current;

        self.state.grid[at.to_nd_index()] = Some(disc);
        self.state.last_drop = Some(at);
        self.state.status.start();

        if let Some(cells) = find_line(&self.state.grid, at) {
            self.state.winner = Some(disc);
            self.state.winning_cells = cells;
            let end = match (self.config.opponent, disc) {
                (Opponent::Computer, Disc::Yellow) => GameStatus::Lost,
                _ => GameStatus::Won,
            };
            self.state.status.finish(end);
        } else if is_full(&self.state.grid) {
            self.state.status.finish(GameStatus::Draw);
        } else {
            self.state.current = disc.other();
        }
        Ok(at)
    }
}

impl<R: Rng> Engine for ConnectFour<R> {
    type Intent = ConnectFourMove;
    type Outcome = Coord2;
    type Snapshot = ConnectFourState;

    fn submit(&mut self, intent: ConnectFourMove) -> Result<Coord2> {
        match intent {
            ConnectFourMove::Drop(column) => self.drop_disc(column),
            ConnectFourMove::Computer => self.computer_move(),
        }
    }

    fn snapshot(&self) -> &ConnectFourState {
        &self.state
    }

    fn status(&self) -> GameStatus {
        self.state.status
    }

    fn reset(&mut self) {
        self.state = ConnectFourState::new();
    }
}
