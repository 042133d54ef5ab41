use std::collections::{BTreeSet, VecDeque};

use ndarray::Array2;
use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;
pub use generator::*;

mod generator;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinesweeperConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl MinesweeperConfig {
    pub const EASY: Self = Self::new_unchecked((9, 9), 10);
    pub const MEDIUM: Self = Self::new_unchecked((16, 16), 40);
    pub const HARD: Self = Self::new_unchecked((30, 16), 99);

    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// Clamps the board to at least 1x1 and refuses boards without a safe cell.
    pub fn new((size_x, size_y): Coord2, mines: CellCount) -> Result<Self> {
        let size = (size_x.max(1), size_y.max(1));
        let config = Self::new_unchecked(size, mines.max(1));
        if config.mines >= config.total_cells() {
            return Err(GameError::TooManyMines);
        }
        Ok(config)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells().saturating_sub(self.mines)
    }
}

impl Default for MinesweeperConfig {
    fn default() -> Self {
        Self::EASY
    }
}

/// Player-visible state of one cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Hidden,
    Flagged,
    Revealed(u8),
    /// Exposed once the game is lost.
    Mine,
}

impl Cell {
    pub const fn is_unrevealed(self) -> bool {
        matches!(self, Self::Hidden | Self::Flagged)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MinesweeperMove {
    Reveal(Coord2),
    ToggleFlag(Coord2),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    NoChange,
    Marked,
    Revealed,
    HitMine,
    Won,
}

impl MoveOutcome {
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MinesweeperState {
    pub config: MinesweeperConfig,
    /// Indexed `(x, y)`.
    pub board: Array2<Cell>,
    /// Placed on the first reveal.
    pub mines: Option<Array2<bool>>,
    pub status: GameStatus,
    pub revealed: CellCount,
    pub flagged: CellCount,
    pub triggered_mine: Option<Coord2>,
}

impl MinesweeperState {
    fn new(config: MinesweeperConfig) -> Self {
        Self {
            config,
            board: Array2::default(config.size.to_nd_index()),
            mines: None,
            status: GameStatus::NotStarted,
            revealed: 0,
            flagged: 0,
            triggered_mine: None,
        }
    }

    pub fn cell_at(&self, coords: Coord2) -> Cell {
        self.board[coords.to_nd_index()]
    }

    pub fn mines_left(&self) -> i32 {
        i32::from(self.config.mines) - i32::from(self.flagged)
    }
}

/// Count of mines among the up-to-eight neighbours.
pub fn adjacent_mines(mines: &Array2<bool>, coords: Coord2) -> u8 {
    mines
        .iter_neighbors(coords)
        .filter(|&pos| mines[pos.to_nd_index()])
        .count() as u8
}

#[derive(Clone, Debug)]
pub struct Minesweeper<R = SmallRng> {
    state: MinesweeperState,
    rng: R,
}

impl Minesweeper<SmallRng> {
    pub fn new(config: MinesweeperConfig, seed: u64) -> Self {
        Self::with_rng(config, SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Minesweeper<R> {
    pub fn with_rng(config: MinesweeperConfig, rng: R) -> Self {
        Self {
            state: MinesweeperState::new(config),
            rng,
        }
    }

    /// Starts from a fixed layout instead of placing mines on the first reveal.
    pub fn with_layout(mines: Array2<bool>, rng: R) -> Result<Self> {
        let (w, h) = mines.dim();
        let size = (
            Coord::try_from(w).map_err(|_| GameError::BoardTooLarge)?,
            Coord::try_from(h).map_err(|_| GameError::BoardTooLarge)?,
        );
        let count = mines.iter().filter(|&&mine| mine).count();
        let count = CellCount::try_from(count).map_err(|_| GameError::BoardTooLarge)?;
        let mut state = MinesweeperState::new(MinesweeperConfig::new_unchecked(size, count));
        state.mines = Some(mines);
        Ok(Self { state, rng })
    }

    fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.state.config.size;
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MoveOutcome> {
        let coords = self.validate_coords(coords)?;
        self.state.status.check_not_finished()?;

        let cell = &mut self.state.board[coords.to_nd_index()];
        Ok(match *cell {
            Cell::Hidden => {
                *cell = Cell::Flagged;
                self.state.flagged += 1;
                MoveOutcome::Marked
            }
            Cell::Flagged => {
                *cell = Cell::Hidden;
                self.state.flagged -= 1;
                MoveOutcome::Marked
            }
            Cell::Revealed(_) | Cell::Mine => MoveOutcome::NoChange,
        })
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<MoveOutcome> {
        let coords = self.validate_coords(coords)?;
        self.state.status.check_not_finished()?;
        if self.state.cell_at(coords) != Cell::Hidden {
            return Ok(MoveOutcome::NoChange);
        }

        let mines = match self.state.mines.take() {
            Some(mines) => mines,
            None => {
                log::debug!("placing {} mines around {:?}", self.state.config.mines, coords);
                place_mines(self.state.config, coords, &mut self.rng)
            }
        };
        let outcome = self.reveal_from(&mines, coords);
        self.state.mines = Some(mines);
        Ok(outcome)
    }

    fn reveal_from(&mut self, mines: &Array2<bool>, coords: Coord2) -> MoveOutcome {
        self.state.status.start();

        if mines[coords.to_nd_index()] {
            self.state.triggered_mine = Some(coords);
            for (index, &mine) in mines.indexed_iter() {
                if mine {
                    self.state.board[index] = Cell::Mine;
                }
            }
            self.state.status.finish(GameStatus::Lost);
            return MoveOutcome::HitMine;
        }

        let mut visited = BTreeSet::from([coords]);
        let mut to_visit = VecDeque::from([coords]);
        while let Some(visit) = to_visit.pop_front() {
            let count = adjacent_mines(mines, visit);
            self.state.board[visit.to_nd_index()] = Cell::Revealed(count);
            self.state.revealed += 1;
            log::trace!("revealed {:?} with {} adjacent", visit, count);

            if count == 0 {
                for pos in mines.iter_neighbors(visit) {
                    if self.state.cell_at(pos) == Cell::Hidden && visited.insert(pos) {
                        to_visit.push_back(pos);
                    }
                }
            }
        }

        if self.state.revealed == self.state.config.safe_cells() {
            for (index, &mine) in mines.indexed_iter() {
                if mine && self.state.board[index] == Cell::Hidden {
                    self.state.board[index] = Cell::Flagged;
                    self.state.flagged += 1;
                }
            }
            self.state.status.finish(GameStatus::Won);
            MoveOutcome::Won
        } else {
            MoveOutcome::Revealed
        }
    }
}

impl<R: Rng> Engine for Minesweeper<R> {
    type Intent = MinesweeperMove;
    type Outcome = MoveOutcome;
    type Snapshot = MinesweeperState;

    fn submit(&mut self, intent: MinesweeperMove) -> Result<MoveOutcome> {
        match intent {
            MinesweeperMove::Reveal(coords) => self.reveal(coords),
            MinesweeperMove::ToggleFlag(coords) => self.toggle_flag(coords),
        }
    }

    fn snapshot(&self) -> &MinesweeperState {
        &self.state
    }

    fn status(&self) -> GameStatus {
        self.state.status
    }

    fn reset(&mut self) {
        self.state = MinesweeperState::new(self.state.config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(size: Coord2, mines: &[Coord2]) -> Minesweeper {
        let mut mask: Array2<bool> = Array2::default(size.to_nd_index());
        for &coords in mines {
            mask[coords.to_nd_index()] = true;
        }
        Minesweeper::with_layout(mask, SmallRng::seed_from_u64(0)).unwrap()
    }

    #[test]
    fn oversized_layout_is_refused() {
        let mask: Array2<bool> = Array2::default((300, 2));
        let game = Minesweeper::with_layout(mask, SmallRng::seed_from_u64(0));
        assert_eq!(game.err(), Some(GameError::BoardTooLarge));

        let mask: Array2<bool> = Array2::default((2, 256));
        let game = Minesweeper::with_layout(mask, SmallRng::seed_from_u64(0));
        assert_eq!(game.err(), Some(GameError::BoardTooLarge));
    }

    #[test]
    fn layout_size_and_mine_count_come_from_the_mask() {
        let game = layout((4, 3), &[(0, 0), (3, 2)]);
        assert_eq!(game.snapshot().config, MinesweeperConfig::new_unchecked((4, 3), 2));
    }

    #[test]
    fn snapshot_survives_a_json_round_trip() {
        let mut game = layout((4, 3), &[(3, 0)]);
        game.toggle_flag((3, 0)).unwrap();
        game.reveal((0, 2)).unwrap();

        let json = serde_json::to_string(game.snapshot()).unwrap();
        let restored: MinesweeperState = serde_json::from_str(&json).unwrap();
        assert_eq!(&restored, game.snapshot());
        assert_eq!(restored.cell_at((3, 0)), Cell::Flagged);
    }

    #[test]
    fn reveal_hits_mine_and_exposes_all_mines() {
        let mut game = layout((3, 3), &[(0, 0), (2, 2)]);

        assert_eq!(game.reveal((0, 0)), Ok(MoveOutcome::HitMine));

        let state = game.snapshot();
        assert_eq!(state.status, GameStatus::Lost);
        assert_eq!(state.triggered_mine, Some((0, 0)));
        assert_eq!(state.cell_at((2, 2)), Cell::Mine);
        assert_eq!(game.reveal((1, 1)), Err(GameError::AlreadyEnded));
    }

    #[test]
    fn flood_fill_opens_zero_region_and_its_border() {
        // mine column at x = 3 splits a 5x3 board
        let mut game = layout((5, 3), &[(3, 0), (3, 1), (3, 2)]);

        assert_eq!(game.reveal((0, 1)), Ok(MoveOutcome::Revealed));

        let state = game.snapshot();
        for y in 0..3 {
            assert_eq!(state.cell_at((0, y)), Cell::Revealed(0));
            assert!(matches!(state.cell_at((2, y)), Cell::Revealed(2 | 3)));
            assert_eq!(state.cell_at((4, y)), Cell::Hidden);
        }
        assert_eq!(state.revealed, 9);
    }

    #[test]
    fn flood_fill_stops_at_flags() {
        let mut game = layout((4, 1), &[(3, 0)]);
        game.toggle_flag((1, 0)).unwrap();

        game.reveal((0, 0)).unwrap();

        let state = game.snapshot();
        assert_eq!(state.cell_at((0, 0)), Cell::Revealed(0));
        assert_eq!(state.cell_at((1, 0)), Cell::Flagged);
        assert_eq!(state.cell_at((2, 0)), Cell::Hidden);
    }

    #[test]
    fn flagged_and_revealed_cells_ignore_reveal() {
        let mut game = layout((3, 1), &[(2, 0)]);
        assert_eq!(game.toggle_flag((2, 0)), Ok(MoveOutcome::Marked));
        assert_eq!(game.reveal((2, 0)), Ok(MoveOutcome::NoChange));

        game.reveal((1, 0)).unwrap();
        assert_eq!(game.reveal((1, 0)), Ok(MoveOutcome::NoChange));
        assert_eq!(game.toggle_flag((1, 0)), Ok(MoveOutcome::NoChange));
        assert_eq!(game.reveal((5, 0)), Err(GameError::InvalidCoords));
    }

    #[test]
    fn win_flags_remaining_mines() {
        let mut game = layout((2, 2), &[(1, 1)]);

        assert_eq!(game.reveal((0, 0)), Ok(MoveOutcome::Revealed));
        game.reveal((1, 0)).unwrap();
        assert_eq!(game.reveal((0, 1)), Ok(MoveOutcome::Won));

        let state = game.snapshot();
        assert_eq!(state.status, GameStatus::Won);
        assert_eq!(state.cell_at((1, 1)), Cell::Flagged);
        assert_eq!(state.mines_left(), 0);
    }

    #[test]
    fn first_reveal_is_always_safe() {
        for seed in 0..32 {
            let mut game = Minesweeper::new(MinesweeperConfig::MEDIUM, seed);
            assert!(game.snapshot().mines.is_none());

            let outcome = game.reveal((8, 8)).unwrap();

            assert!(matches!(outcome, MoveOutcome::Revealed | MoveOutcome::Won));
            assert_eq!(game.snapshot().cell_at((8, 8)), Cell::Revealed(0));
            assert_eq!(game.status(), GameStatus::InProgress);
        }
    }

    #[test]
    fn flags_before_first_reveal_count_down() {
        let mut game = Minesweeper::new(MinesweeperConfig::EASY, 1);
        game.toggle_flag((0, 0)).unwrap();
        game.toggle_flag((1, 0)).unwrap();

        assert_eq!(game.snapshot().mines_left(), 8);
        assert_eq!(game.status(), GameStatus::NotStarted);

        game.reset();
        assert_eq!(game.snapshot().flagged, 0);
        assert_eq!(game.snapshot().config, MinesweeperConfig::EASY);
    }

    #[test]
    fn config_rejects_boards_without_safe_cells() {
        assert_eq!(
            MinesweeperConfig::new((3, 3), 9),
            Err(GameError::TooManyMines)
        );
        assert_eq!(
            MinesweeperConfig::new((0, 4), 1),
            Ok(MinesweeperConfig::new_unchecked((1, 4), 1))
        );
    }
}
