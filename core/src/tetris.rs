use ndarray::{Array2, Axis};
use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

pub const WIDTH: usize = 10;
pub const HEIGHT: usize = 20;
pub const SPAWN_X: i32 = 3;

/// Points for clearing 0 to 4 lines at once, multiplied by the level.
const LINE_SCORES: [u32; 5] = [0, 40, 100, 300, 1200];
const POINTS_PER_LEVEL: u32 = 1000;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tetromino {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl Tetromino {
    pub const ALL: [Tetromino; 7] = [
        Self::I,
        Self::J,
        Self::L,
        Self::O,
        Self::S,
        Self::T,
        Self::Z,
    ];

    /// Spawn orientation, indexed `(row, col)`.
    pub fn shape(self) -> Array2<bool> {
        use Tetromino::*;
        let rows: &[&[u8]] = match self {
            I => &[&[0, 0, 0, 0], &[1, 1, 1, 1], &[0, 0, 0, 0], &[0, 0, 0, 0]],
            J => &[&[1, 0, 0], &[1, 1, 1], &[0, 0, 0]],
            L => &[&[0, 0, 1], &[1, 1, 1], &[0, 0, 0]],
            O => &[&[1, 1], &[1, 1]],
            S => &[&[0, 1, 1], &[1, 1, 0], &[0, 0, 0]],
            T => &[&[0, 1, 0], &[1, 1, 1], &[0, 0, 0]],
            Z => &[&[1, 1, 0], &[0, 1, 1], &[0, 0, 0]],
        };
        let n = rows.len();
        Array2::from_shape_fn((n, rows[0].len()), |(r, c)| rows[r][c] == 1)
    }

    pub const fn color(self) -> &'static str {
        use Tetromino::*;
        match self {
            I => "#00f0f0",
            J => "#0000f0",
            L => "#f0a000",
            O => "#f0f000",
            S => "#00f000",
            T => "#a000f0",
            Z => "#f00000",
        }
    }
}

/// Quarter turn clockwise: `rotated[(c, rows - 1 - r)] = shape[(r, c)]`.
pub fn rotate_clockwise(shape: &Array2<bool>) -> Array2<bool> {
    let (rows, cols) = shape.dim();
    Array2::from_shape_fn((cols, rows), |(r, c)| shape[(rows - 1 - c, r)])
}

/// Rows above the board are allowed; walls, floor and locked cells are not.
pub fn fits(board: &Board, shape: &Array2<bool>, x: i32, y: i32) -> bool {
    occupied_cells(shape, x, y).all(|(cx, cy)| {
        let Ok(col) = usize::try_from(cx) else {
            return false;
        };
        if col >= WIDTH {
            return false;
        }
        match usize::try_from(cy) {
            Ok(row) => row < HEIGHT && board[(row, col)].is_none(),
            Err(_) => true,
        }
    })
}

fn occupied_cells(shape: &Array2<bool>, x: i32, y: i32) -> impl Iterator<Item = (i32, i32)> + '_ {
    shape
        .indexed_iter()
        .filter(|&(_, &filled)| filled)
        .map(move |((r, c), _)| (x + c as i32, y + r as i32))
}

/// Locked cells, indexed `(row, col)` with row 0 at the top.
pub type Board = Array2<Option<Tetromino>>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub kind: Tetromino,
    pub shape: Array2<bool>,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    pub fn spawn(kind: Tetromino) -> Self {
        Self {
            kind,
            shape: kind.shape(),
            x: SPAWN_X,
            y: 0,
        }
    }

    /// Board positions `(x, y)` covered by the piece.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        occupied_cells(&self.shape, self.x, self.y)
    }
}

pub const fn drop_interval(level: u32) -> Millis {
    let speedup = level.saturating_sub(1).saturating_mul(50);
    let interval = 800u32.saturating_sub(speedup);
    if interval < 100 { 100 } else { interval }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TetrisCommand {
    Left,
    Right,
    Rotate,
    SoftDrop,
    TogglePause,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TetrisState {
    pub board: Board,
    pub piece: Piece,
    pub next: Tetromino,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub paused: bool,
    pub status: GameStatus,
    queued: Vec<TetrisCommand>,
    timer: StepTimer,
}

impl TetrisState {
    pub fn drop_interval(&self) -> Millis {
        drop_interval(self.level)
    }
}

#[derive(Clone, Debug)]
pub struct Tetris<R = SmallRng> {
    state: TetrisState,
    rng: R,
}

impl Tetris<SmallRng> {
    pub fn new(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Tetris<R> {
    pub fn with_rng(mut rng: R) -> Self {
        let state = Self::initial_state(&mut rng);
        Self { state, rng }
    }

    fn initial_state(rng: &mut R) -> TetrisState {
        let current = Self::random_kind(rng);
        TetrisState {
            board: Array2::default((HEIGHT, WIDTH)),
            piece: Piece::spawn(current),
            next: Self::random_kind(rng),
            score: 0,
            level: 1,
            lines: 0,
            paused: false,
            status: GameStatus::NotStarted,
            queued: Vec::new(),
            timer: StepTimer::default(),
        }
    }

    fn random_kind(rng: &mut R) -> Tetromino {
        Tetromino::ALL[rng.random_range(0..Tetromino::ALL.len())]
    }

    fn apply(&mut self, command: TetrisCommand) {
        use TetrisCommand::*;

        if self.state.paused && command != TogglePause {
            return;
        }
        match command {
            Left => {
                self.shift(-1, 0);
            }
            Right => {
                self.shift(1, 0);
            }
            Rotate => {
                let rotated = rotate_clockwise(&self.state.piece.shape);
                let piece = &self.state.piece;
                if fits(&self.state.board, &rotated, piece.x, piece.y) {
                    self.state.piece.shape = rotated;
                }
            }
            SoftDrop => {
                if !self.shift(0, 1) {
                    self.lock();
                }
            }
            TogglePause => self.state.paused = !self.state.paused,
        }
    }

    fn shift(&mut self, dx: i32, dy: i32) -> bool {
        let piece = &self.state.piece;
        let (x, y) = (piece.x + dx, piece.y + dy);
        if fits(&self.state.board, &piece.shape, x, y) {
            self.state.piece.x = x;
            self.state.piece.y = y;
            true
        } else {
            false
        }
    }

    fn lock(&mut self) {
        let kind = self.state.piece.kind;
        let cells: Vec<(i32, i32)> = self.state.piece.cells().collect();
        for (x, y) in cells {
            match (usize::try_from(y), usize::try_from(x)) {
                (Ok(row), Ok(col)) => self.state.board[(row, col)] = Some(kind),
                _ => {
                    log::debug!("piece locked above the board");
                    self.state.status.finish(GameStatus::Lost);
                    return;
                }
            }
        }

        let cleared = self.clear_lines();
        if cleared > 0 {
            self.state.score += LINE_SCORES[cleared] * self.state.level;
            self.state.lines += cleared as u32;
            self.state.level = self
                .state
                .level
                .max(self.state.score / POINTS_PER_LEVEL + 1);
            log::debug!(
                "cleared {} lines, score {}, level {}",
                cleared,
                self.state.score,
                self.state.level
            );
        }

        let next = std::mem::replace(&mut self.state.next, Self::random_kind(&mut self.rng));
        self.state.piece = Piece::spawn(next);
        let piece = &self.state.piece;
        if !fits(&self.state.board, &piece.shape, piece.x, piece.y) {
            log::debug!("no room to spawn {:?}", next);
            self.state.status.finish(GameStatus::Lost);
        }
    }

    /// Drops full rows and shifts the rest down, returning how many went.
    fn clear_lines(&mut self) -> usize {
        let board = &self.state.board;
        let kept: Vec<usize> = (0..HEIGHT)
            .filter(|&row| board.index_axis(Axis(0), row).iter().any(Option::is_none))
            .collect();
        let cleared = HEIGHT - kept.len();
        if cleared == 0 {
            return 0;
        }

        let mut next: Board = Array2::default((HEIGHT, WIDTH));
        for (target, &row) in (cleared..HEIGHT).zip(&kept) {
            next.index_axis_mut(Axis(0), target)
                .assign(&board.index_axis(Axis(0), row));
        }
        self.state.board = next;
        cleared
    }
}

impl<R: Rng> Engine for Tetris<R> {
    type Intent = TetrisCommand;
    type Outcome = ();
    type Snapshot = TetrisState;

    /// Queues `command` for the next tick.
    fn submit(&mut self, command: TetrisCommand) -> Result<()> {
        self.state.status.check_not_finished()?;
        if self.state.paused && command != TetrisCommand::TogglePause {
            return Err(GameError::Paused);
        }
        self.state.queued.push(command);
        Ok(())
    }

    fn snapshot(&self) -> &TetrisState {
        &self.state
    }

    fn status(&self) -> GameStatus {
        self.state.status
    }

    fn reset(&mut self) {
        self.state = Self::initial_state(&mut self.rng);
    }
}

impl<R: Rng> Clocked for Tetris<R> {
    fn tick(&mut self, dt: Millis) {
        if self.state.status.is_finished() {
            return;
        }
        self.state.status.start();

        for command in std::mem::take(&mut self.state.queued) {
            if self.state.status.is_finished() {
                return;
            }
            self.apply(command);
        }
        if self.state.paused {
            return;
        }

        self.state.timer.accumulate(dt);
        while !self.state.status.is_finished()
            && self.state.timer.consume(self.state.drop_interval())
        {
            if !self.shift(0, 1) {
                self.lock();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::ScriptedRng;

    /// Every random piece is an `I`.
    fn game() -> Tetris<ScriptedRng> {
        Tetris::with_rng(ScriptedRng::zeros())
    }

    fn fill_row(board: &mut Board, row: usize, gaps: core::ops::Range<usize>) {
        for col in 0..WIDTH {
            if !gaps.contains(&col) {
                board[(row, col)] = Some(Tetromino::O);
            }
        }
    }

    fn run(game: &mut Tetris<ScriptedRng>, commands: &[TetrisCommand]) {
        for &command in commands {
            game.submit(command).unwrap();
        }
        game.tick(0);
    }

    #[test]
    fn rotation_is_a_quarter_turn() {
        let t = Tetromino::T.shape();
        let once = rotate_clockwise(&t);
        let expected = Array2::from_shape_vec(
            (3, 3),
            vec![false, true, false, false, true, true, false, true, false],
        )
        .unwrap();
        assert_eq!(once, expected);

        let full = (0..4).fold(t.clone(), |shape, _| rotate_clockwise(&shape));
        assert_eq!(full, t);
        assert_eq!(rotate_clockwise(&Tetromino::O.shape()), Tetromino::O.shape());
    }

    #[test]
    fn rotation_out_of_bounds_keeps_shape() {
        let mut game = game();
        run(&mut game, &[TetrisCommand::Rotate]);
        let vertical = game.snapshot().piece.shape.clone();
        assert_ne!(vertical, Tetromino::I.shape());

        // vertical bar in column 2 of its box, pushed against the left wall
        game.state.piece.x = -2;
        run(&mut game, &[TetrisCommand::Rotate]);

        assert_eq!(game.snapshot().piece.shape, vertical);
    }

    #[test]
    fn rotation_into_locked_cells_keeps_shape() {
        let mut game = game();
        game.state.board[(3, 5)] = Some(Tetromino::Z);

        run(&mut game, &[TetrisCommand::Rotate]);

        assert_eq!(game.snapshot().piece.shape, Tetromino::I.shape());
    }

    #[test]
    fn commands_wait_for_the_next_tick() {
        let mut game = game();
        game.submit(TetrisCommand::Left).unwrap();
        assert_eq!(game.snapshot().piece.x, SPAWN_X);

        game.tick(0);
        assert_eq!(game.snapshot().piece.x, SPAWN_X - 1);
    }

    #[test]
    fn walls_stop_sideways_moves() {
        let mut game = game();
        run(&mut game, &[TetrisCommand::Left; 6]);
        assert_eq!(game.snapshot().piece.x, 0);
        run(&mut game, &[TetrisCommand::Right; 9]);
        assert_eq!(game.snapshot().piece.x, 6);
    }

    #[test]
    fn gravity_follows_level_interval() {
        let mut game = game();
        game.tick(799);
        assert_eq!(game.snapshot().piece.y, 0);
        game.tick(1);
        assert_eq!(game.snapshot().piece.y, 1);

        assert_eq!(drop_interval(1), 800);
        assert_eq!(drop_interval(5), 600);
        assert_eq!(drop_interval(15), 100);
        assert_eq!(drop_interval(40), 100);
    }

    #[test]
    fn single_line_clear_scores_and_shifts() {
        let mut game = game();
        fill_row(&mut game.state.board, HEIGHT - 1, 3..7);
        game.state.board[(HEIGHT - 2, 0)] = Some(Tetromino::T);
        game.state.piece.y = HEIGHT as i32 - 3;

        run(&mut game, &[TetrisCommand::SoftDrop, TetrisCommand::SoftDrop]);

        let state = game.snapshot();
        assert_eq!(state.score, 40);
        assert_eq!(state.lines, 1);
        assert_eq!(state.board[(HEIGHT - 1, 0)], Some(Tetromino::T));
        assert_eq!(state.board[(HEIGHT - 2, 0)], None);
        assert_eq!(state.piece.y, 0);
    }

    #[test]
    fn four_lines_at_once_score_1200_and_raise_level() {
        let mut game = game();
        for row in HEIGHT - 4..HEIGHT {
            fill_row(&mut game.state.board, row, 0..1);
        }
        run(&mut game, &[TetrisCommand::Rotate]);
        // the vertical bar sits in column 2 of its box
        game.state.piece.x = -2;

        for _ in 0..HEIGHT {
            run(&mut game, &[TetrisCommand::SoftDrop]);
            if game.snapshot().lines > 0 {
                break;
            }
        }

        let state = game.snapshot();
        assert_eq!(state.lines, 4);
        assert_eq!(state.score, 1200);
        assert_eq!(state.level, 2);
        assert!(state.board.iter().all(Option::is_none));
    }

    #[test]
    fn blocked_spawn_ends_the_game() {
        let mut game = game();
        fill_row(&mut game.state.board, 1, 9..10);
        game.state.piece.x = 6;
        game.state.piece.y = -1;

        // rests on row 0, and row 1 leaves no room for the next bar
        run(&mut game, &[TetrisCommand::SoftDrop]);

        assert_eq!(game.status(), GameStatus::Lost);
        assert_eq!(game.submit(TetrisCommand::Left), Err(GameError::AlreadyEnded));
    }

    #[test]
    fn locking_above_the_board_loses() {
        let mut game = game();
        game.state.piece = Piece {
            y: -2,
            ..Piece::spawn(Tetromino::J)
        };
        fill_row(&mut game.state.board, 0, 0..0);

        run(&mut game, &[TetrisCommand::SoftDrop]);

        assert_eq!(game.status(), GameStatus::Lost);
    }

    #[test]
    fn pause_holds_gravity_and_moves() {
        let mut game = game();
        run(&mut game, &[TetrisCommand::TogglePause]);
        assert!(game.snapshot().paused);
        assert_eq!(game.submit(TetrisCommand::Left), Err(GameError::Paused));

        game.tick(5000);
        assert_eq!(game.snapshot().piece.y, 0);

        run(&mut game, &[TetrisCommand::TogglePause]);
        game.tick(800);
        assert_eq!(game.snapshot().piece.y, 1);
    }
}
