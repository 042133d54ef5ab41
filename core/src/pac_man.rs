use std::cmp::Reverse;

use ndarray::Array2;
use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

pub const MAZE_WIDTH: Coord = 19;
pub const MAZE_HEIGHT: Coord = 21;

const DOT_POINTS: u32 = 10;
const PELLET_POINTS: u32 = 50;
const GHOST_POINTS: u32 = 200;

/// 0 open, 1 wall, 2 dot, 3 power pellet.
const LAYOUT: [[u8; MAZE_WIDTH as usize]; MAZE_HEIGHT as usize] = [
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 2, 2, 2, 2, 2, 2, 2, 2, 1, 2, 2, 2, 2, 2, 2, 2, 2, 1],
    [1, 3, 1, 1, 2, 1, 1, 1, 2, 1, 2, 1, 1, 1, 2, 1, 1, 3, 1],
    [1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 1],
    [1, 2, 1, 1, 2, 1, 2, 1, 1, 1, 1, 1, 2, 1, 2, 1, 1, 2, 1],
    [1, 2, 2, 2, 2, 1, 2, 2, 2, 1, 2, 2, 2, 1, 2, 2, 2, 2, 1],
    [1, 1, 1, 1, 2, 1, 1, 1, 0, 1, 0, 1, 1, 1, 2, 1, 1, 1, 1],
    [0, 0, 0, 1, 2, 1, 0, 0, 0, 0, 0, 0, 0, 1, 2, 1, 0, 0, 0],
    [1, 1, 1, 1, 2, 1, 0, 1, 1, 0, 1, 1, 0, 1, 2, 1, 1, 1, 1],
    [0, 0, 0, 0, 2, 0, 0, 1, 0, 0, 0, 1, 0, 0, 2, 0, 0, 0, 0],
    [1, 1, 1, 1, 2, 1, 0, 1, 1, 1, 1, 1, 0, 1, 2, 1, 1, 1, 1],
    [0, 0, 0, 1, 2, 1, 0, 0, 0, 0, 0, 0, 0, 1, 2, 1, 0, 0, 0],
    [1, 1, 1, 1, 2, 1, 0, 1, 1, 1, 1, 1, 0, 1, 2, 1, 1, 1, 1],
    [1, 2, 2, 2, 2, 2, 2, 2, 2, 1, 2, 2, 2, 2, 2, 2, 2, 2, 1],
    [1, 2, 1, 1, 2, 1, 1, 1, 2, 1, 2, 1, 1, 1, 2, 1, 1, 2, 1],
    [1, 3, 2, 1, 2, 2, 2, 2, 2, 0, 2, 2, 2, 2, 2, 1, 2, 3, 1],
    [1, 1, 2, 1, 2, 1, 2, 1, 1, 1, 1, 1, 2, 1, 2, 1, 2, 1, 1],
    [1, 2, 2, 2, 2, 1, 2, 2, 2, 1, 2, 2, 2, 1, 2, 2, 2, 2, 1],
    [1, 2, 1, 1, 1, 1, 1, 1, 2, 1, 2, 1, 1, 1, 1, 1, 1, 2, 1],
    [1, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 1],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
];

const PLAYER_START: Actor = Actor {
    pos: (9, 15),
    heading: Direction::Right,
};

const GHOST_HOME: Coord2 = (9, 9);

const GHOST_STARTS: [Actor; 4] = [
    Actor {
        pos: (9, 9),
        heading: Direction::Up,
    },
    Actor {
        pos: (8, 9),
        heading: Direction::Left,
    },
    Actor {
        pos: (10, 9),
        heading: Direction::Right,
    },
    Actor {
        pos: (9, 8),
        heading: Direction::Down,
    },
];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    Empty,
    Wall,
    Dot,
    Pellet,
}

impl Tile {
    const fn from_layout(code: u8) -> Self {
        match code {
            1 => Self::Wall,
            2 => Self::Dot,
            3 => Self::Pellet,
            _ => Self::Empty,
        }
    }

    pub const fn is_edible(self) -> bool {
        matches!(self, Self::Dot | Self::Pellet)
    }
}

/// Indexed `(x, y)`.
pub type Maze = Array2<Tile>;

pub fn build_maze() -> Maze {
    Array2::from_shape_fn(
        (MAZE_WIDTH.into(), MAZE_HEIGHT.into()),
        |(x, y)| Tile::from_layout(LAYOUT[y][x]),
    )
}

/// Cell reached by moving one step from `pos`, wrapping through the side
/// tunnels. `None` for walls and the top and bottom edges.
pub fn step_from(maze: &Maze, pos: Coord2, heading: Direction) -> Option<Coord2> {
    let next = Point::from(pos) + heading;
    let x = next.x.rem_euclid(MAZE_WIDTH.into());
    let target = Point::new(x, next.y).to_coords((MAZE_WIDTH, MAZE_HEIGHT))?;
    (maze[target.to_nd_index()] != Tile::Wall).then_some(target)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub pos: Coord2,
    pub heading: Direction,
}

/// Picks a ghost's next heading. At an intersection the candidate that gets
/// closest to `target` (or furthest, when `scared`) wins with probability
/// `chase_bias`; otherwise any legal candidate. Ghosts only reverse at dead ends.
pub fn choose_heading<R: Rng + ?Sized>(
    maze: &Maze,
    ghost: Actor,
    target: Coord2,
    scared: bool,
    chase_bias: f64,
    rng: &mut R,
) -> Direction {
    let candidates: SmallVec<[(Direction, Coord2); 4]> = Direction::ALL
        .into_iter()
        .filter(|&d| d != ghost.heading.opposite())
        .filter_map(|d| step_from(maze, ghost.pos, d).map(|pos| (d, pos)))
        .collect();

    let target = Point::from(target);
    match candidates.as_slice() {
        [] => ghost.heading.opposite(),
        [(only, _)] => *only,
        _ => {
            let distance = |&&(_, pos): &&(Direction, Coord2)| target.manhattan(pos.into());
            let best = if scared {
                candidates.iter().min_by_key(|c| Reverse(distance(c)))
            } else {
                candidates.iter().min_by_key(distance)
            };
            let pick = if rng.random_bool(chase_bias) {
                best
            } else {
                candidates.choose(rng)
            };
            pick.map_or(ghost.heading, |&(d, _)| d)
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PacManConfig {
    pub step_interval: Millis,
    pub power_duration: Millis,
    pub lives: u8,
    /// Probability that a ghost takes its best heading at an intersection.
    pub chase_bias: f64,
}

impl Default for PacManConfig {
    fn default() -> Self {
        Self {
            step_interval: 150,
            power_duration: 8000,
            lives: 3,
            chase_bias: 0.7,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PacManCommand {
    Turn(Direction),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PacManState {
    pub maze: Maze,
    pub player: Actor,
    pub queued: Option<Direction>,
    pub ghosts: [Actor; 4],
    pub score: u32,
    pub lives: u8,
    /// Time left in power mode; zero when ghosts are dangerous.
    pub power_left: Millis,
    pub food_left: CellCount,
    pub status: GameStatus,
    timer: StepTimer,
}

impl PacManState {
    fn new(config: &PacManConfig) -> Self {
        let maze = build_maze();
        let food_left = maze.iter().filter(|tile| tile.is_edible()).count() as CellCount;
        Self {
            maze,
            player: PLAYER_START,
            queued: None,
            ghosts: GHOST_STARTS,
            score: 0,
            lives: config.lives,
            power_left: 0,
            food_left,
            status: GameStatus::NotStarted,
            timer: StepTimer::default(),
        }
    }

    pub fn is_powered(&self) -> bool {
        self.power_left > 0
    }

    pub fn tile(&self, coords: Coord2) -> Tile {
        self.maze[coords.to_nd_index()]
    }
}

#[derive(Clone, Debug)]
pub struct PacMan<R = SmallRng> {
    config: PacManConfig,
    state: PacManState,
    rng: R,
}

impl PacMan<SmallRng> {
    pub fn new(config: PacManConfig, seed: u64) -> Self {
        Self::with_rng(config, SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> PacMan<R> {
    pub fn with_rng(config: PacManConfig, rng: R) -> Self {
        Self {
            config,
            state: PacManState::new(&config),
            rng,
        }
    }

    pub fn config(&self) -> &PacManConfig {
        &self.config
    }

    /// Queues a turn, taken on the first step where the target cell is open.
    pub fn turn(&mut self, direction: Direction) -> Result<()> {
        self.state.status.check_not_finished()?;
        if direction == self.state.player.heading.opposite() {
            return Err(GameError::Reversal);
        }
        self.state.queued = Some(direction);
        Ok(())
    }

    fn advance(&mut self) {
        self.move_player();
        if self.state.status.is_finished() {
            return;
        }
        self.resolve_contacts();

        for index in 0..self.state.ghosts.len() {
            if self.state.status.is_finished() {
                return;
            }
            self.move_ghost(index);
            self.resolve_contacts();
        }
    }

    fn move_player(&mut self) {
        let state = &mut self.state;
        if let Some(queued) = state.queued {
            if step_from(&state.maze, state.player.pos, queued).is_some() {
                state.player.heading = queued;
                state.queued = None;
            }
        }
        let Some(pos) = step_from(&state.maze, state.player.pos, state.player.heading) else {
            return;
        };
        state.player.pos = pos;

        let tile = &mut state.maze[pos.to_nd_index()];
        match *tile {
            Tile::Dot => state.score += DOT_POINTS,
            Tile::Pellet => {
                state.score += PELLET_POINTS;
                state.power_left = self.config.power_duration;
                log::debug!("power pellet eaten at {:?}", pos);
            }
            Tile::Empty | Tile::Wall => return,
        }
        *tile = Tile::Empty;
        state.food_left -= 1;
        if state.food_left == 0 {
            state.status.finish(GameStatus::Won);
        }
    }

    fn move_ghost(&mut self, index: usize) {
        let ghost = self.state.ghosts[index];
        let heading = choose_heading(
            &self.state.maze,
            ghost,
            self.state.player.pos,
            self.state.is_powered(),
            self.config.chase_bias,
            &mut self.rng,
        );
        let ghost = &mut self.state.ghosts[index];
        ghost.heading = heading;
        if let Some(pos) = step_from(&self.state.maze, ghost.pos, heading) {
            ghost.pos = pos;
        }
    }

    fn resolve_contacts(&mut self) {
        let player = self.state.player.pos;
        let Some(index) = self.state.ghosts.iter().position(|g| g.pos == player) else {
            return;
        };

        if self.state.is_powered() {
            // one pass: a ghost sent home onto the player is not eaten again
            for (index, ghost) in self.state.ghosts.iter_mut().enumerate() {
                if ghost.pos == player {
                    log::debug!("ghost {} eaten", index);
                    self.state.score += GHOST_POINTS;
                    ghost.pos = GHOST_HOME;
                }
            }
            return;
        }

        self.state.lives = self.state.lives.saturating_sub(1);
        log::debug!("caught by ghost {}, {} lives left", index, self.state.lives);
        if self.state.lives == 0 {
            self.state.status.finish(GameStatus::Lost);
        } else {
            self.state.player = PLAYER_START;
            self.state.queued = None;
            self.state.ghosts = GHOST_STARTS;
        }
    }
}

impl<R: Rng> Engine for PacMan<R> {
    type Intent = PacManCommand;
    type Outcome = ();
    type Snapshot = PacManState;

    fn submit(&mut self, command: PacManCommand) -> Result<()> {
        match command {
            PacManCommand::Turn(direction) => self.turn(direction),
        }
    }

    fn snapshot(&self) -> &PacManState {
        &self.state
    }

    fn status(&self) -> GameStatus {
        self.state.status
    }

    fn reset(&mut self) {
        self.state = PacManState::new(&self.config);
    }
}

impl<R: Rng> Clocked for PacMan<R> {
    fn tick(&mut self, dt: Millis) {
        if self.state.status.is_finished() {
            return;
        }
        self.state.status.start();
        self.state.power_left = self.state.power_left.saturating_sub(dt);
        self.state.timer.accumulate(dt);
        while !self.state.status.is_finished() && self.state.timer.consume(self.config.step_interval)
        {
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::ScriptedRng;

    fn game() -> PacMan<ScriptedRng> {
        PacMan::with_rng(PacManConfig::default(), ScriptedRng::zeros())
    }

    /// Parks the ghosts in the closed corridor on the left so they stay out of the way.
    fn park_ghosts(game: &mut PacMan<ScriptedRng>) {
        for ghost in &mut game.state.ghosts {
            *ghost = Actor {
                pos: (1, 7),
                heading: Direction::Right,
            };
        }
    }

    #[test]
    fn maze_counts() {
        let state = PacManState::new(&PacManConfig::default());
        let pellets = state.maze.iter().filter(|&&t| t == Tile::Pellet).count();
        assert_eq!(pellets, 4);
        assert_eq!(state.tile((9, 15)), Tile::Empty);
        assert_eq!(state.tile((0, 0)), Tile::Wall);
        assert_eq!(state.lives, 3);
    }

    #[test]
    fn eating_a_dot_scores_ten() {
        let mut game = game();
        park_ghosts(&mut game);
        let food = game.snapshot().food_left;

        game.tick(150);

        let state = game.snapshot();
        assert_eq!(state.player.pos, (10, 15));
        assert_eq!(state.score, 10);
        assert_eq!(state.food_left, food - 1);
        assert_eq!(state.tile((10, 15)), Tile::Empty);
    }

    #[test]
    fn reversal_is_rejected() {
        let mut game = game();
        assert_eq!(game.turn(Direction::Left), Err(GameError::Reversal));
        assert_eq!(game.snapshot().queued, None);
    }

    #[test]
    fn queued_turn_waits_for_an_opening() {
        let mut game = game();
        park_ghosts(&mut game);
        game.turn(Direction::Up).unwrap();

        game.tick(150);
        assert_eq!(game.snapshot().player.pos, (10, 15));
        assert_eq!(game.snapshot().queued, Some(Direction::Up));

        game.tick(150);
        assert_eq!(game.snapshot().player.pos, (10, 14));
        assert_eq!(game.snapshot().player.heading, Direction::Up);
        assert_eq!(game.snapshot().queued, None);
    }

    #[test]
    fn walls_stop_the_player() {
        let mut game = game();
        park_ghosts(&mut game);
        game.state.player = Actor {
            pos: (17, 13),
            heading: Direction::Right,
        };
        game.tick(150);
        assert_eq!(game.snapshot().player.pos, (17, 13));
    }

    #[test]
    fn side_tunnel_wraps() {
        let mut game = game();
        park_ghosts(&mut game);
        game.state.player = Actor {
            pos: (0, 9),
            heading: Direction::Left,
        };
        game.tick(150);
        assert_eq!(game.snapshot().player.pos, (18, 9));
    }

    #[test]
    fn pellet_grants_timed_power() {
        let mut game = game();
        park_ghosts(&mut game);
        game.state.player = Actor {
            pos: (2, 15),
            heading: Direction::Left,
        };

        game.tick(150);
        assert_eq!(game.snapshot().score, 50);
        assert_eq!(game.snapshot().power_left, 8000);

        game.tick(150);
        assert_eq!(game.snapshot().power_left, 7850);
        game.tick(7850);
        assert!(!game.snapshot().is_powered());
    }

    #[test]
    fn powered_player_eats_ghosts() {
        let mut game = game();
        park_ghosts(&mut game);
        game.state.power_left = 1000;
        game.state.ghosts[0] = Actor {
            pos: (10, 15),
            heading: Direction::Left,
        };

        game.tick(150);

        let state = game.snapshot();
        assert_eq!(state.score, 10 + 200);
        assert_eq!(state.lives, 3);
        assert_ne!(state.ghosts[0].pos, (10, 15));
        assert_eq!(Point::from(state.ghosts[0].pos).manhattan(GHOST_HOME.into()), 1);
    }

    #[test]
    fn ghost_eaten_on_its_home_cell_is_scored_once() {
        let mut game = game();
        park_ghosts(&mut game);
        game.state.power_left = 1000;
        assert_ne!(game.snapshot().tile(GHOST_HOME), Tile::Wall);
        game.state.player = Actor {
            pos: GHOST_HOME,
            heading: Direction::Up,
        };
        game.state.ghosts[0].pos = GHOST_HOME;

        game.resolve_contacts();

        let state = game.snapshot();
        assert_eq!(state.score, 200);
        assert_eq!(state.ghosts[0].pos, GHOST_HOME);
        assert_eq!(state.lives, 3);
    }

    #[test]
    fn ghost_eaten_next_to_home() {
        let mut game = game();
        park_ghosts(&mut game);
        game.state.power_left = 1000;
        game.state.player = Actor {
            pos: (9, 8),
            heading: Direction::Up,
        };
        game.state.ghosts[2].pos = (9, 8);

        game.resolve_contacts();

        assert_eq!(game.snapshot().score, 200);
        assert_eq!(game.snapshot().ghosts[2].pos, GHOST_HOME);
    }

    #[test]
    fn ghosts_sharing_a_cell_are_all_eaten() {
        let mut game = game();
        park_ghosts(&mut game);
        game.state.power_left = 1000;
        game.state.player.pos = (10, 15);
        game.state.ghosts[1].pos = (10, 15);
        game.state.ghosts[3].pos = (10, 15);

        game.resolve_contacts();

        let state = game.snapshot();
        assert_eq!(state.score, 400);
        assert_eq!(state.ghosts[1].pos, GHOST_HOME);
        assert_eq!(state.ghosts[3].pos, GHOST_HOME);
        assert_eq!(state.ghosts[0].pos, (1, 7));
    }

    #[test]
    fn contact_costs_a_life_and_resets_positions() {
        let mut game = game();
        park_ghosts(&mut game);
        game.state.ghosts[0] = Actor {
            pos: (10, 15),
            heading: Direction::Left,
        };
        game.turn(Direction::Up).unwrap();

        game.tick(150);

        let state = game.snapshot();
        assert_eq!(state.lives, 2);
        assert_eq!(state.player, PLAYER_START);
        assert_eq!(state.queued, None);
        assert_eq!(state.score, 10);
        assert_eq!(state.status, GameStatus::InProgress);
    }

    #[test]
    fn last_life_loses_and_freezes() {
        let mut game = game();
        park_ghosts(&mut game);
        game.state.lives = 1;
        game.state.ghosts[2] = Actor {
            pos: (10, 15),
            heading: Direction::Left,
        };

        game.tick(150);
        assert_eq!(game.status(), GameStatus::Lost);

        let frozen = game.snapshot().clone();
        game.tick(1500);
        assert_eq!(game.snapshot(), &frozen);
        assert_eq!(game.turn(Direction::Up), Err(GameError::AlreadyEnded));
    }

    #[test]
    fn clearing_the_maze_wins() {
        let mut game = game();
        park_ghosts(&mut game);
        for tile in game.state.maze.iter_mut() {
            if tile.is_edible() {
                *tile = Tile::Empty;
            }
        }
        game.state.maze[[10, 15]] = Tile::Dot;
        game.state.food_left = 1;

        game.tick(150);
        assert_eq!(game.status(), GameStatus::Won);
        assert_eq!(game.snapshot().food_left, 0);
    }

    #[test]
    fn ghosts_chase_or_flee_at_intersections() {
        let maze = build_maze();
        let ghost = Actor {
            pos: (4, 9),
            heading: Direction::Right,
        };
        let mut rng = ScriptedRng::zeros();

        let chase = choose_heading(&maze, ghost, (9, 15), false, 0.7, &mut rng);
        assert_eq!(chase, Direction::Down);

        let flee = choose_heading(&maze, ghost, (9, 15), true, 0.7, &mut rng);
        assert_eq!(flee, Direction::Up);
    }

    #[test]
    fn ghosts_mostly_take_the_best_heading() {
        let maze = build_maze();
        let ghost = Actor {
            pos: (4, 9),
            heading: Direction::Right,
        };
        let mut rng = SmallRng::seed_from_u64(5);

        let best = (0..2000)
            .filter(|_| choose_heading(&maze, ghost, (9, 15), false, 0.7, &mut rng) == Direction::Down)
            .count();
        assert!((1400..1800).contains(&best), "best taken {best} times");
    }

    #[test]
    fn ghosts_never_reverse_unless_cornered() {
        let maze = build_maze();
        let mut rng = ScriptedRng::zeros();

        let corridor = Actor {
            pos: (0, 7),
            heading: Direction::Right,
        };
        assert_eq!(
            choose_heading(&maze, corridor, (0, 7), false, 0.7, &mut rng),
            Direction::Right
        );

        let dead_end = Actor {
            pos: (2, 7),
            heading: Direction::Right,
        };
        assert_eq!(
            choose_heading(&maze, dead_end, (9, 15), false, 0.7, &mut rng),
            Direction::Left
        );
    }
}
