use std::collections::VecDeque;

use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnakeConfig {
    pub size: Coord2,
    pub start: Coord2,
    pub heading: Direction,
    pub initial_interval: Millis,
    pub min_interval: Millis,
    /// Interval reduction per food eaten.
    pub speedup: Millis,
}

impl Default for SnakeConfig {
    fn default() -> Self {
        Self {
            size: (30, 30),
            start: (10, 10),
            heading: Direction::Right,
            initial_interval: 100,
            min_interval: 50,
            speedup: 2,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SnakeCommand {
    Turn(Direction),
    TogglePause,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SnakeOutcome {
    Buffered,
    Paused,
    Resumed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnakeState {
    /// Head first.
    pub body: VecDeque<Coord2>,
    pub heading: Direction,
    pub queued: Option<Direction>,
    pub food: Option<Coord2>,
    pub score: u32,
    pub interval: Millis,
    pub paused: bool,
    pub status: GameStatus,
    timer: StepTimer,
}

impl SnakeState {
    pub fn head(&self) -> Coord2 {
        self.body[0]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn occupies(&self, coords: Coord2) -> bool {
        self.body.contains(&coords)
    }
}

#[derive(Clone, Debug)]
pub struct Snake<R = SmallRng> {
    config: SnakeConfig,
    state: SnakeState,
    rng: R,
}

impl Snake<SmallRng> {
    pub fn new(config: SnakeConfig, seed: u64) -> Self {
        Self::with_rng(config, SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Snake<R> {
    pub fn with_rng(config: SnakeConfig, rng: R) -> Self {
        let mut snake = Self {
            config,
            state: Self::initial_state(config),
            rng,
        };
        snake.place_food();
        snake
    }

    pub fn config(&self) -> &SnakeConfig {
        &self.config
    }

    fn initial_state(config: SnakeConfig) -> SnakeState {
        SnakeState {
            body: VecDeque::from([config.start]),
            heading: config.heading,
            queued: None,
            food: None,
            score: 0,
            interval: config.initial_interval,
            paused: false,
            status: GameStatus::NotStarted,
            timer: StepTimer::default(),
        }
    }

    /// Picks a free cell uniformly. With none left the snake has filled the board.
    fn place_food(&mut self) {
        let (w, h) = self.config.size;
        let free: Vec<Coord2> = (0..h)
            .flat_map(|y| (0..w).map(move |x| (x, y)))
            .filter(|&coords| !self.state.occupies(coords))
            .collect();

        self.state.food = free.choose(&mut self.rng).copied();
        if self.state.food.is_none() {
            self.state.status.finish(GameStatus::Won);
        }
    }

    pub fn turn(&mut self, direction: Direction) -> Result<SnakeOutcome> {
        self.state.status.check_not_finished()?;
        if self.state.paused {
            return Err(GameError::Paused);
        }
        if direction == self.state.heading.opposite() {
            return Err(GameError::Reversal);
        }
        self.state.queued = Some(direction);
        Ok(SnakeOutcome::Buffered)
    }

    pub fn toggle_pause(&mut self) -> Result<SnakeOutcome> {
        self.state.status.check_not_finished()?;
        self.state.paused = !self.state.paused;
        Ok(if self.state.paused {
            SnakeOutcome::Paused
        } else {
            SnakeOutcome::Resumed
        })
    }

    fn advance(&mut self) {
        if let Some(direction) = self.state.queued.take() {
            self.state.heading = direction;
        }

        let next = Point::from(self.state.head()) + self.state.heading;
        let Some(head) = next.to_coords(self.config.size) else {
            log::debug!("snake hit the wall at {:?}", next);
            self.state.status.finish(GameStatus::Lost);
            return;
        };
        // the tail still counts: it has not moved out of the way yet
        if self.state.occupies(head) {
            log::debug!("snake bit itself at {:?}", head);
            self.state.status.finish(GameStatus::Lost);
            return;
        }

        self.state.body.push_front(head);
        if self.state.food == Some(head) {
            self.state.score += 1;
            self.state.interval = self
                .state
                .interval
                .saturating_sub(self.config.speedup)
                .max(self.config.min_interval);
            log::trace!("food eaten, interval now {}", self.state.interval);
            self.place_food();
        } else {
            self.state.body.pop_back();
        }
    }
}

impl<R: Rng> Engine for Snake<R> {
    type Intent = SnakeCommand;
    type Outcome = SnakeOutcome;
    type Snapshot = SnakeState;

    fn submit(&mut self, command: SnakeCommand) -> Result<SnakeOutcome> {
        match command {
            SnakeCommand::Turn(direction) => self.turn(direction),
            SnakeCommand::TogglePause => self.toggle_pause(),
        }
    }

    fn snapshot(&self) -> &SnakeState {
        &self.state
    }

    fn status(&self) -> GameStatus {
        self.state.status
    }

    fn reset(&mut self) {
        self.state = Self::initial_state(self.config);
        self.place_food();
    }
}

impl<R: Rng> Clocked for Snake<R> {
    fn tick(&mut self, dt: Millis) {
        if self.state.status.is_finished() || self.state.paused {
            return;
        }
        self.state.status.start();
        self.state.timer.accumulate(dt);
        while !self.state.status.is_finished() && self.state.timer.consume(self.state.interval) {
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::ScriptedRng;

    fn scripted(config: SnakeConfig) -> Snake<ScriptedRng> {
        Snake::with_rng(config, ScriptedRng::zeros())
    }

    #[test]
    fn grows_by_exactly_one_per_food() {
        let config = SnakeConfig {
            start: (0, 0),
            ..Default::default()
        };
        // food always lands on the first free cell, straight ahead
        let mut game = scripted(config);

        for eaten in 1..=5 {
            let interval = game.snapshot().interval;
            game.tick(interval);

            let state = game.snapshot();
            assert_eq!(state.score, eaten);
            assert_eq!(state.len(), eaten as usize + 1);
        }
        assert_eq!(game.snapshot().interval, 90);
        assert_eq!(game.snapshot().head(), (5, 0));
    }

    #[test]
    fn food_never_lands_on_the_body() {
        for seed in 0..50 {
            let mut game = Snake::new(SnakeConfig::default(), seed);
            game.state.body = (0..30).flat_map(|y| (0..29).map(move |x| (x, y))).collect();

            game.place_food();

            let food = game.snapshot().food.unwrap();
            assert_eq!(food.0, 29);
            assert!(!game.snapshot().occupies(food));
        }
    }

    #[test]
    fn interval_bottoms_out() {
        let mut game = Snake::new(SnakeConfig::default(), 0);
        game.state.interval = 51;
        game.state.food = Some((11, 10));
        game.tick(51);
        assert_eq!(game.snapshot().interval, 50);
    }

    #[test]
    fn reversal_is_rejected_and_turns_apply_on_next_step() {
        let mut game = Snake::new(SnakeConfig::default(), 1);

        assert_eq!(game.turn(Direction::Left), Err(GameError::Reversal));
        assert_eq!(game.turn(Direction::Down), Ok(SnakeOutcome::Buffered));
        assert_eq!(game.snapshot().heading, Direction::Right);

        game.tick(100);
        assert_eq!(game.snapshot().heading, Direction::Down);
        assert_eq!(game.snapshot().head(), (10, 11));
    }

    #[test]
    fn steps_wait_for_the_interval() {
        let mut game = Snake::new(SnakeConfig::default(), 1);
        game.tick(60);
        assert_eq!(game.snapshot().head(), (10, 10));
        assert_eq!(game.status(), GameStatus::InProgress);
        game.tick(60);
        assert_eq!(game.snapshot().head(), (11, 10));
    }

    #[test]
    fn wall_ends_the_game() {
        let config = SnakeConfig {
            size: (12, 12),
            ..Default::default()
        };
        let mut game = scripted(config);
        game.tick(100);
        assert_eq!(game.status(), GameStatus::InProgress);
        game.tick(100);
        game.tick(100);

        assert_eq!(game.status(), GameStatus::Lost);
        let frozen = game.snapshot().clone();
        game.tick(1000);
        assert_eq!(game.snapshot(), &frozen);
    }

    #[test]
    fn pause_freezes_ticks_and_turns() {
        let mut game = Snake::new(SnakeConfig::default(), 3);
        assert_eq!(game.toggle_pause(), Ok(SnakeOutcome::Paused));
        game.tick(500);
        assert_eq!(game.snapshot().head(), (10, 10));
        assert_eq!(game.turn(Direction::Up), Err(GameError::Paused));
        assert_eq!(game.toggle_pause(), Ok(SnakeOutcome::Resumed));
        game.tick(100);
        assert_eq!(game.snapshot().head(), (11, 10));
    }

    #[test]
    fn filling_the_board_wins() {
        let config = SnakeConfig {
            size: (3, 1),
            start: (0, 0),
            ..Default::default()
        };
        let mut game = scripted(config);
        assert_eq!(game.snapshot().food, Some((1, 0)));

        game.tick(100);
        assert_eq!(game.snapshot().food, Some((2, 0)));
        assert_eq!(game.snapshot().interval, 98);
        game.tick(98);

        assert_eq!(game.status(), GameStatus::Won);
        assert_eq!(game.snapshot().len(), 3);
        assert_eq!(game.snapshot().score, 2);
    }

    #[test]
    fn step_form_buffers_then_advances() {
        let game = Snake::new(SnakeConfig::default(), 1);
        let game = game.step(Some(SnakeCommand::Turn(Direction::Up)), 100);
        assert_eq!(game.snapshot().head(), (10, 9));
    }
}
