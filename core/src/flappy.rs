use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlappyConfig {
    pub width: f32,
    pub height: f32,
    pub ground: f32,
    pub bird_x: f32,
    pub bird_start_y: f32,
    pub bird_radius: f32,
    pub gravity: f32,
    pub flap_velocity: f32,
    pub pipe_width: f32,
    pub pipe_gap: f32,
    /// Lowest possible top-pipe height; the highest leaves the same margin above the ground.
    pub min_pipe_height: u32,
    /// A new pipe spawns once the newest one is this far from the right edge.
    pub pipe_spacing: f32,
    pub scroll_speed: f32,
    pub frame: Millis,
}

impl Default for FlappyConfig {
    fn default() -> Self {
        Self {
            width: 320.0,
            height: 480.0,
            ground: 30.0,
            bird_x: 50.0,
            bird_start_y: 150.0,
            bird_radius: 20.0,
            gravity: 0.5,
            flap_velocity: -8.0,
            pipe_width: 50.0,
            pipe_gap: 150.0,
            min_pipe_height: 50,
            pipe_spacing: 200.0,
            scroll_speed: 2.0,
            frame: 16,
        }
    }
}

impl FlappyConfig {
    /// Tallest top pipe that still leaves the gap above the ground.
    /// Never below `min_pipe_height`, so a cramped field spawns fixed-height pipes.
    pub fn max_pipe_height(&self) -> u32 {
        let room = self.height - self.pipe_gap - self.ground;
        (room as u32)
            .saturating_sub(self.min_pipe_height)
            .max(self.min_pipe_height)
    }

    pub fn floor(&self) -> f32 {
        self.height - self.ground
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pipe {
    pub x: f32,
    /// Height of the top pipe; the gap starts below it.
    pub top: f32,
    pub passed: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Flap;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlappyState {
    pub bird_y: f32,
    pub velocity: f32,
    pub pipes: Vec<Pipe>,
    pub score: u32,
    /// Best score this session, kept across resets.
    pub high_score: u32,
    pub status: GameStatus,
    timer: StepTimer,
}

impl FlappyState {
    fn new(config: &FlappyConfig, high_score: u32) -> Self {
        Self {
            bird_y: config.bird_start_y,
            velocity: 0.0,
            pipes: Vec::new(),
            score: 0,
            high_score,
            status: GameStatus::NotStarted,
            timer: StepTimer::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FlappyBird<R = SmallRng> {
    config: FlappyConfig,
    state: FlappyState,
    rng: R,
}

impl FlappyBird<SmallRng> {
    pub fn new(config: FlappyConfig, seed: u64) -> Self {
        Self::with_rng(config, SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> FlappyBird<R> {
    pub fn with_rng(config: FlappyConfig, rng: R) -> Self {
        Self {
            config,
            state: FlappyState::new(&config, 0),
            rng,
        }
    }

    pub fn config(&self) -> &FlappyConfig {
        &self.config
    }

    /// The first flap only starts the game; later ones kick the bird upwards.
    pub fn flap(&mut self) -> Result<GameStatus> {
        self.state.status.check_not_finished()?;
        if self.state.status.is_ready() {
            self.state.status.start();
        } else {
            self.state.velocity = self.config.flap_velocity;
        }
        Ok(self.state.status)
    }

    fn hits_pipe(&self, pipe: &Pipe) -> bool {
        let c = &self.config;
        let y = self.state.bird_y;
        c.bird_x + c.bird_radius > pipe.x
            && c.bird_x - c.bird_radius < pipe.x + c.pipe_width
            && (y - c.bird_radius < pipe.top || y + c.bird_radius > pipe.top + c.pipe_gap)
    }

    fn frame(&mut self) {
        let config = self.config;

        self.state.velocity += config.gravity;
        self.state.bird_y += self.state.velocity;

        let due = self
            .state
            .pipes
            .last()
            .is_none_or(|pipe| pipe.x < config.width - config.pipe_spacing);
        if due {
            let top = self
                .rng
                .random_range(config.min_pipe_height..=config.max_pipe_height());
            self.state.pipes.push(Pipe {
                x: config.width,
                top: top as f32,
                passed: false,
            });
        }

        let mut crashed = false;
        let mut pipes = std::mem::take(&mut self.state.pipes);
        for pipe in &mut pipes {
            pipe.x -= config.scroll_speed;
            crashed |= self.hits_pipe(pipe);
            if !pipe.passed && pipe.x + config.pipe_width < config.bird_x - config.bird_radius {
                pipe.passed = true;
                self.state.score += 1;
                self.state.high_score = self.state.high_score.max(self.state.score);
            }
        }
        pipes.retain(|pipe| pipe.x > -config.pipe_width);
        self.state.pipes = pipes;

        let (top, bottom) = (config.bird_radius, config.floor() - config.bird_radius);
        if self.state.bird_y > bottom || self.state.bird_y < top {
            self.state.bird_y = self.state.bird_y.clamp(top, bottom);
            crashed = true;
        }

        if crashed {
            log::debug!("bird crashed with score {}", self.state.score);
            self.state.status.finish(GameStatus::Lost);
        }
    }
}

impl<R: Rng> Engine for FlappyBird<R> {
    type Intent = Flap;
    type Outcome = GameStatus;
    type Snapshot = FlappyState;

    fn submit(&mut self, _: Flap) -> Result<GameStatus> {
        self.flap()
    }

    fn snapshot(&self) -> &FlappyState {
        &self.state
    }

    fn status(&self) -> GameStatus {
        self.state.status
    }

    fn reset(&mut self) {
        self.state = FlappyState::new(&self.config, self.state.high_score);
    }
}

impl<R: Rng> Clocked for FlappyBird<R> {
    /// Frozen until the first flap.
    fn tick(&mut self, dt: Millis) {
        if !self.state.status.is_running() {
            return;
        }
        self.state.timer.accumulate(dt);
        while self.state.status.is_running() && self.state.timer.consume(self.config.frame) {
            self.frame();
        }
    }
}
