use core::f32::consts::{FRAC_PI_2, PI};

use bitflags::bitflags;
use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

bitflags! {
    /// Paddle keys currently held down by the player.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct HeldKeys: u8 {
        const UP   = 1;
        const DOWN = 1 << 1;
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PongConfig {
    pub width: f32,
    pub height: f32,
    pub ball_radius: f32,
    pub serve_speed: f32,
    /// Serves pick a vertical speed in `[-serve_spread, serve_spread)`.
    pub serve_spread: f32,
    pub paddle_width: f32,
    pub paddle_height: f32,
    /// Gap between each paddle and its wall.
    pub paddle_margin: f32,
    pub player_speed: f32,
    pub ai_speed: f32,
    /// The computer paddle holds still while the ball is this close to its centre.
    pub ai_dead_band: f32,
    pub deflect_speed: f32,
    pub winning_score: u32,
    pub frame: Millis,
}

impl Default for PongConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 400.0,
            ball_radius: 10.0,
            serve_speed: 5.0,
            serve_spread: 3.0,
            paddle_width: 10.0,
            paddle_height: 50.0,
            paddle_margin: 10.0,
            player_speed: 7.0,
            ai_speed: 5.0,
            ai_dead_band: 10.0,
            deflect_speed: 7.0,
            winning_score: 5,
            frame: 16,
        }
    }
}

impl PongConfig {
    pub fn player_x(&self) -> f32 {
        self.paddle_margin
    }

    pub fn ai_x(&self) -> f32 {
        self.width - self.paddle_margin - self.paddle_width
    }

    fn centered_paddle(&self) -> f32 {
        (self.height - self.paddle_height) / 2.0
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PongInput {
    Press(HeldKeys),
    Release(HeldKeys),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PongState {
    pub ball: Ball,
    /// Top edge of the player's paddle.
    pub player_y: f32,
    /// Top edge of the computer's paddle.
    pub ai_y: f32,
    pub player_score: u32,
    pub ai_score: u32,
    pub held: HeldKeys,
    pub status: GameStatus,
    timer: StepTimer,
}

#[derive(Clone, Debug)]
pub struct Pong<R = SmallRng> {
    config: PongConfig,
    state: PongState,
    rng: R,
}

impl Pong<SmallRng> {
    pub fn new(config: PongConfig, seed: u64) -> Self {
        Self::with_rng(config, SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Pong<R> {
    pub fn with_rng(config: PongConfig, mut rng: R) -> Self {
        let state = Self::initial_state(&config, &mut rng);
        Self { config, state, rng }
    }

    pub fn config(&self) -> &PongConfig {
        &self.config
    }

    fn initial_state(config: &PongConfig, rng: &mut R) -> PongState {
        PongState {
            ball: Self::serve(config, rng),
            player_y: config.centered_paddle(),
            ai_y: config.centered_paddle(),
            player_score: 0,
            ai_score: 0,
            held: HeldKeys::empty(),
            status: GameStatus::NotStarted,
            timer: StepTimer::default(),
        }
    }

    fn serve(config: &PongConfig, rng: &mut R) -> Ball {
        let dx = if rng.random_bool(0.5) {
            config.serve_speed
        } else {
            -config.serve_speed
        };
        Ball {
            x: config.width / 2.0,
            y: config.height / 2.0,
            dx,
            dy: rng.random_range(-config.serve_spread..config.serve_spread),
        }
    }

    /// Sends the ball off at `deflect_speed`, steered by where it hit the paddle.
    fn deflect(&mut self, paddle_y: f32, offset: f32) {
        let ball = &mut self.state.ball;
        let hit = (ball.y - paddle_y) / self.config.paddle_height;
        let angle = hit * PI + offset;
        ball.dx = angle.cos() * self.config.deflect_speed;
        ball.dy = angle.sin() * self.config.deflect_speed;
    }

    fn frame(&mut self) {
        let config = self.config;
        let max_paddle_y = config.height - config.paddle_height;

        if self.state.held.contains(HeldKeys::UP) {
            self.state.player_y = (self.state.player_y - config.player_speed).max(0.0);
        }
        if self.state.held.contains(HeldKeys::DOWN) {
            self.state.player_y = (self.state.player_y + config.player_speed).min(max_paddle_y);
        }

        // only chase while the ball is approaching
        if self.state.ball.dx > 0.0 {
            let target = self.state.ball.y - config.paddle_height / 2.0;
            if self.state.ai_y < target - config.ai_dead_band {
                self.state.ai_y += config.ai_speed;
            } else if self.state.ai_y > target + config.ai_dead_band {
                self.state.ai_y -= config.ai_speed;
            }
        }
        self.state.ai_y = self.state.ai_y.clamp(0.0, max_paddle_y);

        let ball = &mut self.state.ball;
        ball.x += ball.dx;
        ball.y += ball.dy;

        if ball.y - config.ball_radius < 0.0 {
            ball.dy = ball.dy.abs();
        } else if ball.y + config.ball_radius > config.height {
            ball.dy = -ball.dy.abs();
        }

        let ball = *ball;
        let on_paddle = |paddle_y: f32| ball.y > paddle_y && ball.y < paddle_y + config.paddle_height;
        if ball.dx < 0.0
            && ball.x - config.ball_radius < config.player_x() + config.paddle_width
            && on_paddle(self.state.player_y)
        {
            self.deflect(self.state.player_y, -FRAC_PI_2);
        } else if ball.dx > 0.0 && ball.x + config.ball_radius > config.ai_x() && on_paddle(self.state.ai_y)
        {
            self.deflect(self.state.ai_y, FRAC_PI_2);
        }

        if self.state.ball.x < 0.0 {
            self.state.ai_score += 1;
            self.point_scored();
        } else if self.state.ball.x > config.width {
            self.state.player_score += 1;
            self.point_scored();
        }
    }

    fn point_scored(&mut self) {
        log::debug!(
            "point scored, {} - {}",
            self.state.player_score,
            self.state.ai_score
        );
        self.state.ball = Self::serve(&self.config, &mut self.rng);
        if self.state.player_score >= self.config.winning_score {
            self.state.status.finish(GameStatus::Won);
        } else if self.state.ai_score >= self.config.winning_score {
            self.state.status.finish(GameStatus::Lost);
        }
    }
}

impl<R: Rng> Engine for Pong<R> {
    type Intent = PongInput;
    type Outcome = HeldKeys;
    type Snapshot = PongState;

    /// Updates the held paddle keys, returning the new set.
    fn submit(&mut self, input: PongInput) -> Result<HeldKeys> {
        self.state.status.check_not_finished()?;
        match input {
            PongInput::Press(keys) => self.state.held.insert(keys),
            PongInput::Release(keys) => self.state.held.remove(keys),
        }
        Ok(self.state.held)
    }

    fn snapshot(&self) -> &PongState {
        &self.state
    }

    fn status(&self) -> GameStatus {
        self.state.status
    }

    fn reset(&mut self) {
        self.state = Self::initial_state(&self.config, &mut self.rng);
    }
}

impl<R: Rng> Clocked for Pong<R> {
    fn tick(&mut self, dt: Millis) {
        if self.state.status.is_finished() {
            return;
        }
        self.state.status.start();
        self.state.timer.accumulate(dt);
        while !self.state.status.is_finished() && self.state.timer.consume(self.config.frame) {
            self.frame();
        }
    }
}
