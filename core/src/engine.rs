use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - NotStarted -> InProgress
/// - NotStarted | InProgress -> Won | Lost | Draw
///
/// Only a reset goes back to `NotStarted`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    #[default]
    NotStarted,
    InProgress,
    Won,
    Lost,
    Draw,
}

impl GameStatus {
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::NotStarted)
    }

    pub const fn is_running(self) -> bool {
        matches!(self, Self::InProgress)
    }

    /// Indicates the game has ended and no moves can be made anymore
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost | Self::Draw)
    }

    pub(crate) fn start(&mut self) {
        if self.is_ready() {
            *self = Self::InProgress;
        }
    }

    pub(crate) fn finish(&mut self, end: GameStatus) {
        debug_assert!(end.is_finished(), "{end:?} is not a terminal status");
        if !self.is_finished() {
            log::debug!("game finished: {:?}", end);
            *self = end;
        }
    }

    pub(crate) fn check_not_finished(self) -> Result<()> {
        if self.is_finished() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}

/// Common surface of every game: a snapshot to draw, a way to submit intent,
/// and the terminal flag.
pub trait Engine {
    type Intent;
    type Outcome;
    type Snapshot;

    /// Applies or buffers one intent. An `Err` means nothing changed.
    fn submit(&mut self, intent: Self::Intent) -> Result<Self::Outcome>;

    fn snapshot(&self) -> &Self::Snapshot;

    fn status(&self) -> GameStatus;

    /// Discards all state and starts over.
    fn reset(&mut self);

    fn is_finished(&self) -> bool {
        self.status().is_finished()
    }
}

/// Engines that advance with the animation clock.
pub trait Clocked: Engine {
    /// Advances the simulation by `dt`. Finished games ignore ticks.
    fn tick(&mut self, dt: Millis);

    /// By-value form of one frame: buffer `intent`, then advance by `dt`.
    fn step(mut self, intent: Option<Self::Intent>, dt: Millis) -> Self
    where
        Self: Sized,
    {
        if let Some(intent) = intent {
            if let Err(err) = self.submit(intent) {
                log::trace!("intent dropped: {}", err);
            }
        }
        self.tick(dt);
        self
    }
}

/// Accumulates frame time for actors that move in discrete steps.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTimer {
    elapsed: Millis,
}

impl StepTimer {
    pub fn accumulate(&mut self, dt: Millis) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    /// Takes one `interval` out of the accumulated time if enough has built up.
    pub fn consume(&mut self, interval: Millis) -> bool {
        if interval > 0 && self.elapsed >= interval {
            self.elapsed -= interval;
            true
        } else {
            false
        }
    }

    pub fn elapsed(&self) -> Millis {
        self.elapsed
    }

    pub fn clear(&mut self) {
        self.elapsed = 0;
    }
}

/// Turns animation-frame timestamps into simulation deltas.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FrameClock {
    last: Option<f64>,
    carry: f64,
    max_delta: Millis,
}

impl FrameClock {
    pub const DEFAULT_MAX_DELTA: Millis = 250;

    pub const fn new(max_delta: Millis) -> Self {
        Self {
            last: None,
            carry: 0.0,
            max_delta,
        }
    }

    /// Whole milliseconds since the previous frame, clamped to `max_delta`.
    /// The first frame after creation or a pause yields zero.
    pub fn delta(&mut self, timestamp: f64) -> Millis {
        let elapsed = match self.last {
            Some(last) if timestamp > last => timestamp - last,
            _ => 0.0,
        };
        self.last = Some(timestamp);

        let total = (elapsed + self.carry).min(f64::from(self.max_delta));
        let whole = total as Millis;
        self.carry = total - f64::from(whole);
        whole
    }

    /// Forgets the last timestamp so time spent paused is not replayed.
    pub fn pause(&mut self) {
        self.last = None;
        self.carry = 0.0;
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_DELTA)
    }
}
